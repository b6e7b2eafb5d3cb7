//! Typed calls into the injected page helper.
//!
//! Every request is one `execute_script` round trip: the helper source is sent
//! ahead of the call and installs itself only when the document lacks it, so a
//! freshly navigated page needs no separate injection step.

use crate::backend::{BackendError, Session};
use webship_common::protocol::{
    CheckRequest, ElementHandle, ElementProbe, FillRequest, FindLinksRequest, GetTextRequest,
    HandleRequest, PageData, PageRequest, PageResponse, PageSnapshot, SelectRequest,
    SnapshotRequest,
};
use webship_scanner::{PROCESS_CALL, SNAPSHOT_JS};

/// Send a raw request to the page helper.
pub async fn call<S: Session + ?Sized>(
    session: &mut S,
    request: PageRequest,
) -> Result<PageData, BackendError> {
    let body = format!("{}\n{}", SNAPSHOT_JS, PROCESS_CALL);
    let args = vec![serde_json::to_value(&request)?];

    let value = session.execute_script(&body, args).await?;
    if value.is_null() {
        return Err(BackendError::Script("Page helper returned null".into()));
    }

    match serde_json::from_value::<PageResponse>(value)? {
        PageResponse::Ok { data } => Ok(*data),
        PageResponse::Error { code, message } => {
            Err(BackendError::Script(format!("{}: {}", code, message)))
        }
    }
}

fn unexpected(expected: &str, data: &PageData) -> BackendError {
    BackendError::Script(format!("Expected {} response, got {:?}", expected, data))
}

pub async fn snapshot<S: Session + ?Sized>(
    session: &mut S,
    scope: Option<&str>,
) -> Result<PageSnapshot, BackendError> {
    let request = PageRequest::Snapshot(SnapshotRequest {
        scope: scope.map(str::to_string),
    });
    match call(session, request).await? {
        PageData::Snapshot(snapshot) => Ok(*snapshot),
        other => Err(unexpected("snapshot", &other)),
    }
}

pub async fn probe<S: Session + ?Sized>(
    session: &mut S,
    handle: ElementHandle,
) -> Result<ElementProbe, BackendError> {
    match call(session, PageRequest::Probe(HandleRequest { handle })).await? {
        PageData::Probe(probe) => Ok(probe),
        other => Err(unexpected("probe", &other)),
    }
}

async fn expect_action<S: Session + ?Sized>(
    session: &mut S,
    request: PageRequest,
) -> Result<Option<String>, BackendError> {
    match call(session, request).await? {
        PageData::Action(result) if result.success => Ok(result.message),
        PageData::Action(result) => Err(BackendError::Script(
            result.message.unwrap_or_else(|| "Action failed".into()),
        )),
        other => Err(unexpected("action", &other)),
    }
}

pub async fn fill<S: Session + ?Sized>(
    session: &mut S,
    handle: ElementHandle,
    value: &str,
) -> Result<(), BackendError> {
    let request = PageRequest::Fill(FillRequest {
        handle,
        value: value.to_string(),
    });
    expect_action(session, request).await.map(|_| ())
}

pub async fn select<S: Session + ?Sized>(
    session: &mut S,
    handle: ElementHandle,
    index: usize,
) -> Result<(), BackendError> {
    let request = PageRequest::Select(SelectRequest { handle, index });
    expect_action(session, request).await.map(|_| ())
}

/// Returns the helper's note on whether the state actually changed.
pub async fn set_checked<S: Session + ?Sized>(
    session: &mut S,
    handle: ElementHandle,
    state: bool,
) -> Result<Option<String>, BackendError> {
    expect_action(session, PageRequest::Check(CheckRequest { handle, state })).await
}

pub async fn click<S: Session + ?Sized>(
    session: &mut S,
    handle: ElementHandle,
) -> Result<(), BackendError> {
    expect_action(session, PageRequest::Click(HandleRequest { handle }))
        .await
        .map(|_| ())
}

pub async fn value<S: Session + ?Sized>(
    session: &mut S,
    handle: ElementHandle,
) -> Result<Option<String>, BackendError> {
    match call(session, PageRequest::GetValue(HandleRequest { handle })).await? {
        PageData::Value(result) => Ok(result.value),
        other => Err(unexpected("value", &other)),
    }
}

/// Rendered text of an element, or of the whole document when `handle` is `None`.
pub async fn text<S: Session + ?Sized>(
    session: &mut S,
    handle: Option<ElementHandle>,
) -> Result<String, BackendError> {
    match call(session, PageRequest::GetText(GetTextRequest { handle })).await? {
        PageData::Text(result) => Ok(result.text),
        other => Err(unexpected("text", &other)),
    }
}

pub async fn find_links<S: Session + ?Sized>(
    session: &mut S,
    text: &str,
) -> Result<Vec<ElementHandle>, BackendError> {
    let request = PageRequest::FindLinks(FindLinksRequest {
        text: text.to_string(),
    });
    match call(session, request).await? {
        PageData::Links(result) => Ok(result.links),
        other => Err(unexpected("links", &other)),
    }
}
