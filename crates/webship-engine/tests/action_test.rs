mod common;

use common::{FakeElement, MockSession};
use webship_engine::action::{Action, ActionError, ActionExecutor};
use webship_engine::config::WaitConfig;
use webship_engine::page;
use webship_engine::resolution::{Descriptor, ElementIndex, Unresolved};

fn quick_wait() -> WaitConfig {
    WaitConfig {
        timeout_ms: 50,
        poll_interval_ms: 5,
    }
}

async fn perform(session: &mut MockSession, action: Action, field: &str) -> Result<(), ActionError> {
    ActionExecutor::perform(session, &action, &Descriptor::new(field), &quick_wait()).await
}

#[tokio::test]
async fn fill_by_label_then_read_back() {
    let mut session = MockSession::new("https://site/login")
        .with(FakeElement::text_input().id("uname"))
        .label("Username", "uname");

    perform(&mut session, Action::Fill("webshipco".into()), "Username")
        .await
        .unwrap();
    assert_eq!(session.by_id("uname").value, "webshipco");

    let index = ElementIndex::capture(&mut session).await.unwrap();
    let handle = index.by_id("uname").unwrap().handle;
    let value = page::value(&mut session, handle).await.unwrap();
    assert_eq!(value.as_deref(), Some("webshipco"));
}

#[tokio::test]
async fn fill_replaces_existing_value_and_accepts_empty() {
    let mut session = MockSession::new("https://site/")
        .with(FakeElement::textarea().id("notes").value("old text"));

    perform(&mut session, Action::Fill(String::new()), "notes")
        .await
        .unwrap();
    assert_eq!(session.by_id("notes").value, "");
}

#[tokio::test]
async fn check_is_idempotent() {
    let mut session = MockSession::new("https://site/")
        .with(FakeElement::checkbox().id("terms"))
        .label("Terms", "terms");

    perform(&mut session, Action::Check, "Terms").await.unwrap();
    assert!(session.by_id("terms").checked);
    perform(&mut session, Action::Check, "Terms").await.unwrap();
    assert!(session.by_id("terms").checked);

    perform(&mut session, Action::Uncheck, "terms").await.unwrap();
    assert!(!session.by_id("terms").checked);
    perform(&mut session, Action::Uncheck, "terms").await.unwrap();
    assert!(!session.by_id("terms").checked);
}

#[tokio::test]
async fn select_matches_visible_text_exactly() {
    let mut session =
        MockSession::new("https://site/").with(FakeElement::select(&["Volvo", "Saab", "Audi"]).id("cars"));

    perform(&mut session, Action::SelectOption("Saab".into()), "cars")
        .await
        .unwrap();
    assert_eq!(session.by_id("cars").selected, 1);
}

#[tokio::test]
async fn unknown_option_leaves_selection_unchanged() {
    let mut session =
        MockSession::new("https://site/").with(FakeElement::select(&["Volvo", "Saab"]).id("cars"));

    let err = perform(&mut session, Action::SelectOption("saab".into()), "cars")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::OptionNotFound { ref option, .. } if option == "saab"
    ));
    assert_eq!(session.by_id("cars").selected, 0);
    assert_eq!(session.mutations(), 0);
}

#[tokio::test]
async fn wrong_element_kind_is_rejected_before_mutation() {
    let mut session = MockSession::new("https://site/")
        .with(FakeElement::text_input().id("name"))
        .with(FakeElement::checkbox().id("agree"))
        .with(FakeElement::input("submit").id("go").value("Go"));

    let err = perform(&mut session, Action::Check, "name").await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::WrongElementKind { ref found, .. } if found == "input[type=text]"
    ));

    let err = perform(&mut session, Action::Fill("x".into()), "agree")
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::WrongElementKind { .. }));

    let err = perform(&mut session, Action::Fill("x".into()), "go")
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::WrongElementKind { .. }));

    let err = perform(&mut session, Action::SelectOption("x".into()), "name")
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::WrongElementKind { .. }));

    assert_eq!(session.mutations(), 0);
}

#[tokio::test]
async fn hidden_element_times_out_without_mutation() {
    let mut session =
        MockSession::new("https://site/").with(FakeElement::text_input().id("secret").hidden());

    let err = perform(&mut session, Action::Fill("x".into()), "secret")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::NotInteractable { timeout_ms: 50, .. }
    ));
    assert_eq!(session.by_id("secret").value, "");
    assert_eq!(session.mutations(), 0);
}

#[tokio::test]
async fn zero_size_element_is_not_interactable() {
    let mut session = MockSession::new("https://site/")
        .with(FakeElement::text_input().id("ghost").zero_size())
        .with(FakeElement::submit("Go").id("go").zero_size());

    let err = perform(&mut session, Action::Fill("x".into()), "ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::NotInteractable { .. }));

    let err = perform(&mut session, Action::Press, "Go").await.unwrap_err();
    assert!(matches!(err, ActionError::NotInteractable { .. }));

    assert_eq!(session.by_id("ghost").value, "");
    assert_eq!(session.by_id("go").clicks, 0);
    assert_eq!(session.mutations(), 0);
}

#[tokio::test]
async fn disabled_element_is_not_interactable() {
    let mut session =
        MockSession::new("https://site/").with(FakeElement::checkbox().id("locked").disabled());

    let err = perform(&mut session, Action::Check, "locked").await.unwrap_err();
    assert!(matches!(err, ActionError::NotInteractable { .. }));
    assert!(!session.by_id("locked").checked);
}

#[tokio::test]
async fn waits_for_element_that_appears() {
    let mut session = MockSession::new("https://site/")
        .with(FakeElement::text_input().id("late").appears_after(2));

    let wait = WaitConfig {
        timeout_ms: 2000,
        poll_interval_ms: 5,
    };
    ActionExecutor::perform(
        &mut session,
        &Action::Fill("now".into()),
        &Descriptor::new("late"),
        &wait,
    )
    .await
    .unwrap();
    assert_eq!(session.by_id("late").value, "now");
}

#[tokio::test]
async fn unresolved_descriptor_reports_resolution_failure() {
    let mut session = MockSession::new("https://site/")
        .with(FakeElement::text_input().id("a"))
        .with(FakeElement::text_input().id("b"))
        .label("Email", "a")
        .label("Email", "b");

    let err = perform(&mut session, Action::Fill("x".into()), "Email")
        .await
        .unwrap_err();
    match err {
        ActionError::Resolution(e) => {
            assert_eq!(e.kind, Unresolved::Ambiguous(2));
            assert_eq!(e.to_string(), "Resolution failed for \"Email\": 2 elements match");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = perform(&mut session, Action::Check, "Missing").await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Resolution(ref e) if e.kind == Unresolved::NotFound
    ));
    assert_eq!(session.mutations(), 0);
}

#[tokio::test]
async fn press_clicks_buttons_by_value() {
    let mut session = MockSession::new("https://site/").with(FakeElement::submit("Log In").id("login"));

    perform(&mut session, Action::Press, "Log In").await.unwrap();
    assert_eq!(session.by_id("login").clicks, 1);
}

#[tokio::test]
async fn press_does_not_match_button_text() {
    let mut session =
        MockSession::new("https://site/").with(FakeElement::button("Log In").id("login"));

    let err = perform(&mut session, Action::Press, "Log In").await.unwrap_err();
    assert!(matches!(
        err,
        ActionError::Resolution(ref e) if e.kind == Unresolved::NotFound
    ));
    perform(&mut session, Action::Press, "login").await.unwrap();
    assert_eq!(session.by_id("login").clicks, 1);
}

#[tokio::test]
async fn follow_link_requires_a_single_match() {
    let mut session = MockSession::new("https://site/")
        .link(" About ", "https://site/about")
        .link("Help", "https://site/help")
        .link("Help", "https://site/help-2");

    ActionExecutor::follow_link(&mut session, "About").await.unwrap();
    assert_eq!(session.url, "https://site/about");

    let err = ActionExecutor::follow_link(&mut session, "Help")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::Resolution(ref e) if e.kind == Unresolved::Ambiguous(2)
    ));

    let err = ActionExecutor::follow_link(&mut session, "Contact")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ActionError::Resolution(ref e) if e.kind == Unresolved::NotFound
    ));
}
