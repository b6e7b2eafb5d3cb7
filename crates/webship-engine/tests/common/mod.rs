//! An in-memory page that answers the page helper's requests.
//!
//! Each integration test file pulls this in with `mod common;`, so not every
//! helper is used everywhere.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use webship_engine::backend::{BackendError, NavigationResult, Session};
use webship_engine::protocol::PageRequest;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub input_type: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: String,
    pub checked: bool,
    /// `(text, value)` pairs for selects.
    pub options: Vec<(String, String)>,
    pub selected: usize,
    pub text: String,
    pub visible: bool,
    /// Rendered with a 0x0 box.
    pub zero_size: bool,
    pub enabled: bool,
    /// Probes answered "hidden" before the element becomes visible.
    pub hidden_for_probes: usize,
    pub clicks: usize,
}

impl FakeElement {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            visible: true,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn input(input_type: &str) -> Self {
        Self {
            input_type: Some(input_type.to_string()),
            ..Self::new("input")
        }
    }

    pub fn text_input() -> Self {
        Self::input("text")
    }

    pub fn checkbox() -> Self {
        Self::input("checkbox")
    }

    pub fn textarea() -> Self {
        Self::new("textarea")
    }

    /// `<button>label</button>`: the label is text, the value stays empty.
    pub fn button(label: &str) -> Self {
        Self {
            text: label.to_string(),
            ..Self::new("button")
        }
    }

    /// `<input type=submit value=...>`.
    pub fn submit(value: &str) -> Self {
        Self::input("submit").value(value)
    }

    pub fn select(options: &[&str]) -> Self {
        Self {
            options: options
                .iter()
                .map(|o| (o.to_string(), o.to_lowercase()))
                .collect(),
            ..Self::new("select")
        }
    }

    pub fn block(tag: &str, text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::new(tag)
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn zero_size(mut self) -> Self {
        self.zero_size = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn appears_after(mut self, probes: usize) -> Self {
        self.hidden_for_probes = probes;
        self
    }

    fn is_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea" | "button")
    }

    fn current_value(&self) -> Option<String> {
        match self.tag.as_str() {
            "select" => self.options.get(self.selected).map(|(_, v)| v.clone()),
            "input" | "textarea" | "button" => Some(self.value.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeLink {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Default)]
pub struct MockSession {
    pub url: String,
    pub elements: Vec<FakeElement>,
    /// `(text, for)` pairs.
    pub labels: Vec<(String, Option<String>)>,
    pub links: Vec<FakeLink>,
    pub body_text: String,
    pub history: Vec<String>,
    pub history_pos: usize,
    pub requests: Vec<PageRequest>,
    pub reloads: usize,
}

const LINK_BASE: u32 = 1000;

impl MockSession {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            history: vec![url.to_string()],
            ..Default::default()
        }
    }

    pub fn with(mut self, element: FakeElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn label(mut self, text: &str, for_id: &str) -> Self {
        self.labels.push((text.to_string(), Some(for_id.to_string())));
        self
    }

    pub fn orphan_label(mut self, text: &str) -> Self {
        self.labels.push((text.to_string(), None));
        self
    }

    pub fn link(mut self, text: &str, href: &str) -> Self {
        self.links.push(FakeLink {
            text: text.to_string(),
            href: href.to_string(),
        });
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.body_text = text.to_string();
        self
    }

    pub fn by_id(&self, id: &str) -> &FakeElement {
        self.elements
            .iter()
            .find(|e| e.id.as_deref() == Some(id))
            .unwrap_or_else(|| panic!("no element with id {id}"))
    }

    pub fn mutations(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    PageRequest::Fill(_)
                        | PageRequest::Select(_)
                        | PageRequest::Check(_)
                        | PageRequest::Click(_)
                )
            })
            .count()
    }

    fn go(&mut self, url: &str) {
        self.history.truncate(self.history_pos + 1);
        self.history.push(url.to_string());
        self.history_pos = self.history.len() - 1;
        self.url = url.to_string();
    }

    fn nav(&self) -> NavigationResult {
        NavigationResult {
            url: self.url.clone(),
            title: String::new(),
        }
    }

    fn element(&mut self, handle: u32) -> Option<&mut FakeElement> {
        self.elements.get_mut(handle as usize)
    }

    fn describe(&self, handle: usize, el: &FakeElement, with_text: bool) -> Value {
        let options: Option<Vec<Value>> = (el.tag == "select").then(|| {
            el.options
                .iter()
                .enumerate()
                .map(|(i, (text, value))| {
                    json!({ "text": text, "value": value, "selected": i == el.selected })
                })
                .collect()
        });
        let text = with_text.then(|| el.text.clone());

        json!({
            "handle": handle,
            "tag": el.tag,
            "type": el.input_type,
            "attributes": { "id": el.id, "name": el.name, "title": null },
            "value": el.current_value(),
            "checked": el.checked,
            "options": options,
            "text": text,
        })
    }

    fn snapshot(&self, scope: Option<&str>) -> Value {
        let targets: Vec<&str> = self
            .labels
            .iter()
            .filter_map(|(_, f)| f.as_deref())
            .collect();
        let elements: Vec<Value> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| match scope {
                None => el.is_control(),
                Some(scope) => {
                    el.id.as_deref() == Some(scope)
                        || el.name.as_deref() == Some(scope)
                        || el.id.as_deref().is_some_and(|id| targets.contains(&id))
                }
            })
            .map(|(i, el)| self.describe(i, el, scope.is_some()))
            .collect();
        let labels: Vec<Value> = self
            .labels
            .iter()
            .map(|(text, f)| json!({ "text": text, "for": f }))
            .collect();

        json!({ "status": "ok", "url": self.url, "elements": elements, "labels": labels })
    }

    fn stale(handle: u32) -> Value {
        json!({ "status": "error", "code": "stale_handle", "message": format!("Element {handle} is gone") })
    }

    fn done(message: Option<&str>) -> Value {
        json!({ "status": "ok", "success": true, "message": message })
    }

    fn process(&mut self, request: PageRequest) -> Value {
        match request {
            PageRequest::Snapshot(req) => self.snapshot(req.scope.as_deref()),
            PageRequest::Probe(req) => match self.element(req.handle.0) {
                Some(el) => {
                    let visible = if el.hidden_for_probes > 0 {
                        el.hidden_for_probes -= 1;
                        false
                    } else {
                        el.visible && !el.zero_size
                    };
                    json!({ "status": "ok", "connected": true, "visible": visible, "enabled": el.enabled })
                }
                None => json!({ "status": "ok", "connected": false, "visible": false, "enabled": false }),
            },
            PageRequest::Fill(req) => match self.element(req.handle.0) {
                Some(el) => {
                    el.value = req.value;
                    Self::done(None)
                }
                None => Self::stale(req.handle.0),
            },
            PageRequest::Select(req) => match self.element(req.handle.0) {
                Some(el) => {
                    el.selected = req.index;
                    Self::done(None)
                }
                None => Self::stale(req.handle.0),
            },
            PageRequest::Check(req) => match self.element(req.handle.0) {
                Some(el) if el.checked == req.state => Self::done(Some("unchanged")),
                Some(el) => {
                    el.checked = req.state;
                    Self::done(Some("changed"))
                }
                None => Self::stale(req.handle.0),
            },
            PageRequest::Click(req) if req.handle.0 >= LINK_BASE => {
                let index = (req.handle.0 - LINK_BASE) as usize;
                match self.links.get(index).map(|l| l.href.clone()) {
                    Some(href) => {
                        self.go(&href);
                        Self::done(None)
                    }
                    None => Self::stale(req.handle.0),
                }
            }
            PageRequest::Click(req) => match self.element(req.handle.0) {
                Some(el) => {
                    el.clicks += 1;
                    Self::done(None)
                }
                None => Self::stale(req.handle.0),
            },
            PageRequest::GetValue(req) => match self.element(req.handle.0) {
                Some(el) => json!({ "status": "ok", "value": el.current_value() }),
                None => Self::stale(req.handle.0),
            },
            PageRequest::GetText(req) => match req.handle {
                None => json!({ "status": "ok", "text": self.body_text }),
                Some(handle) => match self.element(handle.0) {
                    Some(el) => json!({ "status": "ok", "text": el.text }),
                    None => Self::stale(handle.0),
                },
            },
            PageRequest::FindLinks(req) => {
                let links: Vec<u32> = self
                    .links
                    .iter()
                    .enumerate()
                    .filter(|(_, l)| l.text.trim() == req.text)
                    .map(|(i, _)| LINK_BASE + i as u32)
                    .collect();
                json!({ "status": "ok", "links": links })
            }
        }
    }
}

#[async_trait]
impl Session for MockSession {
    async fn launch(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        true
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.go(url);
        Ok(self.nav())
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        Ok(self.url.clone())
    }

    async fn execute_script(
        &mut self,
        body: &str,
        args: Vec<Value>,
    ) -> Result<Value, BackendError> {
        if !body.contains("window.__webship.process(arguments[0])") {
            return Err(BackendError::Script("unexpected script".into()));
        }
        let arg = args
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Script("missing request".into()))?;
        let request: PageRequest = serde_json::from_value(arg)?;
        self.requests.push(request.clone());
        Ok(self.process(request))
    }

    async fn go_back(&mut self) -> Result<NavigationResult, BackendError> {
        if self.history_pos == 0 {
            return Err(BackendError::Navigation("no previous page".into()));
        }
        self.history_pos -= 1;
        self.url = self.history[self.history_pos].clone();
        Ok(self.nav())
    }

    async fn go_forward(&mut self) -> Result<NavigationResult, BackendError> {
        if self.history_pos + 1 >= self.history.len() {
            return Err(BackendError::Navigation("no next page".into()));
        }
        self.history_pos += 1;
        self.url = self.history[self.history_pos].clone();
        Ok(self.nav())
    }

    async fn refresh(&mut self) -> Result<NavigationResult, BackendError> {
        self.reloads += 1;
        Ok(self.nav())
    }
}
