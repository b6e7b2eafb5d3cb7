use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Custom deserializer for HashMap<String, String> that filters out null values.
/// The page script reports every queried attribute, with null for the missing ones.
fn deserialize_nullable_string_map<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: HashMap<String, Option<String>> = HashMap::deserialize(deserializer)?;
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| v.map(|val| (k, val)))
        .collect())
}

/// Opaque reference to an element registered by the page script.
///
/// Handles are reissued on every snapshot and die with the document, so they
/// must never outlive the step that obtained them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub u32);

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Requests understood by `window.__webship.process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageRequest {
    Snapshot(SnapshotRequest),
    Fill(FillRequest),
    Select(SelectRequest),
    Check(CheckRequest),
    Click(HandleRequest),
    Probe(HandleRequest),
    #[serde(rename = "get_value")]
    GetValue(HandleRequest),
    #[serde(rename = "get_text")]
    GetText(GetTextRequest),
    #[serde(rename = "find_links")]
    FindLinks(FindLinksRequest),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnapshotRequest {
    /// `None` captures form controls; `Some(text)` captures any element whose
    /// id or name equals `text`, plus every label target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillRequest {
    pub handle: ElementHandle,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    pub handle: ElementHandle,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub handle: ElementHandle,
    pub state: bool, // true = check, false = uncheck
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandleRequest {
    pub handle: ElementHandle,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GetTextRequest {
    /// `None` reads the whole document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<ElementHandle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindLinksRequest {
    pub text: String,
}

/// Responses returned by the page script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageResponse {
    Ok {
        #[serde(flatten)]
        data: Box<PageData>,
    },
    Error {
        code: String,
        message: String,
    },
}

/// Variant order matters: the most specific shapes come first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageData {
    Snapshot(Box<PageSnapshot>),
    Probe(ElementProbe),
    Links(LinkMatches),
    Text(TextResult),
    Action(ActionResult),
    Value(ValueResult),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub elements: Vec<RawElement>,
    pub labels: Vec<RawLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawElement {
    pub handle: ElementHandle,
    pub tag: String, // "input", "select", "textarea", "button", ...
    #[serde(default, rename = "type")]
    pub input_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable_string_map")]
    pub attributes: HashMap<String, String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub options: Option<Vec<OptionEntry>>,
    /// Rendered text, only reported for scoped snapshots.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub text: String,
    pub value: String,
    #[serde(default)]
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLabel {
    pub text: String,
    #[serde(default, rename = "for")]
    pub for_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ElementProbe {
    pub connected: bool,
    pub visible: bool,
    pub enabled: bool,
}

impl ElementProbe {
    pub fn is_interactable(&self) -> bool {
        self.connected && self.visible && self.enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkMatches {
    pub links: Vec<ElementHandle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResult {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueResult {
    pub value: Option<String>,
}
