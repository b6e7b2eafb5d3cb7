//! Per-step snapshot of the elements a descriptor may refer to.

use super::association::associate_labels;
use crate::backend::{BackendError, Session};
use crate::page;
use webship_common::protocol::{ElementHandle, OptionEntry, PageSnapshot, RawElement};

/// Input types that cannot hold typed text.
const NON_TEXT_INPUT_TYPES: &[&str] = &[
    "checkbox", "radio", "submit", "button", "reset", "image", "file", "hidden", "range",
    "color",
];

/// Input types rendered as push buttons.
const BUTTON_INPUT_TYPES: &[&str] = &["submit", "button", "reset", "image"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTag {
    Input,
    Select,
    Textarea,
    Button,
    Other,
}

impl ElementTag {
    fn from_tag_name(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "input" => Self::Input,
            "select" => Self::Select,
            "textarea" => Self::Textarea,
            "button" => Self::Button,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub handle: ElementHandle,
    pub tag: ElementTag,
    /// Raw tag name as reported by the page, lowercased.
    pub tag_name: String,
    /// Lowercased `type` attribute, inputs only.
    pub input_type: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    /// Text of the first `<label for=…>` pointing at this element.
    pub label_text: Option<String>,
    pub value: Option<String>,
    pub checked: bool,
    pub options: Option<Vec<OptionEntry>>,
    pub text: Option<String>,
}

impl Candidate {
    fn from_raw(raw: RawElement) -> Self {
        let non_empty = |key: &str| raw.attributes.get(key).filter(|v| !v.is_empty()).cloned();
        let tag_name = raw.tag.to_ascii_lowercase();

        Self {
            handle: raw.handle,
            tag: ElementTag::from_tag_name(&tag_name),
            input_type: raw.input_type.map(|t| t.to_ascii_lowercase()),
            id: non_empty("id"),
            name: non_empty("name"),
            label_text: None,
            value: raw.value,
            checked: raw.checked,
            options: raw.options,
            text: raw.text,
            tag_name,
        }
    }

    fn input_type(&self) -> &str {
        self.input_type.as_deref().unwrap_or("text")
    }

    pub fn is_text_capable(&self) -> bool {
        match self.tag {
            ElementTag::Textarea => true,
            ElementTag::Input => !NON_TEXT_INPUT_TYPES.contains(&self.input_type()),
            _ => false,
        }
    }

    pub fn is_checkbox(&self) -> bool {
        self.tag == ElementTag::Input && self.input_type() == "checkbox"
    }

    pub fn is_button(&self) -> bool {
        match self.tag {
            ElementTag::Button => true,
            ElementTag::Input => BUTTON_INPUT_TYPES.contains(&self.input_type()),
            _ => false,
        }
    }

    pub fn is_select(&self) -> bool {
        self.tag == ElementTag::Select
    }

    /// Short human description used in error messages, e.g. `input[type=checkbox]`.
    pub fn kind(&self) -> String {
        match self.tag {
            ElementTag::Input => format!("input[type={}]", self.input_type()),
            _ => self.tag_name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
    pub for_id: Option<String>,
}

/// Read-only view of the page at one instant.
///
/// Built fresh for every resolution; handles inside are void as soon as the
/// page navigates or another snapshot is taken.
#[derive(Debug, Clone, Default)]
pub struct ElementIndex {
    pub url: String,
    candidates: Vec<Candidate>,
    labels: Vec<Label>,
}

impl ElementIndex {
    pub fn build(snapshot: PageSnapshot) -> Self {
        let mut candidates: Vec<Candidate> = snapshot
            .elements
            .into_iter()
            .map(Candidate::from_raw)
            .collect();
        let labels: Vec<Label> = snapshot
            .labels
            .into_iter()
            .map(|l| Label {
                text: l.text,
                for_id: l.for_id.filter(|f| !f.is_empty()),
            })
            .collect();

        associate_labels(&mut candidates, &labels);

        Self {
            url: snapshot.url,
            candidates,
            labels,
        }
    }

    /// Snapshot the form controls (inputs, selects, textareas, buttons) and labels.
    pub async fn capture<S: Session + ?Sized>(session: &mut S) -> Result<Self, BackendError> {
        let index = Self::build(page::snapshot(session, None).await?);
        tracing::debug!(
            candidates = index.candidates.len(),
            labels = index.labels.len(),
            "Captured element index"
        );
        Ok(index)
    }

    /// Snapshot arbitrary elements that `text` may name, for scoped assertions.
    pub async fn capture_scope<S: Session + ?Sized>(
        session: &mut S,
        text: &str,
    ) -> Result<Self, BackendError> {
        let index = Self::build(page::snapshot(session, Some(text)).await?);
        tracing::debug!(
            candidates = index.candidates.len(),
            scope = text,
            "Captured scope index"
        );
        Ok(index)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn by_id(&self, id: &str) -> Option<&Candidate> {
        self.candidates
            .iter()
            .find(|c| c.id.as_deref() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
