/// The user's phrase for a control: an id, a name, a label's text or a value.
///
/// No matching strategy is attached; the resolver decides which attribute the
/// text refers to. The text is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Descriptor {
    text: String,
}

impl Descriptor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// A blank descriptor can never identify an element.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl std::fmt::Display for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.text)
    }
}

impl From<&str> for Descriptor {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Descriptor {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
