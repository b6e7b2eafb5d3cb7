use super::association::find_by_label_text;
use super::descriptor::Descriptor;
use super::index::{Candidate, ElementIndex};
use super::result::{Resolution, Unresolved};

/// One way a descriptor can name an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `id` attribute equals the descriptor.
    Id,
    /// `name` attribute equals the descriptor.
    Name,
    /// A `<label for>` whose normalized text equals the descriptor.
    Label,
    /// Current value equals the descriptor (buttons and selects only).
    Value,
}

impl Strategy {
    /// Order used for form controls.
    pub const CONTROLS: [Strategy; 4] = [
        Strategy::Id,
        Strategy::Name,
        Strategy::Label,
        Strategy::Value,
    ];

    /// Order used when any element may be the target.
    pub const ELEMENTS: [Strategy; 3] = [Strategy::Id, Strategy::Name, Strategy::Label];

    pub fn matches<'a>(&self, text: &str, index: &'a ElementIndex) -> Vec<&'a Candidate> {
        match self {
            Strategy::Id => index
                .candidates()
                .filter(|c| c.id.as_deref() == Some(text))
                .collect(),
            Strategy::Name => index
                .candidates()
                .filter(|c| c.name.as_deref() == Some(text))
                .collect(),
            Strategy::Label => find_by_label_text(text, index),
            Strategy::Value => index
                .candidates()
                .filter(|c| (c.is_button() || c.is_select()) && c.value.as_deref() == Some(text))
                .collect(),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::Label => "label",
            Strategy::Value => "value",
        };
        f.write_str(name)
    }
}

pub struct ResolutionEngine;

impl ResolutionEngine {
    /// Resolve a descriptor to exactly one form control.
    pub fn resolve<'a>(descriptor: &Descriptor, index: &'a ElementIndex) -> Resolution<'a> {
        Self::resolve_with(&Strategy::CONTROLS, descriptor, index)
    }

    /// Resolve a descriptor to exactly one element of a scoped snapshot.
    pub fn resolve_scope<'a>(descriptor: &Descriptor, index: &'a ElementIndex) -> Resolution<'a> {
        Self::resolve_with(&Strategy::ELEMENTS, descriptor, index)
    }

    /// The first strategy with exactly one match wins. A strategy with several
    /// matches stops the search: a looser strategy must not pick among them.
    pub fn resolve_with<'a>(
        order: &[Strategy],
        descriptor: &Descriptor,
        index: &'a ElementIndex,
    ) -> Resolution<'a> {
        if descriptor.is_blank() {
            return Resolution::Unresolved(Unresolved::NotFound);
        }

        let text = descriptor.text();
        for strategy in order {
            let matches = strategy.matches(text, index);
            tracing::debug!(
                descriptor = text,
                strategy = %strategy,
                matches = matches.len(),
                "Resolution strategy evaluated"
            );

            match matches.as_slice() {
                [] => continue,
                [candidate] => {
                    return Resolution::Resolved {
                        candidate: *candidate,
                        strategy: *strategy,
                    };
                }
                many => return Resolution::Unresolved(Unresolved::Ambiguous(many.len())),
            }
        }

        Resolution::Unresolved(Unresolved::NotFound)
    }
}
