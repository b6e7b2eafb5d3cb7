use super::descriptor::Descriptor;
use super::engine::Strategy;
use super::index::Candidate;
use thiserror::Error;

/// Result of a resolution attempt.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// Exactly one element matched `strategy`.
    Resolved {
        candidate: &'a Candidate,
        strategy: Strategy,
    },

    /// Resolution failed with reason
    Unresolved(Unresolved),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    /// No strategy matched anything.
    NotFound,
    /// One strategy matched this many elements.
    Ambiguous(usize),
}

impl std::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unresolved::NotFound => write!(f, "no element matches by id, name, label or value"),
            Unresolved::Ambiguous(count) => write!(f, "{} elements match", count),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Resolution failed for \"{descriptor}\": {kind}")]
pub struct ResolutionError {
    pub descriptor: String,
    pub kind: Unresolved,
}

impl<'a> Resolution<'a> {
    pub fn into_result(
        self,
        descriptor: &Descriptor,
    ) -> Result<&'a Candidate, ResolutionError> {
        match self {
            Resolution::Resolved { candidate, .. } => Ok(candidate),
            Resolution::Unresolved(kind) => Err(ResolutionError {
                descriptor: descriptor.text().to_string(),
                kind,
            }),
        }
    }
}
