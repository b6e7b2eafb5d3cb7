//! Text and location checks against the current page.

use crate::backend::{BackendError, Session};
use crate::page;
use crate::resolution::{Descriptor, ElementIndex, ResolutionEngine, ResolutionError};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AssertionError {
    #[error("Expected {subject} {} \"{expected}\", got \"{actual}\"", expectation(.negate))]
    Mismatch {
        subject: String,
        expected: String,
        negate: bool,
        actual: String,
    },

    #[error("Expected URL to be \"{expected}\", got \"{actual}\"")]
    UrlMismatch { expected: String, actual: String },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

fn expectation(negate: &bool) -> &'static str {
    if *negate { "not to contain" } else { "to contain" }
}

/// Where text is looked up.
#[derive(Debug, Clone)]
pub enum TextScope {
    /// Rendered text of the whole `html` element.
    Document,
    /// Rendered text of the element named by the descriptor (id, name or label).
    Element(Descriptor),
}

/// Substring check, optionally negated.
pub fn text_matches(haystack: &str, expected: &str, negate: bool) -> bool {
    haystack.contains(expected) != negate
}

pub struct AssertionEngine;

impl AssertionEngine {
    pub async fn assert_text_contains<S: Session + ?Sized>(
        session: &mut S,
        scope: &TextScope,
        expected: &str,
        negate: bool,
    ) -> Result<(), AssertionError> {
        let (subject, text) = match scope {
            TextScope::Document => ("page".to_string(), page::text(session, None).await?),
            TextScope::Element(descriptor) => {
                let index = ElementIndex::capture_scope(session, descriptor.text()).await?;
                let element = ResolutionEngine::resolve_scope(descriptor, &index)
                    .into_result(descriptor)?;
                let text = match &element.text {
                    Some(text) => text.clone(),
                    None => page::text(session, Some(element.handle)).await?,
                };
                (format!("element {}", descriptor), text)
            }
        };

        debug!(subject = %subject, expected, negate, "Checking text");
        if text_matches(&text, expected, negate) {
            Ok(())
        } else {
            Err(AssertionError::Mismatch {
                subject,
                expected: expected.to_string(),
                negate,
                actual: abbreviate(&text),
            })
        }
    }

    /// Succeeds when the current URL contains `expected` anywhere.
    pub async fn assert_url_contains<S: Session + ?Sized>(
        session: &mut S,
        expected: &str,
    ) -> Result<(), AssertionError> {
        let url = session.current_url().await?;
        if url.contains(expected) {
            Ok(())
        } else {
            Err(AssertionError::Mismatch {
                subject: "URL".into(),
                expected: expected.to_string(),
                negate: false,
                actual: url,
            })
        }
    }

    /// Succeeds only when the current URL is exactly `expected`.
    pub async fn assert_url_equals<S: Session + ?Sized>(
        session: &mut S,
        expected: &str,
    ) -> Result<(), AssertionError> {
        let url = session.current_url().await?;
        if url == expected {
            Ok(())
        } else {
            Err(AssertionError::UrlMismatch {
                expected: expected.to_string(),
                actual: url,
            })
        }
    }
}

const MAX_REPORTED_CHARS: usize = 200;

fn abbreviate(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_REPORTED_CHARS {
        collapsed
    } else {
        let head: String = collapsed.chars().take(MAX_REPORTED_CHARS).collect();
        format!("{}…", head)
    }
}
