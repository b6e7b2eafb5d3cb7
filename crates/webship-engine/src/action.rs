//! Mutations applied to a resolved element.

use crate::backend::{BackendError, Session};
use crate::config::WaitConfig;
use crate::formatter::mask_sensitive;
use crate::page;
use crate::resolution::{
    Candidate, Descriptor, ElementIndex, ResolutionEngine, ResolutionError, Unresolved,
};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace the element's value.
    Fill(String),
    /// Choose the first option whose visible text matches exactly.
    SelectOption(String),
    Check,
    Uncheck,
    /// Click the element.
    Press,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Fill(_) => "fill",
            Action::SelectOption(_) => "select",
            Action::Check => "check",
            Action::Uncheck => "uncheck",
            Action::Press => "press",
        }
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Cannot {action} \"{descriptor}\": expected {expected}, found {found}")]
    WrongElementKind {
        action: &'static str,
        descriptor: String,
        expected: &'static str,
        found: String,
    },

    #[error("Option \"{option}\" not found in \"{descriptor}\"")]
    OptionNotFound { descriptor: String, option: String },

    #[error("Element \"{descriptor}\" not interactable after {timeout_ms}ms")]
    NotInteractable { descriptor: String, timeout_ms: u64 },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

pub struct ActionExecutor;

impl ActionExecutor {
    /// Capture a fresh index, resolve `descriptor` against it and apply `action`.
    pub async fn perform<S: Session + ?Sized>(
        session: &mut S,
        action: &Action,
        descriptor: &Descriptor,
        wait: &WaitConfig,
    ) -> Result<(), ActionError> {
        let index = ElementIndex::capture(session).await?;
        let candidate = ResolutionEngine::resolve(descriptor, &index).into_result(descriptor)?;
        debug!(
            descriptor = descriptor.text(),
            handle = %candidate.handle,
            kind = %candidate.kind(),
            "Resolved element"
        );
        Self::execute(session, action, candidate, descriptor, wait).await
    }

    /// Apply `action` to an already resolved element.
    pub async fn execute<S: Session + ?Sized>(
        session: &mut S,
        action: &Action,
        candidate: &Candidate,
        descriptor: &Descriptor,
        wait: &WaitConfig,
    ) -> Result<(), ActionError> {
        let wrong_kind = |expected: &'static str| ActionError::WrongElementKind {
            action: action.name(),
            descriptor: descriptor.text().to_string(),
            expected,
            found: candidate.kind(),
        };

        match action {
            Action::Fill(value) => {
                if !candidate.is_text_capable() {
                    return Err(wrong_kind("a text input or textarea"));
                }
                Self::wait_until_interactable(session, candidate, descriptor, wait).await?;
                info!(
                    "Filling {} with \"{}\"",
                    descriptor,
                    mask_sensitive(value, descriptor.text())
                );
                page::fill(session, candidate.handle, value).await?;
            }

            Action::SelectOption(option) => {
                if !candidate.is_select() {
                    return Err(wrong_kind("a select"));
                }
                let position = candidate
                    .options
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .position(|o| o.text == *option)
                    .ok_or_else(|| ActionError::OptionNotFound {
                        descriptor: descriptor.text().to_string(),
                        option: option.clone(),
                    })?;
                Self::wait_until_interactable(session, candidate, descriptor, wait).await?;
                info!("Selecting \"{}\" from {}", option, descriptor);
                page::select(session, candidate.handle, position).await?;
            }

            Action::Check | Action::Uncheck => {
                if !candidate.is_checkbox() {
                    return Err(wrong_kind("a checkbox"));
                }
                let state = matches!(action, Action::Check);
                Self::wait_until_interactable(session, candidate, descriptor, wait).await?;
                let note = page::set_checked(session, candidate.handle, state).await?;
                info!(
                    "{} {} ({})",
                    if state { "Checked" } else { "Unchecked" },
                    descriptor,
                    note.as_deref().unwrap_or("done")
                );
            }

            Action::Press => {
                Self::wait_until_interactable(session, candidate, descriptor, wait).await?;
                info!("Pressing {}", descriptor);
                page::click(session, candidate.handle).await?;
            }
        }

        Ok(())
    }

    /// Poll the element until it is attached, rendered and enabled.
    ///
    /// This is the only place an action suspends; exceeding `wait.timeout_ms`
    /// fails the action without touching the element.
    pub async fn wait_until_interactable<S: Session + ?Sized>(
        session: &mut S,
        candidate: &Candidate,
        descriptor: &Descriptor,
        wait: &WaitConfig,
    ) -> Result<(), ActionError> {
        let deadline = Instant::now() + wait.timeout();

        loop {
            let probe = page::probe(session, candidate.handle).await?;
            if probe.is_interactable() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ActionError::NotInteractable {
                    descriptor: descriptor.text().to_string(),
                    timeout_ms: wait.timeout_ms,
                });
            }
            debug!(
                descriptor = descriptor.text(),
                connected = probe.connected,
                visible = probe.visible,
                enabled = probe.enabled,
                "Waiting for element"
            );
            tokio::time::sleep(wait.poll_interval()).await;
        }
    }

    /// Click the single link whose trimmed text equals `text`.
    pub async fn follow_link<S: Session + ?Sized>(
        session: &mut S,
        text: &str,
    ) -> Result<(), ActionError> {
        let links = page::find_links(session, text).await?;
        match links.as_slice() {
            [handle] => {
                info!("Following link \"{}\"", text);
                page::click(session, *handle).await?;
                Ok(())
            }
            [] => Err(ResolutionError {
                descriptor: text.to_string(),
                kind: Unresolved::NotFound,
            }
            .into()),
            many => Err(ResolutionError {
                descriptor: text.to_string(),
                kind: Unresolved::Ambiguous(many.len()),
            }
            .into()),
        }
    }
}
