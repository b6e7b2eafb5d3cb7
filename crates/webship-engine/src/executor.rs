//! Step execution: match a phrase, then drive the resolver, actions and assertions.
//!
//! Every step runs to completion before the next one starts. A step either
//! returns a short description of what it did or a [`StepError`] that ends
//! its scenario.

use crate::action::{Action, ActionError, ActionExecutor};
use crate::assertion::{AssertionEngine, AssertionError, TextScope};
use crate::backend::{BackendError, Session};
use crate::config::WebshipConfig;
use crate::feature::Step;
use crate::resolution::Descriptor;
use crate::steps::{StepCall, match_step};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("Undefined step: {0}")]
    Undefined(String),

    #[error("Step expects a table of | field | value | rows")]
    MissingTable,

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Assertion(#[from] AssertionError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

pub struct StepExecutor {
    config: WebshipConfig,
}

impl StepExecutor {
    pub fn new(config: WebshipConfig) -> Self {
        Self { config }
    }

    /// Run a step typed without a table, as in the REPL.
    pub async fn run_line<S: Session + ?Sized>(
        &self,
        session: &mut S,
        line: &str,
    ) -> Result<String, StepError> {
        let call = match_step(line).ok_or_else(|| StepError::Undefined(line.trim().into()))?;
        self.dispatch(session, call, None, None).await
    }

    pub async fn run_step<S: Session + ?Sized>(
        &self,
        session: &mut S,
        step: &Step,
    ) -> Result<String, StepError> {
        let call = match_step(&step.text).ok_or_else(|| StepError::Undefined(step.text.clone()))?;
        info!(line = step.line, "{}", step);
        self.dispatch(
            session,
            call,
            step.table.as_deref(),
            step.doc_string.as_deref(),
        )
        .await
    }

    async fn dispatch<S: Session + ?Sized>(
        &self,
        session: &mut S,
        call: StepCall,
        table: Option<&[Vec<String>]>,
        doc_string: Option<&str>,
    ) -> Result<String, StepError> {
        let wait = &self.config.wait;

        match call {
            StepCall::VisitHomepage => self.visit(session, &self.config.launch_url).await,
            StepCall::Visit(path) => self.visit(session, &self.config.url_for(&path)).await,
            StepCall::Forward => {
                let nav = session.go_forward().await?;
                Ok(format!("Moved forward to {}", nav.url))
            }
            StepCall::Back => {
                let nav = session.go_back().await?;
                Ok(format!("Moved back to {}", nav.url))
            }
            StepCall::Reload => {
                let nav = session.refresh().await?;
                Ok(format!("Reloaded {}", nav.url))
            }

            StepCall::Press(target) => {
                let descriptor = Descriptor::new(target);
                ActionExecutor::perform(session, &Action::Press, &descriptor, wait).await?;
                Ok(format!("Pressed {}", descriptor))
            }
            StepCall::Follow(text) => {
                ActionExecutor::follow_link(session, &text).await?;
                Ok(format!("Followed \"{}\"", text))
            }

            StepCall::Fill { field, value } => {
                let descriptor = Descriptor::new(field);
                ActionExecutor::perform(session, &Action::Fill(value), &descriptor, wait).await?;
                Ok(format!("Filled {}", descriptor))
            }
            StepCall::FillBlock(field) => {
                let descriptor = Descriptor::new(field);
                let value = doc_string.unwrap_or_default().to_string();
                ActionExecutor::perform(session, &Action::Fill(value), &descriptor, wait).await?;
                Ok(format!("Filled {}", descriptor))
            }
            StepCall::FillTable => {
                let rows = table.ok_or(StepError::MissingTable)?;
                let mut filled = 0;
                for row in rows {
                    let Some(field) = row.first() else {
                        continue;
                    };
                    let value = row.get(1).cloned().unwrap_or_default();
                    let descriptor = Descriptor::new(field.as_str());
                    ActionExecutor::perform(session, &Action::Fill(value), &descriptor, wait)
                        .await?;
                    filled += 1;
                }
                Ok(format!("Filled {} fields", filled))
            }
            StepCall::Select { option, field } => {
                let descriptor = Descriptor::new(field);
                let action = Action::SelectOption(option.clone());
                ActionExecutor::perform(session, &action, &descriptor, wait).await?;
                Ok(format!("Selected \"{}\" from {}", option, descriptor))
            }
            StepCall::Check(field) => {
                let descriptor = Descriptor::new(field);
                ActionExecutor::perform(session, &Action::Check, &descriptor, wait).await?;
                Ok(format!("Checked {}", descriptor))
            }
            StepCall::Uncheck(field) => {
                let descriptor = Descriptor::new(field);
                ActionExecutor::perform(session, &Action::Uncheck, &descriptor, wait).await?;
                Ok(format!("Unchecked {}", descriptor))
            }

            StepCall::AssertText {
                expected,
                negate,
                element,
            } => {
                let scope = match element {
                    Some(name) => TextScope::Element(Descriptor::new(name)),
                    None => TextScope::Document,
                };
                AssertionEngine::assert_text_contains(session, &scope, &expected, negate).await?;
                Ok(format!(
                    "Text \"{}\" {}",
                    expected,
                    if negate { "absent" } else { "present" }
                ))
            }
            StepCall::AssertHomepage => {
                AssertionEngine::assert_url_equals(session, &self.config.launch_url).await?;
                Ok("On the homepage".to_string())
            }
            StepCall::AssertPath(path) => {
                AssertionEngine::assert_url_contains(session, &path).await?;
                Ok(format!("URL contains \"{}\"", path))
            }
        }
    }

    async fn visit<S: Session + ?Sized>(
        &self,
        session: &mut S,
        url: &str,
    ) -> Result<String, StepError> {
        info!("Navigating to {}", url);
        let nav = session.navigate(url).await?;
        Ok(format!("Navigated to {}", nav.url))
    }
}
