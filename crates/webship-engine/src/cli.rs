//! Running features and the interactive step prompt.

use crate::backend::Session;
use crate::executor::{StepError, StepExecutor};
use crate::feature::{Feature, FeatureError, Scenario};
use crate::steps;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

/// Receives progress while steps run.
pub trait Reporter {
    fn scenario_started(&mut self, _scenario: &Scenario) {}

    fn step_passed(&mut self, step: &str, detail: &str);

    fn step_failed(&mut self, step: &str, error: &StepError);

    /// Free-form text: banners, the step list, interruptions.
    fn message(&mut self, text: &str);

    fn prompt(&mut self, _prompt: &str) {}
}

/// Progress on stdout, failures on stderr.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn scenario_started(&mut self, scenario: &Scenario) {
        println!("  Scenario: {}", scenario.name);
    }

    fn step_passed(&mut self, step: &str, detail: &str) {
        println!("    {} ... {}", step, detail);
    }

    fn step_failed(&mut self, step: &str, error: &StepError) {
        eprintln!("    {} ... FAILED: {}", step, error);
    }

    fn message(&mut self, text: &str) {
        println!("{}", text);
    }

    fn prompt(&mut self, prompt: &str) {
        print!("{}", prompt);
        if let Err(e) = io::stdout().flush() {
            warn!("Could not flush prompt: {}", e);
        }
    }
}

/// The step that ended a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub line: usize,
    pub step: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub name: String,
    pub steps_passed: usize,
    pub failure: Option<StepFailure>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub feature: Option<String>,
    pub scenarios: Vec<ScenarioOutcome>,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    pub fn steps_passed(&self) -> usize {
        self.scenarios.iter().map(|s| s.steps_passed).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Run one scenario; the first failing step skips the rest of it.
pub async fn run_scenario<S: Session + ?Sized>(
    session: &mut S,
    executor: &StepExecutor,
    scenario: &Scenario,
    reporter: &mut dyn Reporter,
) -> ScenarioOutcome {
    reporter.scenario_started(scenario);
    let mut steps_passed = 0;

    for step in &scenario.steps {
        let label = step.to_string();
        match executor.run_step(session, step).await {
            Ok(detail) => {
                reporter.step_passed(&label, &detail);
                steps_passed += 1;
            }
            Err(err) => {
                warn!(scenario = %scenario.name, line = step.line, "Step failed: {}", err);
                reporter.step_failed(&label, &err);
                return ScenarioOutcome {
                    name: scenario.name.clone(),
                    steps_passed,
                    failure: Some(StepFailure {
                        line: step.line,
                        step: label,
                        message: err.to_string(),
                    }),
                };
            }
        }
    }

    ScenarioOutcome {
        name: scenario.name.clone(),
        steps_passed,
        failure: None,
    }
}

/// Run every scenario of `feature` in order, whatever the earlier ones did.
pub async fn run_feature<S: Session + ?Sized>(
    session: &mut S,
    executor: &StepExecutor,
    feature: &Feature,
    reporter: &mut dyn Reporter,
) -> RunSummary {
    let mut scenarios = Vec::with_capacity(feature.scenarios.len());
    for scenario in &feature.scenarios {
        scenarios.push(run_scenario(session, executor, scenario, reporter).await);
    }

    RunSummary {
        feature: feature.name.clone(),
        scenarios,
    }
}

pub async fn run_file<S: Session + ?Sized>(
    session: &mut S,
    executor: &StepExecutor,
    path: &str,
    reporter: &mut dyn Reporter,
) -> Result<RunSummary, FeatureError> {
    let feature = Feature::load(path).await?;
    Ok(run_feature(session, executor, &feature, reporter).await)
}

/// What a line typed at the step prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Blank,
    Quit,
    ListSteps,
    Step(&'a str),
}

impl<'a> ReplCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return ReplCommand::Blank;
        }
        match line {
            "exit" | "quit" => ReplCommand::Quit,
            "steps" => ReplCommand::ListSteps,
            // Pasted feature lines keep their keyword.
            _ => ReplCommand::Step(
                ["Given ", "When ", "Then ", "And ", "But ", "* "]
                    .iter()
                    .find_map(|k| line.strip_prefix(k))
                    .map(str::trim_start)
                    .unwrap_or(line),
            ),
        }
    }
}

/// Read steps from `input` and run each one as it arrives, until EOF, `exit`,
/// `quit` or Ctrl-C. A failing step is reported and the prompt continues.
pub async fn run_repl<S, R>(
    session: &mut S,
    executor: &StepExecutor,
    input: R,
    prompt: &str,
    reporter: &mut dyn Reporter,
) -> io::Result<()>
where
    S: Session + ?Sized,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        reporter.prompt(prompt);
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                reporter.message("Interrupted.");
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Blank => {}
            ReplCommand::Quit => return Ok(()),
            ReplCommand::ListSteps => {
                for pattern in steps::patterns() {
                    reporter.message(pattern);
                }
            }
            ReplCommand::Step(text) => match executor.run_line(session, text).await {
                Ok(detail) => reporter.step_passed(text, &detail),
                Err(err) => reporter.step_failed(text, &err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prompt_lines() {
        assert_eq!(ReplCommand::parse("  "), ReplCommand::Blank);
        assert_eq!(ReplCommand::parse("# note"), ReplCommand::Blank);
        assert_eq!(ReplCommand::parse("quit"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse(" steps "), ReplCommand::ListSteps);
        assert_eq!(
            ReplCommand::parse(" I press \"Go\" "),
            ReplCommand::Step("I press \"Go\"")
        );
        assert_eq!(
            ReplCommand::parse("When I press \"Go\""),
            ReplCommand::Step("I press \"Go\"")
        );
        assert_eq!(
            ReplCommand::parse("Whenever"),
            ReplCommand::Step("Whenever")
        );
    }
}
