use crate::cli::{RunSummary, ScenarioOutcome};

const SENSITIVE_FIELDS: [&str; 7] = [
    "password",
    "secret",
    "token",
    "key",
    "cvv",
    "ssn",
    "card_number",
];

/// Hide `value` when the field it goes into looks like it holds a secret.
pub fn mask_sensitive(value: &str, field_name: &str) -> String {
    let field = field_name.to_lowercase();
    if SENSITIVE_FIELDS.iter().any(|f| field.contains(*f)) {
        "••••••••".to_string()
    } else {
        value.to_string()
    }
}

/// One line per scenario, then the totals.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut output = String::new();
    if let Some(name) = &summary.feature {
        output.push_str(&format!("Feature: {}\n", name));
    }

    for outcome in &summary.scenarios {
        output.push_str(&format_outcome(outcome));
        output.push('\n');
    }

    output.push_str(&format!(
        "\n{} scenarios ({} passed, {} failed), {} steps passed",
        summary.scenarios.len(),
        summary.passed(),
        summary.failed(),
        summary.steps_passed(),
    ));
    output
}

pub fn format_outcome(outcome: &ScenarioOutcome) -> String {
    match &outcome.failure {
        None => format!("  ✓ {} ({} steps)", outcome.name, outcome.steps_passed),
        Some(failure) => format!(
            "  ✗ {}\n      line {}: {}\n      {}",
            outcome.name, failure.line, failure.step, failure.message
        ),
    }
}
