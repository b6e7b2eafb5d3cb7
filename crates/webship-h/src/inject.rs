use chromiumoxide::Page;
use std::time::Duration;
use webship_engine::backend::BackendError;

/// Upper bound for one script evaluation; a dialog left open would otherwise hang it.
const EVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum retries for context errors during page navigation.
const MAX_CONTEXT_RETRIES: u32 = 10;

/// Delay between retries when context is not found (page navigating).
const CONTEXT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Check if an error indicates the page context is unavailable (e.g., during navigation).
fn is_context_error(err: &str) -> bool {
    err.contains("Cannot find context")
        || err.contains("Execution context was destroyed")
        || err.contains("-32000")
}

/// Turn a WebDriver-style function body into a CDP expression.
///
/// The body sees `args` as `arguments`. The expression must not start with a
/// parenthesis or `function`, or chromiumoxide treats it as a callable.
pub fn wrap_function_body(body: &str, args: &[serde_json::Value]) -> Result<String, BackendError> {
    let args_json = serde_json::to_string(args)?;
    Ok(format!(
        "Reflect.apply(function () {{\n{}\n}}, null, {})",
        body, args_json
    ))
}

pub async fn execute_script(
    page: &Page,
    body: &str,
    args: Vec<serde_json::Value>,
) -> Result<serde_json::Value, BackendError> {
    let expression = wrap_function_body(body, &args)?;
    tracing::debug!(args = %serde_json::Value::Array(args), "Evaluating page script");

    let mut last_error = None;

    for attempt in 0..MAX_CONTEXT_RETRIES {
        match evaluate_with_timeout(page, &expression).await {
            Ok(value) => return Ok(value),
            Err(EvalError::Timeout) => {
                return Err(BackendError::Script(
                    "Script timed out - possibly blocked by a dialog (alert/confirm/prompt)"
                        .into(),
                ));
            }
            Err(EvalError::Context(err_str)) => {
                tracing::debug!(
                    "Context error during script (attempt {}/{}), retrying...",
                    attempt + 1,
                    MAX_CONTEXT_RETRIES
                );
                last_error = Some(err_str);
                tokio::time::sleep(CONTEXT_RETRY_DELAY).await;
            }
            Err(EvalError::Other(err_str)) => {
                return Err(BackendError::Script(format!(
                    "Evaluation failed: {}",
                    err_str
                )));
            }
        }
    }

    Err(BackendError::Script(last_error.unwrap_or_else(|| {
        "Failed to execute script after retries".to_string()
    })))
}

enum EvalError {
    Timeout,
    Context(String),
    Other(String),
}

async fn evaluate_with_timeout(
    page: &Page,
    expression: &str,
) -> Result<serde_json::Value, EvalError> {
    let eval_result = tokio::time::timeout(EVAL_TIMEOUT, page.evaluate(expression)).await;

    match eval_result {
        Err(_) => Err(EvalError::Timeout),
        Ok(Err(e)) => {
            let err_str = e.to_string();
            if is_context_error(&err_str) {
                Err(EvalError::Context(err_str))
            } else {
                Err(EvalError::Other(err_str))
            }
        }
        // `undefined` comes back without a value; report it as null.
        Ok(Ok(remote_object)) => Ok(remote_object
            .value()
            .cloned()
            .unwrap_or(serde_json::Value::Null)),
    }
}
