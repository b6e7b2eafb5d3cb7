use crate::webdriver::{WebDriverClient, headless_capabilities};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, warn};
use webship_engine::backend::{BackendError, NavigationResult, Session};

const MAX_SCRIPT_ATTEMPTS: u32 = 3;

/// Page requests that may navigate away, losing their own return value.
const MUTATING_ACTIONS: [&str; 4] = ["click", "fill", "select", "check"];

/// A [`Session`] over an external WebDriver server (chromedriver, geckodriver,
/// WPEWebDriver, ...).
pub struct EmbeddedSession {
    client: Option<WebDriverClient>,
    webdriver_url: String,
    headless: bool,
}

impl EmbeddedSession {
    pub fn with_url(webdriver_url: impl Into<String>) -> Self {
        Self {
            client: None,
            webdriver_url: webdriver_url.into(),
            headless: true,
        }
    }

    /// Let the driver open a visible window.
    pub fn visible(mut self, visible: bool) -> Self {
        self.headless = !visible;
        self
    }

    fn client(&self) -> Result<&WebDriverClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    async fn get_navigation_result(
        client: &WebDriverClient,
    ) -> Result<NavigationResult, BackendError> {
        let title = client.client.title().await.unwrap_or_default();
        let url = client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_default();

        Ok(NavigationResult { url, title })
    }
}

/// Action named in a page request, if the first argument is one.
fn request_action(args: &[Value]) -> Option<&str> {
    args.first()?.get("action")?.as_str()
}

#[async_trait]
impl Session for EmbeddedSession {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Connecting to WebDriver at {}...", self.webdriver_url);
        let capabilities = self.headless.then(headless_capabilities);
        let client = WebDriverClient::connect(&self.webdriver_url, capabilities)
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;

        info!("Navigating to: {}", url);
        client
            .client
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        Self::get_navigation_result(client).await
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        let client = self.client()?;
        client
            .client
            .current_url()
            .await
            .map(|u| u.to_string())
            .map_err(|e| BackendError::Other(e.to_string()))
    }

    async fn execute_script(
        &mut self,
        body: &str,
        args: Vec<Value>,
    ) -> Result<Value, BackendError> {
        let client = self.client()?;
        let action = request_action(&args).map(str::to_string);

        let mut last_error = None;
        for attempt in 1..=MAX_SCRIPT_ATTEMPTS {
            if attempt > 1 {
                warn!("Retrying page script (attempt {})...", attempt);
                tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            }

            match client.client.execute(body, args.clone()).await {
                Ok(Value::Null) => {
                    // Some drivers drop the return value when the call navigates.
                    if let Some(action) = action
                        .as_deref()
                        .filter(|a| MUTATING_ACTIONS.contains(a))
                    {
                        info!("Script returned null, assuming navigation after {}", action);
                        return Ok(json!({
                            "status": "ok",
                            "success": true,
                            "message": "navigated",
                        }));
                    }
                    last_error = Some(BackendError::Script("Script returned null".into()));
                }
                Ok(value) => return Ok(value),
                Err(e) => {
                    let err_msg = e.to_string();
                    if err_msg.contains("undefined is not an object")
                        || err_msg.contains("__webship is not defined")
                    {
                        last_error = Some(BackendError::Script(err_msg));
                        continue;
                    }
                    return Err(BackendError::Script(err_msg));
                }
            }
        }

        Err(last_error.unwrap_or(BackendError::Script("Failed after maximum retries".into())))
    }

    async fn go_back(&mut self) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;

        client
            .client
            .back()
            .await
            .map_err(|e| BackendError::Navigation(format!("go_back failed: {}", e)))?;

        Self::get_navigation_result(client).await
    }

    async fn go_forward(&mut self) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;

        client
            .client
            .forward()
            .await
            .map_err(|e| BackendError::Navigation(format!("go_forward failed: {}", e)))?;

        Self::get_navigation_result(client).await
    }

    async fn refresh(&mut self) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;

        client
            .client
            .refresh()
            .await
            .map_err(|e| BackendError::Navigation(format!("refresh failed: {}", e)))?;

        Self::get_navigation_result(client).await
    }
}
