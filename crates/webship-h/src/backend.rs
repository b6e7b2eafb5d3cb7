use crate::cdp::CdpClient;
use crate::inject::execute_script;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;
use webship_engine::backend::{BackendError, NavigationResult, Session};
use webship_engine::config::BackendConfig;

/// Time given to `history.back()`/`forward()` to commit, since CDP has no
/// event for it on same-document navigations.
const HISTORY_SETTLE: Duration = Duration::from_millis(300);

/// A [`Session`] over a Chromium launched and driven through the DevTools protocol.
pub struct HeadlessSession {
    client: Option<CdpClient>,
    options: BackendConfig,
}

impl HeadlessSession {
    pub fn new(options: BackendConfig) -> Self {
        Self {
            client: None,
            options,
        }
    }

    fn client(&self) -> Result<&CdpClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    async fn get_navigation_result(
        page: &chromiumoxide::Page,
    ) -> Result<NavigationResult, BackendError> {
        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    async fn history(&mut self, script: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;
        client
            .page
            .evaluate(script)
            .await
            .map_err(|e| BackendError::Navigation(format!("{} failed: {}", script, e)))?;
        tokio::time::sleep(HISTORY_SETTLE).await;
        Self::get_navigation_result(&client.page).await
    }
}

#[async_trait]
impl Session for HeadlessSession {
    async fn launch(&mut self) -> Result<(), BackendError> {
        let client = CdpClient::launch(&self.options)
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
            .page
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        Self::get_navigation_result(&client.page).await
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        let client = self.client()?;
        client
            .page
            .url()
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?
            .ok_or_else(|| BackendError::Other("Page has no URL".into()))
    }

    async fn execute_script(
        &mut self,
        body: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BackendError> {
        let client = self.client()?;
        execute_script(&client.page, body, args).await
    }

    async fn go_back(&mut self) -> Result<NavigationResult, BackendError> {
        self.history("history.back();").await
    }

    async fn go_forward(&mut self) -> Result<NavigationResult, BackendError> {
        self.history("history.forward();").await
    }

    async fn refresh(&mut self) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;
        client
            .page
            .reload()
            .await
            .map_err(|e| BackendError::Navigation(format!("refresh failed: {}", e)))?;
        Self::get_navigation_result(&client.page).await
    }
}
