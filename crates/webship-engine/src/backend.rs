use async_trait::async_trait;
pub use webship_common::error::BackendError;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// The Session trait is the single browser handle every step runs against.
///
/// Element enumeration, value mutation, clicks and visibility checks all go
/// through [`Session::execute_script`]; see [`crate::page`].
#[async_trait]
pub trait Session: Send + Sync {
    /// Launch the session (start browser, connect to a driver, etc.)
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the session and cleanup resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Check if the session is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a specific URL.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// URL of the page currently loaded.
    async fn current_url(&mut self) -> Result<String, BackendError>;

    /// Run `body` as the body of a function in the page, WebDriver style:
    /// `args` are visible as `arguments` and the `return` value comes back as JSON.
    async fn execute_script(
        &mut self,
        body: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, BackendError>;

    /// Navigate back in browser history.
    async fn go_back(&mut self) -> Result<NavigationResult, BackendError> {
        Err(BackendError::NotSupported("go_back".into()))
    }

    /// Navigate forward in browser history.
    async fn go_forward(&mut self) -> Result<NavigationResult, BackendError> {
        Err(BackendError::NotSupported("go_forward".into()))
    }

    /// Refresh the current page.
    async fn refresh(&mut self) -> Result<NavigationResult, BackendError> {
        Err(BackendError::NotSupported("refresh".into()))
    }
}
