use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebshipConfig {
    /// Base URL that "homepage" steps open and relative paths are appended to.
    #[serde(default)]
    pub launch_url: String,
    #[serde(default)]
    pub wait: WaitConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl WebshipConfig {
    /// Absolute URL for a step path, by plain concatenation with the launch URL.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.launch_url, path)
    }
}

/// Bounds for the interactability wait performed before every element mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl WaitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    100
}

/// Browser launch options shared by both sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// WebDriver server used by `embedded` mode.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default)]
    pub visible: bool,
    /// Chromium executable for `headless` mode; found on PATH when unset.
    #[serde(default)]
    pub browser_path: Option<PathBuf>,
    /// Persistent Chromium profile; a throwaway one is used when unset.
    #[serde(default)]
    pub user_data_dir: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            visible: false,
            browser_path: None,
            user_data_dir: None,
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
