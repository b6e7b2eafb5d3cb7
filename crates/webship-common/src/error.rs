use thiserror::Error;

/// Failures raised by a browser session, independent of which driver backs it.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Session not ready")]
    NotReady,

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
