//! Chromium launched over the DevTools protocol, with one page for the whole run.

use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use webship_engine::config::BackendConfig;

#[derive(Debug, Error)]
pub enum CdpError {
    #[error("Invalid browser options: {0}")]
    Options(String),

    #[error("Chromium: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("Profile directory: {0}")]
    Profile(#[from] std::io::Error),

    #[error("CDP event loop stopped abnormally: {0}")]
    EventLoop(#[from] tokio::task::JoinError),
}

/// Where Chromium keeps its profile.
enum Profile {
    /// `user_data_dir` from the config; left in place.
    Configured(PathBuf),
    /// Fresh per launch, removed on close.
    Scratch(TempDir),
}

impl Profile {
    fn prepare(options: &BackendConfig) -> Result<Self, CdpError> {
        match &options.user_data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(Profile::Configured(dir.clone()))
            }
            None => Ok(Profile::Scratch(
                tempfile::Builder::new()
                    .prefix("webship-profile-")
                    .tempdir()?,
            )),
        }
    }

    fn path(&self) -> &Path {
        match self {
            Profile::Configured(dir) => dir,
            Profile::Scratch(dir) => dir.path(),
        }
    }
}

pub struct CdpClient {
    browser: Browser,
    events: JoinHandle<()>,
    profile: Profile,
    pub page: Page,
}

impl CdpClient {
    pub async fn launch(options: &BackendConfig) -> Result<Self, CdpError> {
        let profile = Profile::prepare(options)?;

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile.path());
        if options.visible {
            builder = builder.with_head();
        }
        if let Some(path) = &options.browser_path {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(CdpError::Options)?;

        info!(
            visible = options.visible,
            profile = %profile.path().display(),
            "Launching Chromium"
        );
        let (browser, mut handler) = Browser::launch(browser_config).await?;

        // The handler stream must be polled for any command to complete.
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        forward_console(&page).await?;
        accept_dialogs(&page).await?;

        Ok(Self {
            browser,
            events,
            profile,
            page,
        })
    }

    pub async fn close(self) -> Result<(), CdpError> {
        let Self {
            mut browser,
            events,
            profile,
            ..
        } = self;

        browser.close().await?;
        events.await?;
        if let Profile::Scratch(dir) = profile {
            dir.close()?;
        }
        Ok(())
    }
}

async fn forward_console(page: &Page) -> Result<(), CdpError> {
    let mut calls = page.event_listener::<EventConsoleApiCalled>().await?;
    tokio::spawn(async move {
        while let Some(call) = calls.next().await {
            let text: Vec<&str> = call
                .args
                .iter()
                .filter_map(|arg| arg.description.as_deref())
                .collect();
            debug!(kind = ?call.r#type, "console: {}", text.join(" "));
        }
    });
    Ok(())
}

/// An open alert/confirm/prompt blocks every later evaluation.
async fn accept_dialogs(page: &Page) -> Result<(), CdpError> {
    let mut dialogs = page
        .event_listener::<EventJavascriptDialogOpening>()
        .await?;
    let page = page.clone();
    tokio::spawn(async move {
        while let Some(dialog) = dialogs.next().await {
            info!("Accepting {:?} dialog: {}", dialog.r#type, dialog.message);
            if let Err(e) = page.execute(HandleJavaScriptDialogParams::new(true)).await {
                warn!("Could not accept dialog: {}", e);
            }
        }
    });
    Ok(())
}
