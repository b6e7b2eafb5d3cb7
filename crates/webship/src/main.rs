use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webship_e::backend::EmbeddedSession;
use webship_engine::backend::Session;
use webship_engine::cli::{self, ConsoleReporter, Reporter};
use webship_engine::config::{ConfigLoader, WebshipConfig};
use webship_engine::executor::StepExecutor;
use webship_engine::formatter::format_summary;
use webship_h::backend::HeadlessSession;

#[derive(Parser)]
#[command(name = "webship", version, about = "Run step phrases against a browser")]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Feature file to run (interactive step prompt when omitted)
    #[arg(long, global = true)]
    file: Option<String>,

    /// Config file (default: ./webship.yaml, then ~/.webship/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL for "homepage" steps and relative paths
    #[arg(long, global = true)]
    launch_url: Option<String>,

    /// Log resolution details
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Use headless browser (Chromium) via CDP
    Headless {
        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,
        /// Chromium executable (default: config, then PATH)
        #[arg(long)]
        browser: Option<PathBuf>,
    },
    /// Use a browser behind an external WebDriver server
    Embedded {
        /// WebDriver URL (default from config: http://localhost:4444)
        #[arg(long)]
        webdriver_url: Option<String>,
    },
}

async fn load_config(args: &Args) -> anyhow::Result<WebshipConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };

    if let Some(url) = &args.launch_url {
        config.launch_url = url.clone();
    }
    match &args.mode {
        Mode::Headless { visible, browser } => {
            config.backend.visible |= *visible;
            if let Some(path) = browser {
                config.backend.browser_path = Some(path.clone());
            }
        }
        Mode::Embedded { webdriver_url } => {
            if let Some(url) = webdriver_url {
                config.backend.webdriver_url = url.clone();
            }
        }
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout carries only the run report.
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&args).await?;

    let mut session: Box<dyn Session> = match args.mode {
        Mode::Headless { .. } => Box::new(HeadlessSession::new(config.backend.clone())),
        Mode::Embedded { .. } => Box::new(
            EmbeddedSession::with_url(config.backend.webdriver_url.clone())
                .visible(config.backend.visible),
        ),
    };

    if let Err(e) = session.launch().await {
        eprintln!("Failed to launch session: {}", e);
        return Err(e.into());
    }

    let executor = StepExecutor::new(config);
    let mut reporter = ConsoleReporter;

    let result: anyhow::Result<Option<_>> = match &args.file {
        Some(path) => cli::run_file(&mut *session, &executor, path, &mut reporter)
            .await
            .map(Some)
            .map_err(Into::into),
        None => {
            reporter.message("Session launched. Enter steps (e.g., 'I am on the homepage').");
            reporter.message("Type 'steps' to list known phrases, 'exit' or 'quit' to close.");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            cli::run_repl(&mut *session, &executor, stdin, "> ", &mut reporter)
                .await
                .map(|()| None)
                .map_err(Into::into)
        }
    };

    session.close().await?;

    if let Some(summary) = result? {
        println!("\n{}", format_summary(&summary));
        if !summary.is_success() {
            std::process::exit(1);
        }
    }
    Ok(())
}
