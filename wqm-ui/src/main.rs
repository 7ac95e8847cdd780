//! wqm-ui - Water-quality map triage (terminal front end)
//!
//! Loads sensor readings from the reading service, prints tagged readings
//! as map markers and, in admin mode, lists untagged readings so their
//! coordinates can be entered and saved back to the service.

use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wqm_common::config::{load_toml_config, resolve_endpoint, LoggingConfig};
use wqm_ui::command::{Command, HELP};
use wqm_ui::{terminal, CycleOutcome, ReadingServiceClient, TriageApp};

/// Command-line arguments for wqm-ui
#[derive(Parser, Debug)]
#[command(name = "wqm-ui")]
#[command(about = "Water-quality reading map and geotag triage")]
#[command(version)]
struct Args {
    /// Reading service endpoint (overrides WQM_ENDPOINT and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// TOML config file (default: <config dir>/wqm/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "WQM_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging, args.log_level.as_deref())?;

    info!(
        "Starting wqm-ui v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let endpoint = resolve_endpoint(args.endpoint.as_deref(), &config);
    let timeout = Duration::from_secs(args.timeout_secs.unwrap_or(config.request_timeout_secs));
    let client = ReadingServiceClient::new(endpoint, timeout).context("Failed to build HTTP client")?;
    info!("Reading service: {} (timeout {:?})", client.endpoint(), timeout);
    let app = TriageApp::new(Arc::new(client), terminal::surfaces(), &config.map);

    println!("{}", HELP);
    report_cycle(app.refresh().await);

    loop {
        print!("wqm> ");
        io::stdout().flush()?;

        let line = tokio::task::spawn_blocking(read_command_line)
            .await
            .context("stdin reader task failed")??;
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", HELP),
            Ok(Command::Refresh) => report_cycle(app.refresh().await),
            Ok(Command::ToggleAdmin) => report_cycle(app.toggle_mode().await),
            Ok(Command::Tag(row)) => match app.activate_row(row - 1).await {
                Some(outcome) => debug!(success = outcome.is_success(), ?outcome, "Tagging finished"),
                None => println!("No row {} in the triage list (enter admin mode with 'a')", row),
            },
            Err(msg) => println!("{} (type 'help')", msg),
        }
    }

    info!("wqm-ui exiting");
    Ok(())
}

/// One line from stdin; `None` at end of input
fn read_command_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    Ok((read > 0).then_some(line))
}

fn report_cycle(outcome: CycleOutcome) {
    if let CycleOutcome::Rendered(summary) = outcome {
        println!(
            "{} mode: {} readings ({} tagged, {} untagged), {} markers drawn",
            summary.mode,
            summary.tagged + summary.untagged,
            summary.tagged,
            summary.untagged,
            summary.markers
        );
    }
}

/// Install the tracing subscriber
///
/// Logs go to stderr unless a log file is configured, so they never mix
/// with the interactive output on stdout.
fn init_tracing(logging: &LoggingConfig, cli_level: Option<&str>) -> Result<()> {
    let level = cli_level.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wqm_ui={0},wqm_common={0}", level)));

    let (stderr_layer, file_layer) = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => (Some(tracing_subscriber::fmt::layer().with_writer(io::stderr)), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}
