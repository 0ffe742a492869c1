//! CLI entry point for the checkpoint traffic dashboard.
//!
//! Provides subcommands for serving the dashboard over HTTP, rendering a
//! one-shot report to a file, and listing the source files visible in the
//! storage folder.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use anpr_dashboard::config::AppConfig;
use anpr_dashboard::infra::gdrive::DriveClient;
use anpr_dashboard::output::render_page;
use anpr_dashboard::report::{Dashboard, build_dashboard};
use anpr_dashboard::server;
use anpr_dashboard::services::file_store::{FileStore, ListQuery};

#[derive(Parser)]
#[command(name = "anpr_dashboard")]
#[command(about = "Traffic dashboard over ANPR checkpoint spreadsheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard HTTP server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Build the dashboard once and write the HTML page to a file
    Report {
        /// Reporting date (YYYY-MM-DD); omit for the full history view
        #[arg(short, long)]
        date: Option<String>,

        /// File to write the rendered page to
        #[arg(short, long, default_value = "dashboard.html")]
        output: String,
    },
    /// List the source files the catalog returns
    ListFiles {
        /// Restrict the listing to files modified on this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/anpr_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("anpr_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve { bind } => {
            server::serve(&bind, config).await?;
        }
        Commands::Report { date, output } => {
            let dashboard = match &config.credential {
                None => Dashboard::error(
                    "The GDRIVE_CREDENTIALS_JSON environment variable is not set.".to_string(),
                ),
                Some(credential) => match DriveClient::new(credential).await {
                    Ok(client) => build_dashboard(&client, &config, date.as_deref()).await,
                    Err(e) => Dashboard::error(format!("An error occurred: {e}")),
                },
            };

            let page = render_page(&dashboard, date.as_deref());
            std::fs::write(&output, page)?;
            info!(output = %output, "Report written");
        }
        Commands::ListFiles { date } => {
            list_files(&config, date.as_deref()).await?;
        }
    }

    Ok(())
}

/// Logs the catalog listing for a date (or the whole folder), for checking
/// what the selection policy will see.
#[tracing::instrument(skip(config), fields(date = ?date))]
async fn list_files(config: &AppConfig, date: Option<&str>) -> Result<()> {
    let day = date
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("date must be YYYY-MM-DD")?;

    let folder_id = config
        .folder_id
        .as_deref()
        .context("GDRIVE_FOLDER_ID must be set")?;
    let credential = config
        .credential
        .as_ref()
        .context("GDRIVE_CREDENTIALS_JSON must be set")?;

    let client = DriveClient::new(credential).await?;
    let files = client
        .list_files(&ListQuery::new(folder_id, &config.spreadsheet_mime, day))
        .await?;

    info!(total = files.len(), "File listing fetched");
    for file in &files {
        info!(
            file_id = %file.id,
            file_name = %file.name,
            modified = %file.modified_time,
            "File"
        );
    }

    Ok(())
}
