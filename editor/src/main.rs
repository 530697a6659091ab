//! os2iot-editor - reconcile OS2IoT devices against a CSV file
//!
//! Reads a CSV of device names and positions, previews what differs from the
//! registry and, after confirmation, pushes full-record updates.

mod cli;
mod commands;
mod config;
mod error;
mod services;
mod types;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::services::registry::Os2iotClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before anything reads LOGS_DIR or RUST_LOG
    dotenvy::dotenv().ok();

    let logs_dir = config::logs_dir_from_env();
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "os2iot-editor.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // stderr keeps stdout free for the preview and summary
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,os2iot_editor=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let config = config::Config::from_env()?;
    info!("Using device registry at {}", config.registry.base_url);

    let registry = Os2iotClient::new(config.registry)?;

    match cli.command {
        Command::Preview { input, payload_out } => {
            let session = commands::preview(&registry, &input).await?;
            if let Some(path) = payload_out {
                commands::write_payload(&session, &path)?;
            }
        }
        Command::Apply { input, yes } => {
            commands::apply(&registry, &input, yes).await?;
        }
    }

    Ok(())
}
