use clap::Parser;
use dexdesk::cli::Cli;
use dexdesk::config::{AppConfig, LoggingConfig};
use std::path::Path;
use tracing::{debug, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    let _guard = init_logging(&config.logging);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("config: {}", e);
        }
        anyhow::bail!("invalid configuration ({} errors)", errors.len());
    }
    debug!("loaded configuration from {}", cli.config_dir.display());

    cli.run(config).await
}

/// Console logging, plus a daily rolling file when `DESK_LOG_DIR` is set.
///
/// `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = if config.level.is_empty() { "info" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},dexdesk=debug", level)));

    let (file_layer, guard) = match std::env::var("DESK_LOG_DIR") {
        Ok(log_dir) => match file_writer(Path::new(&log_dir)) {
            Ok((writer, guard)) => (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true),
                ),
                Some(guard),
            ),
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                (None, None)
            }
        },
        Err(_) => (None, None),
    };

    let console_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// `tracing_appender::rolling::daily` panics if it cannot create the file,
/// so writability is checked first.
fn file_writer(
    log_dir: &Path,
) -> std::io::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)?;
    let marker = log_dir.join(".dexdesk_write_test");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&marker)?;
    let _ = std::fs::remove_file(&marker);

    let appender = tracing_appender::rolling::daily(log_dir, "dexdesk.log");
    Ok(tracing_appender::non_blocking(appender))
}
