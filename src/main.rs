//! GlycoCheck: diabetes risk estimate from routine clinical attributes.
//!
//! Main entry point for the terminal application.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use glycocheck::adapters::sanitize::SanitizingMakeWriter;
use glycocheck::config::Settings;
use glycocheck::tui::App;

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {parent:?}"))?;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {path:?}"))
}

fn main() -> Result<()> {
    let settings = Settings::from_env();

    // Writing logs to the terminal corrupts the TUI (alternate screen), so
    // interactive sessions log to a file unless told otherwise.
    let interactive = std::io::stdout().is_terminal();

    let (writer, _guard) = if settings.log_mode.use_file(interactive) {
        tracing_appender::non_blocking(open_log_file(&settings.log_file)?)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer().with_writer(
                SanitizingMakeWriter::new(writer).with_max_bytes(settings.sanitize_max_bytes),
            ),
        )
        .init();

    tracing::info!("Starting GlycoCheck...");

    // Refuse to start if the model cannot be loaded or verified.
    let mut app = App::new(&settings)?;
    app.run()?;

    tracing::info!("GlycoCheck shutdown complete.");
    Ok(())
}
