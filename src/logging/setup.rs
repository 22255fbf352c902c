use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::formatter::BracketedFormatter;
use crate::error::{PipelineError, PipelineResult};

/// Install the global subscriber: bracketed lines to stdout and to
/// `<base>/logs/knot_trainer_<timestamp>.log`. Returns the log file path.
///
/// The log file is created before the pipeline starts, so it is written even
/// when the raw dataset turns out to be missing. It never touches the working
/// directory.
pub fn setup_logging(base_dir: &Path) -> PipelineResult<PathBuf> {
    // Create logs directory
    let log_dir = base_dir.join("logs");
    fs::create_dir_all(&log_dir).map_err(|e| PipelineError::io(&log_dir, e))?;

    // One log file per run, named by start time
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("knot_trainer_{}.log", timestamp));

    // Create file appender
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)
        .map_err(|e| PipelineError::io(&log_path, e))?;

    let file_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false); // No ANSI colors in the file

    let stdout_layer = fmt::layer()
        .event_format(BracketedFormatter)
        .with_writer(std::io::stdout);

    // RUST_LOG wins; otherwise debug and above
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(|e| PipelineError::Logging(e.to_string()))?;

    info!("Log file created at: {:?}", log_path);

    Ok(log_path)
}
