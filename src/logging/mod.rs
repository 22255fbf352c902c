//! Logging for the knot trainer
//!
//! This module provides:
//! - Bracketed log lines that carry the active pipeline stage
//! - Dual logging (file + stdout)
//! - One timestamped log file per run

mod formatter;
mod setup;

pub use setup::setup_logging;
