//! Logging init: file under the XDG state dir, or stderr when that fails.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,dsget=debug"))
}

/// Path of the log file: `~/.local/state/dsget/dsget.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dsget")?;
    Ok(xdg_dirs.get_state_home().join("dsget.log"))
}

/// Initialize structured logging to the state-dir log file.
/// Returns Err if the file cannot be opened so the caller can fall back.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("dsget logging initialized at {}", path.display());
    Ok(())
}

/// Stderr-only logging, used when the state dir is unwritable.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}
