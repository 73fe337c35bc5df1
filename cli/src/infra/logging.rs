//! Log sink setup: `tracing` events to an append-only file.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where log lines ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    File(PathBuf),
    /// The file could not be opened; lines go to stderr instead.
    Stderr { reason: String },
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
///
/// Only the first call in a process installs anything.
pub fn init(log_file: &Path) -> LogSink {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .try_init();
            LogSink::File(log_file.to_path_buf())
        }
        Err(e) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
            LogSink::Stderr {
                reason: format!("cannot open {}: {e}", log_file.display()),
            }
        }
    }
}
