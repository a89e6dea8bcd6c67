//! Diagnostic logging setup.
//!
//! Filtering comes from `GEMCHAT_LOG` (an `EnvFilter` directive string) and
//! defaults to `warn`. The full-screen UI owns the terminal, so there logging
//! only goes to a file when one was requested.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "GEMCHAT_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Line-oriented commands: diagnostics on stderr.
    Stderr,
    /// Full-screen mode: nothing unless a log file is given.
    FileOnly,
}

pub fn init(target: LogTarget, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    match (log_file, target) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|err| err as Box<dyn Error>)?;
        }
        (None, LogTarget::Stderr) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|err| err as Box<dyn Error>)?;
        }
        (None, LogTarget::FileOnly) => {}
    }

    Ok(())
}
