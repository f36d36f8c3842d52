#![forbid(unsafe_code)]

//! Log subscriber setup.
//!
//! The terminal is the UI, so logs never go to stdout or stderr. They are
//! written to the file named by `PANELCHECK_LOG`; without it nothing is
//! installed and every event is dropped.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";

/// Where and how to log, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub path: PathBuf,
    /// `EnvFilter` directive, e.g. `debug` or `panelcheck_core=trace`.
    pub filter: String,
    pub json: bool,
}

impl LogSettings {
    /// `None` when `PANELCHECK_LOG` is unset or empty.
    pub fn from_vars<F: Fn(&str) -> Option<String>>(var: F) -> Option<Self> {
        let path = var("PANELCHECK_LOG").filter(|p| !p.is_empty())?;
        Some(Self {
            path: PathBuf::from(path),
            filter: var("PANELCHECK_LOG_LEVEL")
                .filter(|level| !level.is_empty())
                .unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            json: var("PANELCHECK_LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }
}

/// Install the global subscriber if logging was requested.
///
/// Returns whether a subscriber was installed.
///
/// # Errors
///
/// Fails when the log file cannot be opened or a global subscriber is
/// already set.
pub fn init() -> io::Result<bool> {
    let Some(settings) = LogSettings::from_vars(|key| std::env::var(key).ok()) else {
        return Ok(false);
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.path)?;
    let filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false);
    let installed = if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(io::Error::other)?;
    tracing::info!(path = %settings.path.display(), "logging initialized");
    Ok(true)
}
