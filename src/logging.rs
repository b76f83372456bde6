//! Tracing setup for the binary and for tests.
//!
//! Diagnostics go to stderr. `--log-file` adds a JSON copy that is appended
//! to, so repeated invocations build up one history.

use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Mutex, Once};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Storage crates whose own events are shown from `-vv` on.
const BACKEND_TARGETS: [&str; 2] = ["rusqlite", "reqwest"];

/// Logging choices taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSettings<'a> {
    pub verbosity: u8,
    pub quiet: bool,
    pub file: Option<&'a Path>,
}

impl LogSettings<'_> {
    /// Filter directives used when `RUST_LOG` is unset.
    fn directives(&self) -> String {
        let level = match (self.quiet, self.verbosity) {
            (true, _) => return "error".to_string(),
            (false, 0) => "warn",
            (false, 1 | 2) => "debug",
            (false, _) => "trace",
        };

        let mut directives = format!("alexandria={level}");
        if self.verbosity >= 2 {
            for target in BACKEND_TARGETS {
                let _ = write!(directives, ",{target}=debug");
            }
        }
        directives
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity flags.
///
/// # Errors
///
/// Returns an error if the filter is invalid, the log file cannot be
/// opened, or a subscriber is already installed.
pub fn init_logging(settings: &LogSettings<'_>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(settings.directives()).context("invalid log filter")?,
    };

    let detailed = settings.verbosity >= 3;
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(settings.verbosity >= 2)
        .with_file(detailed)
        .with_line_number(detailed)
        .with_ansi(std::io::stderr().is_terminal());

    let json_file = settings
        .file
        .map(open_log_file)
        .transpose()?
        .map(|file| fmt::layer().json().with_writer(Mutex::new(file)).with_ansi(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(json_file)
        .try_init()
        .context("a global tracing subscriber is already installed")
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

/// Route crate events to the test harness output, once per process.
pub fn init_test_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("alexandria=debug,test=debug")
            .with_test_writer()
            .try_init();
    });
}
