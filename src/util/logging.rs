// VarSleuth - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr by default, or appended to [logging] file when set.
// The analysis report itself always goes to stdout.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Initialise the logging subsystem.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
///
/// If `log_file` cannot be opened the subscriber falls back to stderr and a
/// warning is emitted once logging is live.
pub fn init(debug_flag: bool, config_level: Option<&str>, log_file: Option<&Path>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let mut open_failure = None;
    match log_file.map(|path| (path, OpenOptions::new().create(true).append(true).open(path))) {
        Some((_, Ok(file))) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Some((path, Err(e))) => {
            open_failure = Some((path, e));
            builder.with_writer(std::io::stderr).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    if let Some((path, e)) = open_failure {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "Could not open log file; logging to stderr instead"
        );
    }

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}
