// VarSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "VarSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "VarSleuth";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Input
// =============================================================================

/// Input file read when neither the CLI nor config.toml names one.
pub const DEFAULT_INPUT_PATH: &str = "log.log";

/// File size in bytes above which the input is memory-mapped instead of
/// read into a heap buffer.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 64 * 1024 * 1024; // 64 MB

/// Smallest accepted `large_file_threshold_bytes` value.
pub const MIN_LARGE_FILE_THRESHOLD: u64 = 1024; // 1 KB

/// Largest accepted `large_file_threshold_bytes` value.
pub const MAX_LARGE_FILE_THRESHOLD: u64 = 16 * 1024 * 1024 * 1024; // 16 GB

// =============================================================================
// Parsing
// =============================================================================

/// Maximum number of skipped lines recorded when diagnostics are enabled.
/// Counting continues past the cap; only the detail records stop.
pub const MAX_SKIPPED_LINES_TRACKED: usize = 1_000;

/// Maximum length of a log line included in diagnostics and debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Report
// =============================================================================

/// Decimal places used for numeric values in the series report.
pub const DEFAULT_VALUE_PRECISION: usize = 2;

/// Maximum user-configurable decimal places.
pub const MAX_VALUE_PRECISION: usize = 10;

/// Chrono format used for timestamps in the text report and exports.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
