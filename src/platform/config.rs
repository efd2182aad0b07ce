// VarSleuth - platform/config.rs
//
// Platform config directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for VarSleuth configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/varsleuth/ or %APPDATA%\VarSleuth\config\)
    pub config_dir: PathBuf,
    /// True when platform dirs could not be determined and `config_dir` is
    /// the current directory.
    pub fallback: bool,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    /// Runs before logging is initialised, so the fallback is reported through
    /// `load_startup_config` warnings rather than logged here.
    pub fn resolve() -> Self {
        match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => Self {
                config_dir: proj_dirs.config_dir().to_path_buf(),
                fallback: false,
            },
            None => Self {
                config_dir: PathBuf::from("."),
                fallback: true,
            },
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[input]` section.
    pub input: InputSection,
    /// `[parsing]` section.
    pub parsing: ParsingSection,
    /// `[report]` section.
    pub report: ReportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Log file analysed when no path is given on the command line.
    pub path: Option<String>,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Record and trace-log skipped lines.
    pub diagnostics: Option<bool>,
    /// Size above which the input is memory-mapped.
    pub large_file_threshold_bytes: Option<u64>,
}

/// `[report]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Decimal places for numeric series values.
    pub precision: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Input path from config, if any.
    pub input_path: Option<PathBuf>,
    /// Parse diagnostics enabled.
    pub diagnostics: bool,
    /// Memory-map threshold in bytes.
    pub large_file_threshold: u64,
    /// Decimal places in the series report.
    pub precision: usize,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Log file path.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            diagnostics: false,
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
            precision: constants::DEFAULT_VALUE_PRECISION,
            log_level: None,
            log_file: None,
        }
    }
}

/// Read and deserialise `path` without any fallback.
pub fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Outcome of startup config loading.
///
/// Built before tracing is initialised, so nothing here is logged directly.
/// The caller logs `loaded_from` and `warnings` once logging is up.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    /// Validated configuration (defaults where nothing valid was found).
    pub config: AppConfig,
    /// Non-fatal problems found while loading.
    pub warnings: Vec<String>,
    /// File the configuration was read from, if one was read.
    pub loaded_from: Option<PathBuf>,
}

impl LoadedConfig {
    fn defaults(warnings: Vec<String>) -> Self {
        Self {
            config: AppConfig::default(),
            warnings,
            loaded_from: None,
        }
    }
}

/// Load and validate config.toml at `config_path`.
///
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning.
pub fn load_config(config_path: &Path) -> LoadedConfig {
    if !config_path.exists() {
        return LoadedConfig::defaults(Vec::new());
    }

    match read_raw_config(config_path) {
        Ok(raw) => {
            let (config, warnings) = validate(raw);
            LoadedConfig {
                config,
                warnings,
                loaded_from: Some(config_path.to_path_buf()),
            }
        }
        Err(e) => LoadedConfig::defaults(vec![format!("{e}. Using defaults.")]),
    }
}

/// Load the configuration used at startup.
///
/// An `explicit` path (from `--config`) must exist and parse; any failure is
/// returned as an error. Otherwise the platform default is loaded with
/// `load_config` semantics, and a platform-directory fallback is reported
/// as a warning.
pub fn load_startup_config(
    explicit: Option<&Path>,
    paths: &PlatformPaths,
) -> Result<LoadedConfig, ConfigError> {
    if let Some(path) = explicit {
        let (config, warnings) = validate(read_raw_config(path)?);
        return Ok(LoadedConfig {
            config,
            warnings,
            loaded_from: Some(path.to_path_buf()),
        });
    }

    let mut loaded = load_config(&paths.config_file());
    if paths.fallback {
        loaded.warnings.insert(
            0,
            format!(
                "Could not determine platform directories. Looking for {} in '{}'.",
                constants::CONFIG_FILE_NAME,
                paths.config_dir.display()
            ),
        );
    }
    Ok(loaded)
}

/// Choose the log file to analyse: command line, then `[input] path`, then
/// the built-in default.
pub fn resolve_input_path(cli_path: Option<&Path>, config: &AppConfig) -> PathBuf {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| config.input_path.clone())
        .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_INPUT_PATH))
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Input: path --
    if let Some(path) = raw.input.path {
        if path.trim().is_empty() {
            warnings.push(format!(
                "[input] path is empty. Using default ({}).",
                constants::DEFAULT_INPUT_PATH
            ));
        } else {
            config.input_path = Some(PathBuf::from(path));
        }
    }

    // -- Parsing --
    if let Some(diagnostics) = raw.parsing.diagnostics {
        config.diagnostics = diagnostics;
    }

    if let Some(threshold) = raw.parsing.large_file_threshold_bytes {
        if (constants::MIN_LARGE_FILE_THRESHOLD..=constants::MAX_LARGE_FILE_THRESHOLD)
            .contains(&threshold)
        {
            config.large_file_threshold = threshold;
        } else {
            warnings.push(format!(
                "[parsing] large_file_threshold_bytes = {threshold} is out of range ({}-{}). Using default ({}).",
                constants::MIN_LARGE_FILE_THRESHOLD,
                constants::MAX_LARGE_FILE_THRESHOLD,
                constants::DEFAULT_LARGE_FILE_THRESHOLD,
            ));
        }
    }

    // -- Report: precision --
    if let Some(precision) = raw.report.precision {
        if precision <= constants::MAX_VALUE_PRECISION {
            config.precision = precision;
        } else {
            warnings.push(format!(
                "[report] precision = {precision} is out of range (0-{}). Using default ({}).",
                constants::MAX_VALUE_PRECISION,
                constants::DEFAULT_VALUE_PRECISION,
            ));
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    // -- Logging: file --
    if let Some(file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(PathBuf::from(file));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_str(toml_text: &str) -> (AppConfig, Vec<String>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        std::fs::write(&path, toml_text).unwrap();
        let loaded = load_config(&path);
        (loaded.config, loaded.warnings)
    }

    fn paths_in(dir: &Path, fallback: bool) -> PlatformPaths {
        PlatformPaths {
            config_dir: dir.to_path_buf(),
            fallback,
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join("config.toml"));
        assert_eq!(loaded.config, AppConfig::default());
        assert!(loaded.warnings.is_empty());
        assert!(loaded.loaded_from.is_none());
    }

    #[test]
    fn test_valid_config() {
        let (config, warnings) = load_str(
            r#"
[input]
path = "data/run.log"

[parsing]
diagnostics = true
large_file_threshold_bytes = 4096

[report]
precision = 4

[logging]
level = "DEBUG"
file = "varsleuth.log"
"#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.input_path, Some(PathBuf::from("data/run.log")));
        assert!(config.diagnostics);
        assert_eq!(config.large_file_threshold, 4096);
        assert_eq!(config.precision, 4);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file, Some(PathBuf::from("varsleuth.log")));
    }

    #[test]
    fn test_out_of_range_values_warn_and_fall_back() {
        let (config, warnings) = load_str(
            r#"
[parsing]
large_file_threshold_bytes = 10

[report]
precision = 99

[logging]
level = "loud"
"#,
        );
        assert_eq!(warnings.len(), 3, "{warnings:?}");
        assert_eq!(config.large_file_threshold, constants::DEFAULT_LARGE_FILE_THRESHOLD);
        assert_eq!(config.precision, constants::DEFAULT_VALUE_PRECISION);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_file_warns_with_defaults() {
        let (config, warnings) = load_str("[report\nprecision = ");
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"), "{}", warnings[0]);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (config, warnings) = load_str("[future]\nknob = 1\n[report]\nprecision = 0\n");
        assert!(warnings.is_empty());
        assert_eq!(config.precision, 0);
    }

    #[test]
    fn test_read_raw_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_raw_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    // -------------------------------------------------------------------------
    // Startup loading
    // -------------------------------------------------------------------------

    #[test]
    fn test_startup_explicit_config_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[report]\nprecision = 5\n").unwrap();

        let loaded = load_startup_config(Some(&path), &paths_in(dir.path(), false)).unwrap();
        assert_eq!(loaded.config.precision, 5);
        assert_eq!(loaded.loaded_from.as_deref(), Some(path.as_path()));
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_startup_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load_startup_config(Some(&path), &paths_in(dir.path(), false)).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err:?}");
    }

    #[test]
    fn test_startup_broken_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[report\nprecision = ").unwrap();
        let err = load_startup_config(Some(&path), &paths_in(dir.path(), false)).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse { .. }), "{err:?}");
    }

    #[test]
    fn test_startup_broken_default_config_warns() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(constants::CONFIG_FILE_NAME),
            "[report\nprecision = ",
        )
        .unwrap();

        let loaded = load_startup_config(None, &paths_in(dir.path(), false)).unwrap();
        assert_eq!(loaded.config, AppConfig::default());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.loaded_from.is_none());
    }

    #[test]
    fn test_startup_default_config_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        std::fs::write(&path, "[parsing]\ndiagnostics = true\n").unwrap();

        let loaded = load_startup_config(None, &paths_in(dir.path(), false)).unwrap();
        assert!(loaded.config.diagnostics);
        assert_eq!(loaded.loaded_from, Some(path));
    }

    #[test]
    fn test_startup_platform_fallback_warns() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_startup_config(None, &paths_in(dir.path(), true)).unwrap();
        assert_eq!(loaded.config, AppConfig::default());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(
            loaded.warnings[0].contains("platform directories"),
            "{}",
            loaded.warnings[0]
        );
    }

    // -------------------------------------------------------------------------
    // Input path resolution
    // -------------------------------------------------------------------------

    #[test]
    fn test_input_path_prefers_command_line() {
        let config = AppConfig {
            input_path: Some(PathBuf::from("from_config.log")),
            ..AppConfig::default()
        };
        let path = resolve_input_path(Some(Path::new("from_cli.log")), &config);
        assert_eq!(path, PathBuf::from("from_cli.log"));
    }

    #[test]
    fn test_input_path_falls_back_to_config() {
        let config = AppConfig {
            input_path: Some(PathBuf::from("from_config.log")),
            ..AppConfig::default()
        };
        assert_eq!(
            resolve_input_path(None, &config),
            PathBuf::from("from_config.log")
        );
    }

    #[test]
    fn test_input_path_defaults_to_log_log() {
        assert_eq!(
            resolve_input_path(None, &AppConfig::default()),
            PathBuf::from(constants::DEFAULT_INPUT_PATH)
        );
    }
}
