// VarSleuth - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading
// 3. Logging initialisation (debug mode support)
// 4. Analysis, text report, optional export

use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use varsleuth::app::analysis::{self, Analysis, AnalysisConfig};
use varsleuth::core::export::{self, ExportFormat};
use varsleuth::core::parser::ParseConfig;
use varsleuth::platform::config::{self, AppConfig, PlatformPaths};
use varsleuth::ui::report::{self, ReportOptions};
use varsleuth::util::constants;
use varsleuth::util::error::{ExportError, VarSleuthError};

/// VarSleuth - snapshot log analyser.
///
/// Reads a log of timestamped variable snapshots and reports which
/// variables change over time and which stay constant.
#[derive(Parser, Debug)]
#[command(name = "VarSleuth", version, about)]
struct Cli {
    /// Log file to analyse (default: [input] path from config, then log.log).
    path: Option<PathBuf>,

    /// Config file to use instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Write changing-variable series (.csv) or the full analysis (.json).
    #[arg(short = 'e', long = "export")]
    export: Option<PathBuf>,

    /// Decimal places for numeric values in the report.
    #[arg(long = "precision", value_parser = clap::value_parser!(u8).range(0..=10))]
    precision: Option<u8>,

    /// Record skipped lines and list them in the report.
    #[arg(long = "diagnostics")]
    diagnostics: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let paths = PlatformPaths::resolve();
    let loaded = match config::load_startup_config(cli.config.as_deref(), &paths) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", VarSleuthError::from(e));
            return ExitCode::FAILURE;
        }
    };
    let app_config = loaded.config;

    varsleuth::util::logging::init(
        cli.debug,
        app_config.log_level.as_deref(),
        app_config.log_file.as_deref(),
    );

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "VarSleuth starting"
    );
    tracing::debug!(config_dir = %paths.config_dir.display(), "Platform paths resolved");
    match &loaded.loaded_from {
        Some(path) => tracing::info!(path = %path.display(), "Loaded config.toml"),
        None => tracing::debug!("No config.toml loaded; using defaults"),
    }
    for warning in &loaded.warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    match run(&cli, &app_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            eprintln!("Error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, app_config: &AppConfig) -> Result<(), VarSleuthError> {
    let input = config::resolve_input_path(cli.path.as_deref(), app_config);

    let diagnostics = cli.diagnostics || app_config.diagnostics;
    let analysis_config = AnalysisConfig {
        parse: ParseConfig {
            diagnostics,
            ..ParseConfig::default()
        },
        large_file_threshold: app_config.large_file_threshold,
    };

    let result = analysis::analyse_file(&input, &analysis_config)?;

    let options = ReportOptions {
        precision: cli
            .precision
            .map(usize::from)
            .unwrap_or(app_config.precision),
        show_skipped: diagnostics,
    };
    let stdout = io::stdout();
    report::render_report(stdout.lock(), &result, &options).map_err(|e| VarSleuthError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write report",
        source: e,
    })?;

    if let Some(ref export_path) = cli.export {
        write_export(&result, export_path)?;
    }
    Ok(())
}

fn write_export(result: &Analysis, path: &Path) -> Result<(), VarSleuthError> {
    let format = ExportFormat::from_path(path)?;
    let file = File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => {
            let rows = export::export_series_csv(&result.series, writer, path)?;
            tracing::info!(path = %path.display(), rows, "Exported series CSV");
        }
        ExportFormat::Json => {
            export::export_json(result, writer, path)?;
            tracing::info!(path = %path.display(), "Exported analysis JSON");
        }
    }
    Ok(())
}
