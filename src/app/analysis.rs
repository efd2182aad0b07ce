// VarSleuth - app/analysis.rs
//
// Analysis pipeline: read input -> parse -> classify -> build series.
// Runs to completion on the calling thread. The only failure is being
// unable to read the input file; nothing partial is returned in that case.

use crate::core::classify;
use crate::core::model::{Classification, LogDocument, ParseStats, SkippedLine, VariableSeries};
use crate::core::parser::{self, ParseConfig};
use crate::core::series;
use crate::platform::fs;
use crate::util::constants;
use crate::util::error::{Result, VarSleuthError};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Settings for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub parse: ParseConfig,
    /// Size above which the input file is memory-mapped.
    pub large_file_threshold: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parse: ParseConfig::default(),
            large_file_threshold: constants::DEFAULT_LARGE_FILE_THRESHOLD,
        }
    }
}

/// Everything the presentation layer needs, produced by one run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Path of the analysed input.
    pub source: PathBuf,
    pub stats: ParseStats,
    /// Timestamp -> variable -> value, in document order.
    pub document: LogDocument,
    #[serde(flatten)]
    pub classification: Classification,
    #[serde(skip)]
    pub series: Vec<VariableSeries>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedLine>,
}

/// Read `path` and analyse its content.
///
/// A missing or unreadable file is fatal and returned as
/// `VarSleuthError::Io` with operation `"read"`.
pub fn analyse_file(path: &Path, config: &AnalysisConfig) -> Result<Analysis> {
    tracing::info!(file = %path.display(), "Parsing log file");

    let content =
        fs::read_log_file(path, config.large_file_threshold).map_err(|e| VarSleuthError::Io {
            path: path.to_path_buf(),
            operation: "read",
            source: e,
        })?;

    Ok(analyse_content(&content, path, config))
}

/// Analyse log text already in memory. `source` is recorded, never opened.
pub fn analyse_content(content: &str, source: &Path, config: &AnalysisConfig) -> Analysis {
    let parsed = parser::parse_content(content, &config.parse);

    tracing::info!(
        snapshots = parsed.document.len(),
        "Identifying changing and static variables"
    );
    let classification = classify::classify(&parsed.document);
    let series = series::build_series(&parsed.document, &classification);

    tracing::info!(
        changing = classification.changing.len(),
        static_count = classification.static_values.len(),
        "Analysis complete"
    );
    if classification.changing.is_empty() {
        tracing::warn!("No changing variables detected in the log file");
    } else {
        tracing::info!(variables = ?classification.changing, "Changing variables");
    }

    Analysis {
        source: source.to_path_buf(),
        stats: parsed.stats,
        document: parsed.document,
        classification,
        series,
        skipped: parsed.skipped,
    }
}
