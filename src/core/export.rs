// VarSleuth - core/export.rs
//
// CSV export of changing-variable series and JSON export of a full analysis.
// Core layer: writes to any Write trait object.

use crate::core::model::{Value, VariableSeries};
use crate::util::constants;
use crate::util::error::ExportError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output format chosen from the export file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick a format from `path`'s extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(ExportError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Export series as a wide CSV table.
///
/// Columns: `timestamp`, then one column per series in the given order.
/// One row per distinct timestamp, oldest first. Gaps are empty cells.
/// Returns the number of data rows written.
pub fn export_series_csv<W: Write>(
    series: &[VariableSeries],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e: csv::Error| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["timestamp"];
    header.extend(series.iter().map(|s| s.name.as_str()));
    csv_writer.write_record(&header).map_err(csv_err)?;

    let lookups: Vec<BTreeMap<NaiveDateTime, &Value>> = series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .filter_map(|p| p.value.as_ref().map(|v| (p.timestamp, v)))
                .collect()
        })
        .collect();

    let timestamps: BTreeSet<NaiveDateTime> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.timestamp))
        .collect();

    for ts in &timestamps {
        let mut record = Vec::with_capacity(series.len() + 1);
        record.push(ts.format(constants::REPORT_TIMESTAMP_FORMAT).to_string());
        for lookup in &lookups {
            record.push(lookup.get(ts).map(|v| v.to_string()).unwrap_or_default());
        }
        csv_writer.write_record(&record).map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(
        path = %export_path.display(),
        rows = timestamps.len(),
        columns = series.len(),
        "CSV export written"
    );
    Ok(timestamps.len())
}

/// Export any serialisable analysis view as pretty-printed JSON.
pub fn export_json<W: Write, T: Serialize + ?Sized>(
    value: &T,
    mut writer: W,
    export_path: &Path,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| ExportError::Json {
        path: PathBuf::from(export_path),
        source: e,
    })?;
    writer.flush().map_err(|e| ExportError::Io {
        path: PathBuf::from(export_path),
        source: e,
    })
}
