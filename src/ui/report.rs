// VarSleuth - ui/report.rs
//
// Plain-text analysis report: static variables as a list, then one
// chronological value table per changing variable.

use crate::app::analysis::Analysis;
use crate::core::model::VariableSeries;
use crate::util::constants;
use std::io::{self, Write};

/// Shown in place of the series section when nothing changed.
pub const NO_CHANGING_MESSAGE: &str = "No changing variables detected in the log file.";

/// Rendering options for `render_report`.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Decimal places for numeric series values.
    pub precision: usize,
    /// Append the skipped-line diagnostics section when there is any.
    pub show_skipped: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            precision: constants::DEFAULT_VALUE_PRECISION,
            show_skipped: false,
        }
    }
}

/// Render the full report for `analysis` to `out`.
pub fn render_report<W: Write>(
    mut out: W,
    analysis: &Analysis,
    options: &ReportOptions,
) -> io::Result<()> {
    let classification = &analysis.classification;

    writeln!(out, "Static Variables:")?;
    writeln!(out)?;
    for (name, value) in &classification.static_values {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;

    if analysis.series.is_empty() {
        writeln!(out, "{NO_CHANGING_MESSAGE}")?;
    } else {
        writeln!(out, "Changing Variables ({}):", analysis.series.len())?;
        for series in &analysis.series {
            writeln!(out)?;
            render_series(&mut out, series, options.precision)?;
        }
    }

    if options.show_skipped && !analysis.skipped.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Skipped Lines ({} of {} shown):",
            analysis.skipped.len(),
            analysis.stats.skipped_lines
        )?;
        for line in &analysis.skipped {
            writeln!(out, "  line {}: {} | {}", line.line_number, line.reason, line.preview)?;
        }
    }

    out.flush()
}

/// Render one changing variable as a `time  value` table.
fn render_series<W: Write>(
    out: &mut W,
    series: &VariableSeries,
    precision: usize,
) -> io::Result<()> {
    write!(out, "{}", series.name)?;
    if let Some((lo, hi)) = series.numeric_range() {
        write!(out, "  [min {lo:.precision$}, max {hi:.precision$}]")?;
    }
    writeln!(out)?;

    for point in &series.points {
        let value = point
            .value
            .as_ref()
            .map(|v| v.display_with_precision(precision))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {}  {value}",
            point.timestamp.format(constants::REPORT_TIMESTAMP_FORMAT)
        )?;
    }
    Ok(())
}
