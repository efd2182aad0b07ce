// VarSleuth - core/series.rs
//
// Builds the per-variable time series the presentation layer charts.
// One series per changing variable; one point per timed snapshot.

use crate::core::model::{Classification, LogDocument, SeriesPoint, Snapshot, VariableSeries};

/// Snapshots with a valid timestamp, in chronological order.
///
/// The sort is stable, so snapshots sharing a time keep document order.
/// Snapshots whose marker did not form a real date are left out.
pub fn timed_snapshots(document: &LogDocument) -> Vec<&Snapshot> {
    let mut timed: Vec<&Snapshot> = document
        .snapshots()
        .iter()
        .filter(|s| s.timestamp.is_some())
        .collect();
    timed.sort_by_key(|s| s.timestamp);

    let untimed = document.len() - timed.len();
    if untimed > 0 {
        tracing::debug!(untimed, "Snapshots without a valid timestamp left out of series");
    }
    timed
}

/// Build a series for every changing variable, ordered by variable name.
///
/// Snapshots that do not assign the variable yield a gap (`value: None`).
pub fn build_series(
    document: &LogDocument,
    classification: &Classification,
) -> Vec<VariableSeries> {
    let timed = timed_snapshots(document);

    classification
        .changing
        .iter()
        .map(|name| VariableSeries {
            name: name.clone(),
            points: timed
                .iter()
                .filter_map(|s| {
                    s.timestamp.map(|timestamp| SeriesPoint {
                        timestamp,
                        value: s.get(name).cloned(),
                    })
                })
                .collect(),
        })
        .collect()
}
