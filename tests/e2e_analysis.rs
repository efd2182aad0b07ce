// VarSleuth - tests/e2e_analysis.rs
//
// End-to-end tests for the read -> parse -> classify -> report pipeline.
//
// These tests exercise the real filesystem, real regex matching, and real
// chrono timestamp parsing against fixture files on disk.

use std::path::PathBuf;
use varsleuth::app::analysis::{analyse_file, AnalysisConfig};
use varsleuth::core::export::{export_json, export_series_csv};
use varsleuth::core::model::Value;
use varsleuth::core::parser::ParseConfig;
use varsleuth::ui::report::{render_report, ReportOptions, NO_CHANGING_MESSAGE};
use varsleuth::util::error::VarSleuthError;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

// =============================================================================
// Parsing and classification
// =============================================================================

#[test]
fn e2e_controller_log_classification() {
    let analysis = analyse_file(
        &fixture("controller_snapshots.log"),
        &AnalysisConfig::default(),
    )
    .expect("fixture should be readable");

    assert_eq!(analysis.document.len(), 4);

    let changing: Vec<_> = analysis.classification.changing.iter().cloned().collect();
    assert_eq!(changing, ["temperature", "uptime"]);

    let statics = &analysis.classification.static_values;
    assert_eq!(statics.len(), 4);
    assert_eq!(statics["setpoint"], Value::Number(22.0));
    assert_eq!(statics["mode"], text("auto"));
    assert_eq!(statics["fan"], text("on"));
    assert_eq!(statics["last_event"], text("09:00:00 startup complete"));

    // Pre-marker lines never reach the document.
    assert!(!analysis.document.variable_names().contains("firmware"));
}

#[test]
fn e2e_controller_log_stats() {
    let analysis = analyse_file(
        &fixture("controller_snapshots.log"),
        &AnalysisConfig::default(),
    )
    .unwrap();

    let stats = analysis.stats;
    assert_eq!(stats.lines_processed, 29);
    assert_eq!(stats.marker_lines, 4);
    assert_eq!(stats.assignment_lines, 21);
    assert_eq!(stats.blank_lines, 1);
    assert_eq!(stats.skipped_lines, 3);
    assert!(analysis.skipped.is_empty());
}

#[test]
fn e2e_duplicate_assignment_keeps_last_value() {
    let analysis = analyse_file(
        &fixture("controller_snapshots.log"),
        &AnalysisConfig::default(),
    )
    .unwrap();

    let last = analysis.document.get("2024-03-18_09-15-00").unwrap();
    assert_eq!(last.get("temperature"), Some(&Value::Number(22.25)));
}

#[test]
fn e2e_static_only_log() {
    let analysis = analyse_file(&fixture("static_only.log"), &AnalysisConfig::default()).unwrap();

    assert!(analysis.classification.changing.is_empty());
    assert!(analysis.series.is_empty());
    assert_eq!(
        analysis.classification.static_values["limit"],
        Value::Number(100.0)
    );

    let mut buf = Vec::new();
    render_report(&mut buf, &analysis, &ReportOptions::default()).unwrap();
    let report = String::from_utf8(buf).unwrap();
    assert!(report.contains("serial: A1-77"));
    assert!(report.contains(NO_CHANGING_MESSAGE));
}

#[test]
fn e2e_parsing_same_file_twice_is_identical() {
    let path = fixture("controller_snapshots.log");
    let first = analyse_file(&path, &AnalysisConfig::default()).unwrap();
    let second = analyse_file(&path, &AnalysisConfig::default()).unwrap();
    assert_eq!(first.document, second.document);
    assert_eq!(first.classification, second.classification);
}

#[test]
fn e2e_diagnostics_do_not_change_results() {
    let path = fixture("controller_snapshots.log");
    let quiet = analyse_file(&path, &AnalysisConfig::default()).unwrap();
    let verbose = analyse_file(
        &path,
        &AnalysisConfig {
            parse: ParseConfig {
                diagnostics: true,
                ..ParseConfig::default()
            },
            ..AnalysisConfig::default()
        },
    )
    .unwrap();

    assert_eq!(quiet.document, verbose.document);
    assert_eq!(quiet.classification, verbose.classification);
    let lines: Vec<u64> = verbose.skipped.iter().map(|s| s.line_number).collect();
    assert_eq!(lines, [1, 2, 15]);
}

#[test]
fn e2e_memory_mapped_read_matches_buffered_read() {
    let path = fixture("controller_snapshots.log");
    let buffered = analyse_file(&path, &AnalysisConfig::default()).unwrap();
    let mapped = analyse_file(
        &path,
        &AnalysisConfig {
            large_file_threshold: 0,
            ..AnalysisConfig::default()
        },
    )
    .unwrap();
    assert_eq!(buffered.document, mapped.document);
}

// =============================================================================
// Failure
// =============================================================================

#[test]
fn e2e_missing_input_is_fatal() {
    let result = analyse_file(&fixture("does_not_exist.log"), &AnalysisConfig::default());
    assert!(
        matches!(result, Err(VarSleuthError::Io { operation: "read", .. })),
        "expected Io read error, got {result:?}"
    );
}

// =============================================================================
// Report and export
// =============================================================================

#[test]
fn e2e_report_shows_series_in_time_order() {
    let analysis = analyse_file(
        &fixture("controller_snapshots.log"),
        &AnalysisConfig::default(),
    )
    .unwrap();

    let mut buf = Vec::new();
    render_report(&mut buf, &analysis, &ReportOptions::default()).unwrap();
    let report = String::from_utf8(buf).unwrap();

    assert!(report.starts_with("Static Variables:\n"));
    assert!(report.contains("Changing Variables (2):"));
    assert!(report.contains("temperature  [min 20.00, max 22.25]"));
    let first = report.find("2024-03-18 09:00:00  20.00").unwrap();
    let last = report.find("2024-03-18 09:15:00  22.25").unwrap();
    assert!(first < last);
}

#[test]
fn e2e_csv_and_json_exports() {
    let analysis = analyse_file(
        &fixture("controller_snapshots.log"),
        &AnalysisConfig::default(),
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("series.csv");
    let file = std::fs::File::create(&csv_path).unwrap();
    let rows = export_series_csv(&analysis.series, file, &csv_path).unwrap();
    assert_eq!(rows, 4);
    let csv_text = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv_text.lines().next(), Some("timestamp,temperature,uptime"));
    assert!(csv_text.contains("2024-03-18 09:05:00,20.75,3900.0"));

    let json_path = dir.path().join("analysis.json");
    let file = std::fs::File::create(&json_path).unwrap();
    export_json(&analysis, file, &json_path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["changing"], serde_json::json!(["temperature", "uptime"]));
    assert_eq!(json["static"]["fan"], "on");
    assert_eq!(json["document"]["2024-03-18_09-10-00"]["fan"], "on");
}
