// VarSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

// =============================================================================
// Value
// =============================================================================

/// A single observed variable value.
///
/// Equality is type-aware: a `Number` is never equal to a `Text`, even when
/// the text is the printed form of the number. Numbers compare with `f64`
/// equality, so `0.0 == -0.0` and `NaN` is never equal to anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// The numeric payload, if this value was coerced to a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    /// Format with a fixed number of decimals for numbers; text is verbatim.
    pub fn display_with_precision(&self, precision: usize) -> String {
        match self {
            Value::Number(n) => format!("{n:.precision$}"),
            Value::Text(t) => t.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Debug formatting keeps the decimal point on whole numbers (20.0).
            Value::Number(n) => write!(f, "{n:?}"),
            Value::Text(t) => f.write_str(t),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// All variable assignments observed under one timestamp marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Raw marker token, e.g. `2024-01-01_00-05-00`.
    pub key: String,

    /// Parsed calendar time. `None` when the digits matched the marker
    /// pattern but do not form a real date (e.g. month 13).
    pub timestamp: Option<NaiveDateTime>,

    /// Variable name -> last assigned value within this block.
    pub variables: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn new(key: impl Into<String>, timestamp: Option<NaiveDateTime>) -> Self {
        Self {
            key: key.into(),
            timestamp,
            variables: BTreeMap::new(),
        }
    }

    /// Assign `value` to `name`, replacing any earlier assignment.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

// =============================================================================
// Log Document
// =============================================================================

/// Snapshots keyed by timestamp string, in order of first appearance.
///
/// A key maps to exactly one snapshot; seeing the same marker again
/// re-selects the existing snapshot rather than creating a second one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogDocument {
    snapshots: Vec<Snapshot>,
    index: HashMap<String, usize>,
}

impl LogDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the snapshot for `key`, creating an empty one at the end of the
    /// document if this key has not been seen yet.
    ///
    /// `timestamp` is only consulted when a new snapshot is created.
    pub fn snapshot_or_insert(
        &mut self,
        key: &str,
        timestamp: impl FnOnce() -> Option<NaiveDateTime>,
    ) -> &mut Snapshot {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.snapshots.len();
                self.snapshots.push(Snapshot::new(key, timestamp()));
                self.index.insert(key.to_string(), idx);
                idx
            }
        };
        &mut self.snapshots[idx]
    }

    pub fn get(&self, key: &str) -> Option<&Snapshot> {
        self.index.get(key).map(|&idx| &self.snapshots[idx])
    }

    /// Snapshots in document order.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Union of variable names across all snapshots, sorted.
    pub fn variable_names(&self) -> BTreeSet<&str> {
        self.snapshots
            .iter()
            .flat_map(|s| s.variables.keys().map(String::as_str))
            .collect()
    }

    /// Values of `name` from every snapshot that contains it, in document
    /// order. Snapshots lacking the variable are skipped.
    pub fn values_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.snapshots.iter().filter_map(move |s| s.get(name))
    }
}

/// Serialises as `{ "<timestamp>": { "<variable>": <value>, ... }, ... }`
/// in document order.
impl Serialize for LogDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.snapshots.len()))?;
        for snapshot in &self.snapshots {
            map.serialize_entry(&snapshot.key, &snapshot.variables)?;
        }
        map.end()
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Partition of every variable name in a document into changing and static.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    /// Variables observed with two or more distinct values.
    pub changing: BTreeSet<String>,

    /// Variables observed with exactly one distinct value, mapped to it.
    #[serde(rename = "static")]
    pub static_values: BTreeMap<String, Value>,
}

impl Classification {
    pub fn is_changing(&self, name: &str) -> bool {
        self.changing.contains(name)
    }

    /// Total number of classified variables.
    pub fn len(&self) -> usize {
        self.changing.len() + self.static_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Parse statistics and diagnostics
// =============================================================================

/// Line counters for a completed parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub lines_processed: u64,
    pub marker_lines: u64,
    pub assignment_lines: u64,
    pub blank_lines: u64,
    pub skipped_lines: u64,
}

/// Why a non-blank line contributed nothing to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The line appeared before any timestamp marker.
    BeforeFirstMarker,
    /// The line is neither a marker nor a `key: value` assignment.
    Unrecognised,
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::BeforeFirstMarker => "before first timestamp marker",
            SkipReason::Unrecognised => "not a marker or assignment",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A skipped line recorded when parse diagnostics are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number in the input.
    pub line_number: u64,
    pub reason: SkipReason,
    /// The line text, truncated for display.
    pub preview: String,
}

// =============================================================================
// Series
// =============================================================================

/// One point of a changing variable's time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: NaiveDateTime,
    /// `None` when the snapshot at this time did not assign the variable.
    pub value: Option<Value>,
}

/// Chronological series of one changing variable across all snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSeries {
    pub name: String,
    pub points: Vec<SeriesPoint>,
}

impl VariableSeries {
    /// Minimum and maximum over the numeric points, ignoring NaN.
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.value.as_ref().and_then(Value::as_number))
            .filter(|n| !n.is_nan())
            .fold(None, |acc, n| match acc {
                None => Some((n, n)),
                Some((lo, hi)) => Some((lo.min(n), hi.max(n))),
            })
    }

    /// Number of points that carry a value.
    pub fn observed_points(&self) -> usize {
        self.points.iter().filter(|p| p.value.is_some()).count()
    }
}
