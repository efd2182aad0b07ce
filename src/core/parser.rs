// VarSleuth - core/parser.rs
//
// Snapshot log parsing. Turns marker-delimited `key: value` blocks into a
// LogDocument. Core layer: accepts strings or BufRead, never opens files.
//
// Input shape:
//
//   -------------2024-01-01_00-00-00-------------
//   temperature: 20.0
//   mode: auto
//
// Anything that is neither a marker nor an assignment inside a block is
// skipped without error.

use crate::core::model::{LogDocument, ParseStats, SkipReason, SkippedLine, Value};
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::NaiveDateTime;
use regex::Regex;
use std::io::BufRead;
use std::path::Path;
use std::sync::OnceLock;

/// Marker line: exactly 13 dashes, the timestamp token, exactly 13 dashes.
/// Anchored at the start of the raw (untrimmed) line only.
pub const TIMESTAMP_MARKER_PATTERN: &str =
    r"^-------------(\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2})-------------";

/// Assignment line, applied to the trimmed line. The key stops at the first
/// colon, so values may contain colons.
pub const ASSIGNMENT_PATTERN: &str = r"^([^:]+):\s*(.+)$";

/// chrono format of the token captured by `TIMESTAMP_MARKER_PATTERN`.
pub const MARKER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TIMESTAMP_MARKER_PATTERN).expect("marker pattern is valid"))
}

fn assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ASSIGNMENT_PATTERN).expect("assignment pattern is valid"))
}

/// Configuration for parsing operations.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Record skipped lines in `ParseResult::skipped` and log them at trace
    /// level. Off by default; the document is identical either way.
    pub diagnostics: bool,
    /// Cap on recorded skipped lines.
    pub max_skipped_tracked: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            diagnostics: false,
            max_skipped_tracked: constants::MAX_SKIPPED_LINES_TRACKED,
        }
    }
}

/// Result of parsing one input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub document: LogDocument,
    pub stats: ParseStats,
    /// Skipped lines; always empty unless diagnostics were enabled.
    pub skipped: Vec<SkippedLine>,
}

// =============================================================================
// Line matchers
// =============================================================================

/// Return the timestamp token if `line` is a timestamp marker.
pub fn match_timestamp_marker(line: &str) -> Option<&str> {
    marker_regex()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Split a trimmed line into `(key, raw_value)` if it is an assignment.
pub fn match_assignment(line: &str) -> Option<(&str, &str)> {
    let caps = assignment_regex().captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Coerce a raw value to a number, keeping the text when that fails.
///
/// Underscores are accepted as digit separators (`1_000`) when each one sits
/// between two ASCII digits.
pub fn parse_value(raw: &str) -> Value {
    let parsed = if raw.contains('_') {
        strip_digit_separators(raw).and_then(|s| s.parse::<f64>().ok())
    } else {
        raw.parse::<f64>().ok()
    };
    match parsed {
        Some(n) => Value::Number(n),
        None => Value::Text(raw.to_string()),
    }
}

/// Remove `_` separators, or `None` if any `_` is not between two digits.
fn strip_digit_separators(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    for (i, ch) in raw.char_indices() {
        if ch != '_' {
            out.push(ch);
            continue;
        }
        let before = i.checked_sub(1).and_then(|j| bytes.get(j));
        let after = bytes.get(i + 1);
        match (before, after) {
            (Some(b), Some(a)) if b.is_ascii_digit() && a.is_ascii_digit() => {}
            _ => return None,
        }
    }
    Some(out)
}

/// Parse a marker token such as `2024-01-01_00-05-00`.
///
/// Returns `None` for tokens that have the right shape but no calendar
/// meaning (`2024-13-40_25-61-61`).
pub fn parse_timestamp(token: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(token, MARKER_TIMESTAMP_FORMAT).ok()
}

// =============================================================================
// Parser state
// =============================================================================

/// Incremental parser. Feed lines in order, then call `finish`.
#[derive(Debug)]
pub struct SnapshotParser<'c> {
    config: &'c ParseConfig,
    document: LogDocument,
    current: Option<String>,
    stats: ParseStats,
    skipped: Vec<SkippedLine>,
}

impl<'c> SnapshotParser<'c> {
    pub fn new(config: &'c ParseConfig) -> Self {
        Self {
            config,
            document: LogDocument::new(),
            current: None,
            stats: ParseStats::default(),
            skipped: Vec::new(),
        }
    }

    /// Process one line (without its line terminator).
    pub fn feed_line(&mut self, line: &str) {
        self.stats.lines_processed += 1;
        let line_number = self.stats.lines_processed;

        if let Some(token) = match_timestamp_marker(line) {
            self.stats.marker_lines += 1;
            self.document
                .snapshot_or_insert(token, || parse_timestamp(token));
            self.current = Some(token.to_string());
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            self.stats.blank_lines += 1;
            return;
        }

        let Some(current) = self.current.as_deref() else {
            self.skip(line_number, SkipReason::BeforeFirstMarker, trimmed);
            return;
        };

        match match_assignment(trimmed) {
            Some((key, raw)) => {
                self.stats.assignment_lines += 1;
                self.document
                    .snapshot_or_insert(current, || parse_timestamp(current))
                    .assign(key, parse_value(raw));
            }
            None => self.skip(line_number, SkipReason::Unrecognised, trimmed),
        }
    }

    fn skip(&mut self, line_number: u64, reason: SkipReason, line: &str) {
        self.stats.skipped_lines += 1;
        if !self.config.diagnostics {
            return;
        }

        let preview: String = line.chars().take(constants::DEBUG_MAX_LINE_PREVIEW).collect();
        tracing::trace!(line_number, %reason, preview = %preview, "Skipped line");

        if self.skipped.len() < self.config.max_skipped_tracked {
            self.skipped.push(SkippedLine {
                line_number,
                reason,
                preview,
            });
        }
    }

    pub fn finish(self) -> ParseResult {
        tracing::debug!(
            snapshots = self.document.len(),
            lines = self.stats.lines_processed,
            markers = self.stats.marker_lines,
            assignments = self.stats.assignment_lines,
            skipped = self.stats.skipped_lines,
            "Parsing complete"
        );

        ParseResult {
            document: self.document,
            stats: self.stats,
            skipped: self.skipped,
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Parse a sequence of lines.
pub fn parse_lines<'a, I>(lines: I, config: &ParseConfig) -> ParseResult
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parser = SnapshotParser::new(config);
    for line in lines {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Split text into lines on `\n`, `\r\n` and a lone `\r`.
pub fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    content.split_terminator('\n').flat_map(split_carriage_returns)
}

/// Split one `\n`-terminated line further on bare carriage returns.
fn split_carriage_returns(line: &str) -> std::str::Split<'_, char> {
    line.strip_suffix('\r').unwrap_or(line).split('\r')
}

/// Parse full file content already held in memory.
pub fn parse_content(content: &str, config: &ParseConfig) -> ParseResult {
    parse_lines(split_lines(content), config)
}

/// Parse from a buffered reader.
///
/// Line endings are handled as in `parse_content`. Reader failures
/// (including a line that is not valid UTF-8) abort the parse; `source` is
/// only used for error context.
pub fn parse_reader<R: BufRead>(
    mut reader: R,
    source: &Path,
    config: &ParseConfig,
) -> Result<ParseResult, ParseError> {
    let mut parser = SnapshotParser::new(config);
    let mut buf = String::new();
    let mut line_number: u64 = 0;
    loop {
        buf.clear();
        line_number += 1;
        let read = reader.read_line(&mut buf).map_err(|e| ParseError::Io {
            file: source.to_path_buf(),
            line_number,
            source: e,
        })?;
        if read == 0 {
            break;
        }
        let line = buf.strip_suffix('\n').unwrap_or(&buf);
        for piece in split_carriage_returns(line) {
            parser.feed_line(piece);
        }
    }
    Ok(parser.finish())
}
