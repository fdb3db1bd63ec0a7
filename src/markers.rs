//! Marker extraction from parsed CSV rows.
//!
//! A marker is a seconds offset plus a label. Rows whose time cell is empty
//! or unparsable are skipped rather than failing the file, since review tools
//! routinely export sparse rows.

use serde::Serialize;

use crate::csv::Row;
use crate::timecode::{parse_seconds, Timecode};

/// Label used when none of the selected columns has a value.
pub const DEFAULT_LABEL: &str = "Marker";

/// Separator placed between the values of multiple label columns.
pub const LABEL_SEPARATOR: &str = " - ";

/// Header keywords that identify a time column.
pub const TIME_COLUMN_KEYWORDS: &[&str] = &["time", "timecode", "tc", "smpte", "timestamp"];

/// A named position on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    offset_secs: f64,
    label: String,
}

impl Marker {
    /// Create a marker. NUL characters are stripped from the label because
    /// the encoder uses NUL as the string terminator; negative offsets clamp
    /// to zero.
    pub fn new(offset_secs: f64, label: impl Into<String>) -> Self {
        let mut label = label.into();
        if label.contains('\0') {
            label.retain(|c| c != '\0');
        }
        Self {
            offset_secs: offset_secs.max(0.0),
            label,
        }
    }

    pub fn offset_secs(&self) -> f64 {
        self.offset_secs
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Build markers from rows, sorted by offset.
///
/// The label joins the non-blank values of `label_columns` with
/// [`LABEL_SEPARATOR`], falling back to [`DEFAULT_LABEL`]. Markers with equal
/// offsets keep their row order.
pub fn extract(
    rows: &[Row],
    frame_rate: f64,
    time_column: &str,
    label_columns: &[String],
) -> Vec<Marker> {
    let mut markers = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let cell = row.get(time_column).map(|v| v.trim()).unwrap_or("");
        if cell.is_empty() {
            tracing::debug!(row = index + 1, "skipping row without a time value");
            continue;
        }

        let offset = match parse_seconds(cell, frame_rate) {
            Ok(offset) => offset,
            Err(err) => {
                tracing::debug!(row = index + 1, %err, "skipping row");
                continue;
            }
        };

        let parts: Vec<&str> = label_columns
            .iter()
            .filter_map(|column| row.get(column))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect();

        let label = if parts.is_empty() {
            DEFAULT_LABEL.to_string()
        } else {
            parts.join(LABEL_SEPARATOR)
        };

        markers.push(Marker::new(offset, label));
    }

    sort_markers(&mut markers);
    tracing::debug!(
        rows = rows.len(),
        markers = markers.len(),
        "extracted markers"
    );
    markers
}

/// Stable sort by offset, ascending.
pub fn sort_markers(markers: &mut [Marker]) {
    markers.sort_by(|a, b| a.offset_secs.total_cmp(&b.offset_secs));
}

/// Session start for a DAW import: the earliest marker floored to its hour.
///
/// Logs recorded against an SMPTE offset start at `01:00:00:00` and the like;
/// returns `None` when there are no markers.
pub fn session_start(markers: &[Marker]) -> Option<Timecode> {
    markers
        .iter()
        .map(Marker::offset_secs)
        .min_by(f64::total_cmp)
        .map(|earliest| Timecode::from_hours((earliest / 3600.0).floor() as u32))
}

/// Pick the time column from a header row.
///
/// An exact keyword match (case-insensitive) wins; then a header containing a
/// keyword; then the first column. Returns `None` for an empty header.
pub fn detect_time_column(headers: &[String]) -> Option<&str> {
    let exact = headers.iter().find(|h| {
        let lower = h.to_lowercase();
        TIME_COLUMN_KEYWORDS.iter().any(|k| lower == *k)
    });
    let partial = || {
        headers.iter().find(|h| {
            let lower = h.to_lowercase();
            TIME_COLUMN_KEYWORDS.iter().any(|k| lower.contains(k))
        })
    };

    exact
        .or_else(partial)
        .or_else(|| headers.first())
        .map(String::as_str)
}
