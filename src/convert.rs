//! CSV-to-marker-file pipeline.
//!
//! Ties the reader, timecode parser and encoder together. Front ends (the
//! CLI, tests, anything embedding the library) describe the job with a
//! [`ConvertRequest`] and get back a [`Conversion`] they can encode to a
//! file, a writer or memory.

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::bwf::{BwfEncoder, Layout};
use crate::csv::CsvTable;
use crate::error::{Error, Result};
use crate::markers::{self, Marker};
use crate::timecode::{detect_frame_rate, Timecode};

/// What to extract from a CSV log.
#[derive(Debug, Clone, Default)]
pub struct ConvertRequest {
    /// Frame rate for `HH:MM:SS:FF` cells; detected from the log when `None`.
    pub frame_rate: Option<f64>,
    pub time_column: Option<String>,
    pub label_columns: Vec<String>,
    /// Produce a file even when no row yields a marker.
    pub allow_empty: bool,
}

impl ConvertRequest {
    pub fn new(time_column: impl Into<String>, label_columns: Vec<String>) -> Self {
        Self {
            time_column: Some(time_column.into()),
            label_columns,
            ..Self::default()
        }
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Run the request against CSV text.
    pub fn run(&self, csv_text: &str) -> Result<Conversion> {
        let time_column = self
            .time_column
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(Error::MissingRequiredParameter("time column"))?;
        if self.label_columns.is_empty() {
            return Err(Error::MissingRequiredParameter("label columns"));
        }

        let table = CsvTable::parse(csv_text)?;
        let required =
            std::iter::once(time_column).chain(self.label_columns.iter().map(String::as_str));
        for column in required {
            if !table.has_column(column) {
                return Err(Error::UnknownColumn {
                    column: column.to_string(),
                });
            }
        }

        let frame_rate = match self.frame_rate {
            Some(rate) if rate > 0.0 => rate,
            Some(_) => return Err(Error::MissingRequiredParameter("positive frame rate")),
            None => detect_frame_rate(csv_text),
        };

        let markers = markers::extract(table.rows(), frame_rate, time_column, &self.label_columns);
        let skipped = table.len() - markers.len();
        if skipped > 0 {
            tracing::info!(skipped, "skipped rows without a usable time value");
        }
        if markers.is_empty() && !self.allow_empty {
            return Err(Error::NoMarkers);
        }

        let session_start = markers::session_start(&markers);
        Ok(Conversion {
            markers,
            frame_rate,
            session_start,
            rows: table.len(),
        })
    }
}

/// Markers ready to encode, plus what was learned while extracting them.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub markers: Vec<Marker>,
    pub frame_rate: f64,
    /// Earliest marker floored to the hour.
    pub session_start: Option<Timecode>,
    /// Data rows in the source CSV.
    pub rows: usize,
}

impl Conversion {
    pub fn encode(&self, encoder: &BwfEncoder) -> Result<Vec<u8>> {
        encoder.encode(&self.markers)
    }

    pub fn write_to<W: Write>(&self, encoder: &BwfEncoder, writer: &mut W) -> Result<Layout> {
        encoder.write_to(&self.markers, writer)
    }

    /// Encode straight to a file.
    ///
    /// The file is written under a temporary name in the same directory and
    /// renamed into place once complete, so `path` never holds a partial
    /// file.
    pub fn save(&self, encoder: &BwfEncoder, path: &Path) -> Result<Layout> {
        // Overflow must surface before anything is created.
        encoder.layout(&self.markers)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut writer = BufWriter::new(NamedTempFile::new_in(dir)?);
        let layout = encoder.write_to(&self.markers, &mut writer)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(layout)
    }
}
