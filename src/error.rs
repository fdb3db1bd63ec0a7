//! Errors produced while reading CSV logs and encoding marker files.

/// Errors that can occur while converting a timecode log into a marker WAV.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("CSV input is empty")]
    EmptyInput,

    #[error("Invalid time format: '{value}'")]
    InvalidTimeFormat { value: String },

    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(&'static str),

    #[error("Column not found in CSV header: '{column}'")]
    UnknownColumn { column: String },

    #[error("No valid markers found (check the time column and time format)")]
    NoMarkers,

    #[error("Encoding overflow: {what}")]
    EncodingOverflow { what: String },

    #[error("Malformed WAV file: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn overflow(what: impl Into<String>) -> Self {
        Self::EncodingOverflow { what: what.into() }
    }
}

/// Result alias for markwav operations.
pub type Result<T> = std::result::Result<T, Error>;
