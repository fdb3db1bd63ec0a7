//! Timecode parsing and frame-rate detection.
//!
//! Time cells in a marker log come in four shapes:
//!
//! - plain seconds: `10.5`
//! - `MM:SS` (seconds may be fractional): `1:30`
//! - `HH:MM:SS`: `0:01:45`
//! - `HH:MM:SS:FF` (all integer parts): `00:01:45:15`
//!
//! Frame-coded values need a frame rate to become seconds. When the caller
//! has none, [`detect_frame_rate`] guesses one from the highest frame number
//! seen in the log.

use std::fmt;

use crate::error::{Error, Result};

/// Frame rate assumed when a log contains no frame-coded timecodes.
pub const DEFAULT_FRAME_RATE: f64 = 30.0;

/// Header keywords that mark the first line of a log as a header row.
const HEADER_HINTS: &[&str] = &["time", "name"];

/// Parse a time cell into a seconds offset, or `None` if it is unparsable.
///
/// Row extraction uses this form: an unparsable cell skips the row, it never
/// aborts the whole file.
pub fn parse_time(text: &str, frame_rate: f64) -> Option<f64> {
    parse_seconds(text, frame_rate).ok()
}

/// Parse a time cell into a seconds offset.
///
/// Returns [`Error::InvalidTimeFormat`] for anything outside the four
/// supported grammars, and for negative or non-finite results.
pub fn parse_seconds(text: &str, frame_rate: f64) -> Result<f64> {
    let trimmed = text.trim();
    let parts: Vec<&str> = trimmed.split(':').map(str::trim).collect();

    match seconds_from_parts(&parts, frame_rate) {
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
        _ => Err(Error::InvalidTimeFormat {
            value: trimmed.to_string(),
        }),
    }
}

fn seconds_from_parts(parts: &[&str], frame_rate: f64) -> Option<f64> {
    match parts {
        [secs] => decimal(secs),
        [mins, secs] => Some(decimal(mins)? * 60.0 + decimal(secs)?),
        [hours, mins, secs] => {
            Some(decimal(hours)? * 3600.0 + decimal(mins)? * 60.0 + decimal(secs)?)
        }
        [hours, mins, secs, frames] => {
            if frame_rate <= 0.0 {
                return None;
            }
            let h = integer(hours)? as f64;
            let m = integer(mins)? as f64;
            let s = integer(secs)? as f64;
            let f = integer(frames)? as f64;
            Some(h * 3600.0 + m * 60.0 + s + f / frame_rate)
        }
        _ => None,
    }
}

fn decimal(part: &str) -> Option<f64> {
    part.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn integer(part: &str) -> Option<u64> {
    part.parse::<u64>().ok()
}

/// Infer the frame rate of a log from the frame digits it contains.
///
/// Best-effort: the first line counts as a header only when it mentions
/// "time" or "name". For every other non-blank line the first
/// comma-separated field is split on `:`; four-part values contribute their
/// frame number. The largest frame number is bucketed into 24, 25, 30, 50 or
/// 60 fps. Logs without frame-coded values get [`DEFAULT_FRAME_RATE`].
pub fn detect_frame_rate(csv_text: &str) -> f64 {
    let mut lines = csv_text.lines().peekable();

    if let Some(first) = lines.peek() {
        let lower = first.to_lowercase();
        if HEADER_HINTS.iter().any(|hint| lower.contains(hint)) {
            lines.next();
        }
    }

    let max_frame = lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let first_field = line.split(',').next()?.trim();
            let parts: Vec<&str> = first_field.split(':').collect();
            if parts.len() == 4 {
                parts[3].trim().parse::<u32>().ok()
            } else {
                None
            }
        })
        .max();

    let Some(max_frame) = max_frame else {
        return DEFAULT_FRAME_RATE;
    };

    let rate = match max_frame {
        f if f < 24 => 24.0,
        f if f < 25 => 25.0,
        f if f < 30 => 30.0,
        f if f < 50 => 50.0,
        _ => 60.0,
    };
    tracing::debug!(max_frame, rate, "detected frame rate");
    rate
}

/// An `HH:MM:SS:FF` position on a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
}

impl Timecode {
    /// Timecode at the start of the given hour.
    pub fn from_hours(hours: u32) -> Self {
        Self {
            hours,
            minutes: 0,
            seconds: 0,
            frames: 0,
        }
    }

    /// Convert a seconds offset into a timecode at `frame_rate`.
    ///
    /// Fractional frames are truncated.
    pub fn from_seconds(secs: f64, frame_rate: f64) -> Self {
        let secs = secs.max(0.0);
        let whole = secs.floor();
        let total = whole as u64;

        let max_frame = (frame_rate.ceil() as u32).saturating_sub(1);
        // Nudge so that e.g. 0.5 * 30 lands on frame 15 despite rounding noise.
        let frames = (((secs - whole) * frame_rate) + 1e-6).floor() as u32;

        Self {
            hours: (total / 3600) as u32,
            minutes: ((total % 3600) / 60) as u32,
            seconds: (total % 60) as u32,
            frames: frames.min(max_frame),
        }
    }

    /// Offset of this timecode in seconds.
    pub fn to_seconds(&self, frame_rate: f64) -> f64 {
        self.hours as f64 * 3600.0
            + self.minutes as f64 * 60.0
            + self.seconds as f64
            + self.frames as f64 / frame_rate
    }

    /// Space-delimited form (`01 00 00 00`), as typed into a DAW's
    /// session-start field.
    pub fn to_spaced(&self) -> String {
        format!(
            "{:02} {:02} {:02} {:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}
