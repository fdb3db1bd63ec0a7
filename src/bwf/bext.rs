//! Broadcast extension (`bext`) chunk.
//!
//! Layout of the 602-byte payload (EBU Tech 3285, version 2, no coding
//! history):
//!
//! | offset | len | field                 |
//! |--------|-----|-----------------------|
//! | 0      | 256 | description           |
//! | 256    | 32  | originator            |
//! | 288    | 32  | originator reference  |
//! | 320    | 10  | origination date      |
//! | 330    | 8   | origination time      |
//! | 338    | 8   | time reference (lo/hi)|
//! | 346    | 2   | version               |
//! | 348    | 254 | UMID, loudness, reserved (zero) |

use serde::{Deserialize, Serialize};

use crate::timecode::Timecode;

/// Size of the `bext` payload.
pub const BEXT_CHUNK_LEN: u32 = 602;

/// BWF version written into the chunk.
pub const BEXT_VERSION: u16 = 2;

pub(crate) const DESCRIPTION: (usize, usize) = (0, 256);
pub(crate) const ORIGINATOR: (usize, usize) = (256, 32);
pub(crate) const ORIGINATOR_REFERENCE: (usize, usize) = (288, 32);
pub(crate) const ORIGINATION_DATE: (usize, usize) = (320, 10);
pub(crate) const ORIGINATION_TIME: (usize, usize) = (330, 8);
pub(crate) const TIME_REFERENCE_OFFSET: usize = 338;
pub(crate) const VERSION_OFFSET: usize = 346;

/// Tag prefixed to the millisecond timestamp in the originator reference.
const REFERENCE_TAG: &str = "MARKWAV";

/// How the `TimeReference` field is filled.
///
/// DAWs disagree on whether an SMPTE session offset should live in the file
/// or in the session settings. `Zero` states "sample 0 is timeline 0" and
/// leaves alignment to the DAW's own session start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeReferencePolicy {
    /// Always write 0.
    #[default]
    Zero,
    /// Write the session start hour as a sample count.
    SessionStart,
}

impl TimeReferencePolicy {
    /// Resolve the policy to a sample position.
    pub fn samples(&self, session_start: Option<Timecode>, sample_rate: u32) -> u64 {
        match (self, session_start) {
            (Self::Zero, _) | (Self::SessionStart, None) => 0,
            (Self::SessionStart, Some(start)) => {
                u64::from(start.hours) * 3600 * u64::from(sample_rate)
            }
        }
    }
}

/// Text fields and time reference written into the `bext` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BextInfo {
    pub description: String,
    pub originator: String,
    pub originator_reference: String,
    /// `yyyy:mm:dd`
    pub origination_date: String,
    /// `hh:mm:ss`
    pub origination_time: String,
    /// Sample position of the file start on the project timeline.
    pub time_reference: u64,
}

impl BextInfo {
    /// Stamp the current local date and time.
    pub fn now(description: impl Into<String>, originator: impl Into<String>) -> Self {
        let now = chrono::Local::now();
        Self {
            description: description.into(),
            originator: originator.into(),
            originator_reference: format!("{}{}", REFERENCE_TAG, now.timestamp_millis()),
            origination_date: now.format("%Y:%m:%d").to_string(),
            origination_time: now.format("%H:%M:%S").to_string(),
            time_reference: 0,
        }
    }

    pub fn with_time_reference(mut self, samples: u64) -> Self {
        self.time_reference = samples;
        self
    }

    /// Serialize the payload. String fields are truncated to their width;
    /// unused bytes stay zero.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; BEXT_CHUNK_LEN as usize];

        put_str(&mut buf, DESCRIPTION, &self.description);
        put_str(&mut buf, ORIGINATOR, &self.originator);
        put_str(&mut buf, ORIGINATOR_REFERENCE, &self.originator_reference);
        put_str(&mut buf, ORIGINATION_DATE, &self.origination_date);
        put_str(&mut buf, ORIGINATION_TIME, &self.origination_time);

        let low = (self.time_reference & 0xFFFF_FFFF) as u32;
        let high = (self.time_reference >> 32) as u32;
        let t = TIME_REFERENCE_OFFSET;
        buf[t..t + 4].copy_from_slice(&low.to_le_bytes());
        buf[t + 4..t + 8].copy_from_slice(&high.to_le_bytes());

        let v = VERSION_OFFSET;
        buf[v..v + 2].copy_from_slice(&BEXT_VERSION.to_le_bytes());

        buf
    }
}

impl Default for BextInfo {
    /// Fixed, timestamp-free fields. Output built from this is reproducible.
    fn default() -> Self {
        Self {
            description: default_description(),
            originator: crate::ORIGINATOR.to_string(),
            originator_reference: String::new(),
            origination_date: String::new(),
            origination_time: String::new(),
            time_reference: 0,
        }
    }
}

/// Description written when the config does not override it.
pub fn default_description() -> String {
    format!("{} {} marker export", crate::ORIGINATOR, env!("CARGO_PKG_VERSION"))
}

/// Copy `value` into a fixed-width field, cutting on a char boundary.
fn put_str(buf: &mut [u8], (offset, width): (usize, usize), value: &str) {
    let bytes = truncate_utf8(value, width).as_bytes();
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn truncate_utf8(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Read a NUL-padded fixed-width field.
pub(crate) fn read_str(buf: &[u8], (offset, width): (usize, usize)) -> String {
    let field = &buf[offset..offset + width];
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    String::from_utf8_lossy(&field[..end]).into_owned()
}
