//! Broadcast Wave encoding and decoding.
//!
//! A marker file is a RIFF/WAVE container with five chunks:
//!
//! - `fmt `: PCM format (44.1 kHz, 16-bit stereo by default)
//! - `bext`: broadcast metadata, see [`bext`]
//! - `data`: silence from timeline 0 to one second past the last marker
//! - `cue `: one 24-byte record per marker with its sample position
//! - `LIST`/`adtl`: one `labl` record per marker carrying its name
//!
//! Cue IDs are 1-based positions in the offset-sorted marker list and tie
//! each `cue ` record to its `labl`.

pub mod bext;
mod encoder;
mod format;
pub mod reader;

pub use bext::{BextInfo, TimeReferencePolicy};
pub use encoder::{sample_position, BwfEncoder, Layout, CUE_RECORD_LEN, EMPTY_DURATION_SECS};
pub use format::{WavFormat, PCM_FORMAT_TAG};
pub use reader::{CueLabel, CuePoint, WavInfo};
