//! markwav - CSV timecode logs to Broadcast Wave marker files.
//!
//! Reads a marker log (one row per marker, a time column plus label
//! columns), converts the times to seconds, and writes a silent BWF file
//! whose `cue ` and `LIST/adtl` chunks carry the markers. DAWs that import
//! markers from audio files pick them up at sample-accurate positions.
//!
//! ```no_run
//! use markwav::{BwfEncoder, ConvertRequest};
//!
//! let csv = "time,name\n0,Intro\n1:30,Chorus";
//! let conversion = ConvertRequest::new("time", vec!["name".into()]).run(csv)?;
//! let wav = conversion.encode(&BwfEncoder::default())?;
//! # Ok::<(), markwav::Error>(())
//! ```

pub mod bwf;
pub mod cli;
pub mod config;
pub mod convert;
pub mod csv;
pub mod error;
pub mod files;
pub mod hook;
pub mod markers;
pub mod timecode;

pub use bwf::{BextInfo, BwfEncoder, TimeReferencePolicy, WavFormat, WavInfo};
pub use config::Config;
pub use convert::{Conversion, ConvertRequest};
pub use csv::CsvTable;
pub use error::{Error, Result};
pub use markers::Marker;
pub use timecode::{detect_frame_rate, parse_time, Timecode};

/// Tool name written into the `bext` originator field.
pub const ORIGINATOR: &str = "markwav";
