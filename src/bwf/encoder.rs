//! RIFF/WAVE assembly.
//!
//! Chunk order is fixed: `fmt `, `bext`, `data`, `cue `, `LIST`. Some DAWs
//! scan sequentially and expect the cue list after the audio.

use std::io::Write;

use super::bext::{BextInfo, BEXT_CHUNK_LEN};
use super::format::{WavFormat, FMT_CHUNK_LEN};
use crate::error::{Error, Result};
use crate::markers::Marker;

/// Length of the silent region when there are no markers.
pub const EMPTY_DURATION_SECS: u64 = 10;

/// Size of one record in the `cue ` chunk.
pub const CUE_RECORD_LEN: u32 = 24;

/// Zero block used to stream the silent `data` payload.
const SILENCE_BLOCK_LEN: usize = 64 * 1024;

/// Chunk sizes of an encoded file, computed before any byte is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub marker_count: u32,
    pub duration_secs: u64,
    pub sample_count: u32,
    pub data_len: u32,
    pub cue_len: u32,
    pub list_len: u32,
    /// Value of the RIFF size field: total file length minus 8.
    pub riff_len: u32,
}

impl Layout {
    /// Total file length in bytes.
    pub fn file_len(&self) -> u64 {
        u64::from(self.riff_len) + 8
    }
}

/// Encodes marker lists as Broadcast Wave files with cue points.
#[derive(Debug, Clone)]
pub struct BwfEncoder {
    format: WavFormat,
    bext: BextInfo,
    max_duration_secs: Option<u64>,
}

impl BwfEncoder {
    pub fn new(bext: BextInfo) -> Self {
        Self {
            format: WavFormat::default(),
            bext,
            max_duration_secs: None,
        }
    }

    pub fn with_format(mut self, format: WavFormat) -> Self {
        self.format = format;
        self
    }

    /// Refuse to encode timelines longer than `secs` of silence.
    pub fn with_max_duration(mut self, secs: Option<u64>) -> Self {
        self.max_duration_secs = secs;
        self
    }

    pub fn format(&self) -> &WavFormat {
        &self.format
    }

    pub fn bext(&self) -> &BextInfo {
        &self.bext
    }

    /// Compute every chunk size, checking each against the 32-bit RIFF
    /// length fields.
    pub fn layout(&self, markers: &[Marker]) -> Result<Layout> {
        let ordered = ordered(markers);

        // Every cue must be placeable before any byte is written.
        for marker in &ordered {
            sample_position(marker.offset_secs(), self.format.sample_rate)?;
        }

        let duration_secs = match ordered.last() {
            Some(last) => (last.offset_secs().ceil() as u64)
                .checked_add(1)
                .ok_or_else(|| Error::overflow("timeline length exceeds 64 bits"))?,
            None => EMPTY_DURATION_SECS,
        };
        if let Some(max) = self.max_duration_secs {
            if duration_secs > max {
                return Err(Error::overflow(format!(
                    "timeline of {}s exceeds the configured maximum of {}s",
                    duration_secs, max
                )));
            }
        }

        let sample_count = duration_secs
            .checked_mul(u64::from(self.format.sample_rate))
            .and_then(fits_u32)
            .ok_or_else(|| Error::overflow("sample count exceeds 32 bits"))?;
        let data_len = u64::from(sample_count)
            .checked_mul(u64::from(self.format.block_align()))
            .and_then(fits_u32)
            .ok_or_else(|| Error::overflow("data chunk exceeds 4 GiB"))?;

        let marker_count = fits_u32(ordered.len() as u64)
            .ok_or_else(|| Error::overflow("too many markers"))?;
        let cue_len = fits_u32(4 + u64::from(CUE_RECORD_LEN) * u64::from(marker_count))
            .ok_or_else(|| Error::overflow("cue chunk exceeds 4 GiB"))?;

        let mut list_len: u64 = 4;
        for marker in &ordered {
            list_len += 8 + u64::from(labl_len(marker.label())?);
        }
        let list_len =
            fits_u32(list_len).ok_or_else(|| Error::overflow("LIST chunk exceeds 4 GiB"))?;

        let riff_len = 4
            + (8 + u64::from(FMT_CHUNK_LEN))
            + (8 + u64::from(BEXT_CHUNK_LEN))
            + (8 + u64::from(data_len))
            + (8 + u64::from(cue_len))
            + (8 + u64::from(list_len));
        let riff_len =
            fits_u32(riff_len).ok_or_else(|| Error::overflow("RIFF size exceeds 4 GiB"))?;

        Ok(Layout {
            marker_count,
            duration_secs,
            sample_count,
            data_len,
            cue_len,
            list_len,
            riff_len,
        })
    }

    /// Write the complete file to `writer`.
    ///
    /// Markers are stable-sorted by offset before cue IDs are assigned. The
    /// silent audio is streamed in blocks, so memory use does not grow with
    /// the timeline length.
    pub fn write_to<W: Write>(&self, markers: &[Marker], writer: &mut W) -> Result<Layout> {
        let layout = self.layout(markers)?;
        let ordered = ordered(markers);

        writer.write_all(b"RIFF")?;
        writer.write_all(&layout.riff_len.to_le_bytes())?;
        writer.write_all(b"WAVE")?;

        write_chunk(writer, b"fmt ", &self.format.to_bytes())?;
        write_chunk(writer, b"bext", &self.bext.to_bytes())?;

        write_chunk_header(writer, b"data", layout.data_len)?;
        write_silence(writer, layout.data_len as usize)?;

        let cues = cue_payload(&ordered, self.format.sample_rate, layout.cue_len)?;
        write_chunk(writer, b"cue ", &cues)?;

        let labels = adtl_payload(&ordered, layout.list_len);
        write_chunk(writer, b"LIST", &labels)?;

        tracing::debug!(
            markers = layout.marker_count,
            duration_secs = layout.duration_secs,
            bytes = layout.file_len(),
            "encoded marker file"
        );
        Ok(layout)
    }

    /// Encode into memory.
    pub fn encode(&self, markers: &[Marker]) -> Result<Vec<u8>> {
        let layout = self.layout(markers)?;
        let mut buffer = Vec::with_capacity(layout.file_len() as usize);
        self.write_to(markers, &mut buffer)?;
        Ok(buffer)
    }
}

impl Default for BwfEncoder {
    fn default() -> Self {
        Self::new(BextInfo::default())
    }
}

/// Markers in encoding order. `sort_by` is stable, so ties keep input order.
fn ordered(markers: &[Marker]) -> Vec<&Marker> {
    let mut ordered: Vec<&Marker> = markers.iter().collect();
    ordered.sort_by(|a, b| a.offset_secs().total_cmp(&b.offset_secs()));
    ordered
}

fn fits_u32(value: u64) -> Option<u32> {
    u32::try_from(value).ok()
}

/// Sample position of a marker: the offset floored to a whole sample.
pub fn sample_position(offset_secs: f64, sample_rate: u32) -> Result<u32> {
    let position = (offset_secs * f64::from(sample_rate)).floor();
    if !position.is_finite() || position < 0.0 || position > f64::from(u32::MAX) {
        return Err(Error::overflow(format!(
            "marker at {}s is outside the 32-bit sample range",
            offset_secs
        )));
    }
    Ok(position as u32)
}

/// Label text plus NUL, rounded up to an even length.
fn padded_label_len(label: &str) -> u64 {
    let len = label.len() as u64 + 1;
    len + len % 2
}

/// Size field of a `labl` sub-chunk: cue ID plus padded text.
fn labl_len(label: &str) -> Result<u32> {
    fits_u32(4 + padded_label_len(label))
        .ok_or_else(|| Error::overflow("marker label exceeds 4 GiB"))
}

fn cue_payload(markers: &[&Marker], sample_rate: u32, cue_len: u32) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(cue_len as usize);
    buf.extend_from_slice(&(markers.len() as u32).to_le_bytes());

    for (index, marker) in markers.iter().enumerate() {
        let id = index as u32 + 1;
        let position = sample_position(marker.offset_secs(), sample_rate)?;

        buf.extend_from_slice(&id.to_le_bytes());
        buf.extend_from_slice(&position.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&0u32.to_le_bytes()); // chunk start
        buf.extend_from_slice(&0u32.to_le_bytes()); // block start
        buf.extend_from_slice(&position.to_le_bytes());
    }

    Ok(buf)
}

fn adtl_payload(markers: &[&Marker], list_len: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(list_len as usize);
    buf.extend_from_slice(b"adtl");

    for (index, marker) in markers.iter().enumerate() {
        let id = index as u32 + 1;
        let text = marker.label().as_bytes();
        let padded = padded_label_len(marker.label()) as usize;

        buf.extend_from_slice(b"labl");
        buf.extend_from_slice(&(4 + padded as u32).to_le_bytes());
        buf.extend_from_slice(&id.to_le_bytes());
        buf.extend_from_slice(text);
        // NUL terminator plus optional pad byte.
        buf.resize(buf.len() + padded - text.len(), 0);
    }

    buf
}

fn write_chunk_header<W: Write>(writer: &mut W, id: &[u8; 4], len: u32) -> Result<()> {
    writer.write_all(id)?;
    writer.write_all(&len.to_le_bytes())?;
    Ok(())
}

fn write_chunk<W: Write>(writer: &mut W, id: &[u8; 4], payload: &[u8]) -> Result<()> {
    write_chunk_header(writer, id, payload.len() as u32)?;
    writer.write_all(payload)?;
    Ok(())
}

fn write_silence<W: Write>(writer: &mut W, mut remaining: usize) -> Result<()> {
    let block = [0u8; SILENCE_BLOCK_LEN];
    while remaining > 0 {
        let n = remaining.min(SILENCE_BLOCK_LEN);
        writer.write_all(&block[..n])?;
        remaining -= n;
    }
    Ok(())
}
