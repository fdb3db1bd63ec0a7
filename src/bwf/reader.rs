//! Reads cue markers back out of a WAV/BWF file.
//!
//! Walks the RIFF chunk list, decoding `fmt `, `bext`, `cue ` and the
//! `labl` records of `LIST/adtl`. The `data` payload is skipped by seeking,
//! so multi-hour files are never loaded into memory.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

use serde::Serialize;

use super::bext::{self, BEXT_CHUNK_LEN};
use super::encoder::CUE_RECORD_LEN;
use super::format::{WavFormat, FMT_CHUNK_LEN};
use crate::error::{Error, Result};
use crate::markers::Marker;

/// One record of the `cue ` chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CuePoint {
    pub id: u32,
    pub position: u32,
    pub data_chunk_id: String,
    pub chunk_start: u32,
    pub block_start: u32,
    pub sample_offset: u32,
}

/// One `labl` record of the `LIST/adtl` chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CueLabel {
    pub cue_id: u32,
    pub text: String,
    /// Declared sub-chunk size (cue ID + text + NUL + pad).
    pub size: u32,
}

/// Summary of a `bext` chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BextSummary {
    pub description: String,
    pub originator: String,
    pub originator_reference: String,
    pub origination_date: String,
    pub origination_time: String,
    pub time_reference: u64,
    pub version: u16,
}

/// A chunk header as found in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkEntry {
    pub id: String,
    pub offset: u64,
    pub len: u32,
}

/// Everything `markwav inspect` reports about a file.
#[derive(Debug, Clone, Serialize)]
pub struct WavInfo {
    pub riff_len: u32,
    pub format: Option<WavFormat>,
    pub bext: Option<BextSummary>,
    pub data_len: Option<u32>,
    pub chunks: Vec<ChunkEntry>,
    pub cues: Vec<CuePoint>,
    pub labels: Vec<CueLabel>,
}

impl WavInfo {
    /// Parse an in-memory file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut Cursor::new(bytes))
    }

    /// Parse a file from a seekable reader.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; 12];
        reader
            .read_exact(&mut header)
            .map_err(|_| Error::Malformed("file is shorter than a RIFF header".to_string()))?;
        if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
            return Err(Error::Malformed("missing RIFF/WAVE header".to_string()));
        }
        let riff_len = le_u32(&header[4..8]);

        let mut info = WavInfo {
            riff_len,
            format: None,
            bext: None,
            data_len: None,
            chunks: Vec::new(),
            cues: Vec::new(),
            labels: Vec::new(),
        };

        let end = 8 + u64::from(riff_len);
        let mut pos: u64 = 12;

        while pos + 8 <= end {
            let mut chunk_header = [0u8; 8];
            if reader.read_exact(&mut chunk_header).is_err() {
                break;
            }
            let id: [u8; 4] = [
                chunk_header[0],
                chunk_header[1],
                chunk_header[2],
                chunk_header[3],
            ];
            let len = le_u32(&chunk_header[4..8]);
            info.chunks.push(ChunkEntry {
                id: String::from_utf8_lossy(&id).into_owned(),
                offset: pos,
                len,
            });

            match &id {
                b"fmt " => info.format = Some(parse_fmt(&read_payload(reader, len)?)?),
                b"bext" => info.bext = Some(parse_bext(&read_payload(reader, len)?)?),
                b"cue " => info.cues = parse_cues(&read_payload(reader, len)?)?,
                b"LIST" => {
                    let payload = read_payload(reader, len)?;
                    if payload.starts_with(b"adtl") {
                        info.labels.extend(parse_adtl(&payload[4..])?);
                    }
                }
                b"data" => {
                    info.data_len = Some(len);
                    reader.seek(SeekFrom::Current(i64::from(len)))?;
                }
                _ => {
                    reader.seek(SeekFrom::Current(i64::from(len)))?;
                }
            }

            pos += 8 + u64::from(len);
            // Align to word boundary
            if len % 2 == 1 {
                reader.seek(SeekFrom::Current(1))?;
                pos += 1;
            }
        }

        Ok(info)
    }

    /// Label of the cue with the given ID.
    pub fn label_for(&self, cue_id: u32) -> Option<&str> {
        self.labels
            .iter()
            .find(|label| label.cue_id == cue_id)
            .map(|label| label.text.as_str())
    }

    /// Rebuild markers by joining cue positions with their labels.
    ///
    /// Cues without a label get an empty label.
    pub fn markers(&self) -> Vec<Marker> {
        let sample_rate = self
            .format
            .map(|f| f.sample_rate)
            .unwrap_or(WavFormat::default().sample_rate);
        let labels: HashMap<u32, &str> = self
            .labels
            .iter()
            .map(|l| (l.cue_id, l.text.as_str()))
            .collect();

        self.cues
            .iter()
            .map(|cue| {
                let label = labels.get(&cue.id).copied().unwrap_or("");
                Marker::new(f64::from(cue.position) / f64::from(sample_rate), label)
            })
            .collect()
    }

    /// Duration of the audio payload in seconds.
    pub fn duration_secs(&self) -> Option<f64> {
        let byte_rate = self.format?.byte_rate();
        let data_len = self.data_len?;
        if byte_rate == 0 {
            return None;
        }
        Some(f64::from(data_len) / f64::from(byte_rate))
    }
}

fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a chunk payload. The buffer grows with the bytes actually present,
/// so a bogus declared length cannot force a huge allocation.
fn read_payload<R: Read>(reader: &mut R, len: u32) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    reader.take(u64::from(len)).read_to_end(&mut payload)?;
    if payload.len() != len as usize {
        return Err(Error::Malformed(format!(
            "chunk of {} bytes is truncated",
            len
        )));
    }
    Ok(payload)
}

fn parse_fmt(payload: &[u8]) -> Result<WavFormat> {
    if payload.len() < FMT_CHUNK_LEN as usize {
        return Err(Error::Malformed("fmt chunk shorter than 16 bytes".to_string()));
    }
    let format = WavFormat {
        channels: le_u16(&payload[2..4]),
        sample_rate: le_u32(&payload[4..8]),
        bits_per_sample: le_u16(&payload[14..16]),
    };
    if !format.is_representable() {
        return Err(Error::Malformed(format!(
            "fmt chunk declares {} channels of {} bits at {} Hz",
            format.channels, format.bits_per_sample, format.sample_rate
        )));
    }
    Ok(format)
}

fn parse_bext(payload: &[u8]) -> Result<BextSummary> {
    if payload.len() < BEXT_CHUNK_LEN as usize {
        return Err(Error::Malformed("bext chunk shorter than 602 bytes".to_string()));
    }
    let t = bext::TIME_REFERENCE_OFFSET;
    let low = u64::from(le_u32(&payload[t..t + 4]));
    let high = u64::from(le_u32(&payload[t + 4..t + 8]));

    Ok(BextSummary {
        description: bext::read_str(payload, bext::DESCRIPTION),
        originator: bext::read_str(payload, bext::ORIGINATOR),
        originator_reference: bext::read_str(payload, bext::ORIGINATOR_REFERENCE),
        origination_date: bext::read_str(payload, bext::ORIGINATION_DATE),
        origination_time: bext::read_str(payload, bext::ORIGINATION_TIME),
        time_reference: (high << 32) | low,
        version: le_u16(&payload[bext::VERSION_OFFSET..bext::VERSION_OFFSET + 2]),
    })
}

fn parse_cues(payload: &[u8]) -> Result<Vec<CuePoint>> {
    if payload.len() < 4 {
        return Err(Error::Malformed("cue chunk has no count".to_string()));
    }
    let count = le_u32(&payload[0..4]) as usize;
    let records = &payload[4..];
    let needed = count.checked_mul(CUE_RECORD_LEN as usize);
    if needed.map_or(true, |needed| records.len() < needed) {
        return Err(Error::Malformed(format!(
            "cue chunk declares {} points but holds {} bytes",
            count,
            records.len()
        )));
    }

    Ok(records
        .chunks_exact(24)
        .take(count)
        .map(|r| CuePoint {
            id: le_u32(&r[0..4]),
            position: le_u32(&r[4..8]),
            data_chunk_id: String::from_utf8_lossy(&r[8..12]).into_owned(),
            chunk_start: le_u32(&r[12..16]),
            block_start: le_u32(&r[16..20]),
            sample_offset: le_u32(&r[20..24]),
        })
        .collect())
}

fn parse_adtl(mut rest: &[u8]) -> Result<Vec<CueLabel>> {
    let mut labels = Vec::new();

    while rest.len() >= 8 {
        let id = &rest[0..4];
        let size = le_u32(&rest[4..8]);
        let body_end = 8 + size as usize;
        if rest.len() < body_end {
            return Err(Error::Malformed("adtl sub-chunk is truncated".to_string()));
        }

        if id == b"labl" && size >= 4 {
            let body = &rest[8..body_end];
            let text = &body[4..];
            let text_end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
            labels.push(CueLabel {
                cue_id: le_u32(&body[0..4]),
                text: String::from_utf8_lossy(&text[..text_end]).into_owned(),
                size,
            });
        }

        let advance = body_end + (size as usize % 2);
        rest = &rest[advance.min(rest.len())..];
    }

    Ok(labels)
}
