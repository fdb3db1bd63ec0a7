//! PCM format descriptor for the `fmt ` chunk.

use serde::Serialize;

/// WAVE format tag for integer PCM.
pub const PCM_FORMAT_TAG: u16 = 1;

/// Size of the PCM `fmt ` payload.
pub const FMT_CHUNK_LEN: u32 = 16;

/// WAV file format parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavFormat {
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl Default for WavFormat {
    /// 44.1 kHz, 16-bit stereo: what DAW marker import expects.
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
        }
    }
}

impl WavFormat {
    /// Bytes per sample (per channel).
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }

    /// Bytes per sample frame. Saturates at `u16::MAX`.
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bytes_per_sample())
    }

    /// Bytes per second. Saturates at `u32::MAX`.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.saturating_mul(u32::from(self.block_align()))
    }

    /// Whether block align and byte rate fit their header fields exactly.
    pub fn is_representable(&self) -> bool {
        let align = u32::from(self.channels) * u32::from(self.bytes_per_sample());
        u16::try_from(align).is_ok()
            && u64::from(self.sample_rate) * u64::from(align) <= u64::from(u32::MAX)
    }

    /// Serialize the `fmt ` payload.
    pub fn to_bytes(&self) -> [u8; FMT_CHUNK_LEN as usize] {
        let mut buf = [0u8; FMT_CHUNK_LEN as usize];
        buf[0..2].copy_from_slice(&PCM_FORMAT_TAG.to_le_bytes());
        buf[2..4].copy_from_slice(&self.channels.to_le_bytes());
        buf[4..8].copy_from_slice(&self.sample_rate.to_le_bytes());
        buf[8..12].copy_from_slice(&self.byte_rate().to_le_bytes());
        buf[12..14].copy_from_slice(&self.block_align().to_le_bytes());
        buf[14..16].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        buf
    }
}
