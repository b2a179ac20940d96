//! WAV container for synthesized speech
//!
//! The speech service returns headerless PCM: mono, 16-bit signed little-endian,
//! 24 kHz. Wrapping it in a canonical 44-byte RIFF/WAVE header makes it playable.
//!
//! ```text
//! offset  size  field
//!      0     4  "RIFF"
//!      4     4  36 + data size
//!      8     4  "WAVE"
//!     12     4  "fmt "
//!     16     4  16 (fmt chunk size)
//!     20     2  1 (PCM)
//!     22     2  channels
//!     24     4  sample rate
//!     28     4  byte rate = sample rate * block align
//!     32     2  block align = channels * bits / 8
//!     34     2  bits per sample
//!     36     4  "data"
//!     40     4  data size in bytes
//!     44     -  samples
//! ```

use std::path::Path;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

pub const SAMPLE_RATE: u32 = 24_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;
pub const BLOCK_ALIGN: u16 = CHANNELS * BITS_PER_SAMPLE / 8;
pub const BYTE_RATE: u32 = SAMPLE_RATE * BLOCK_ALIGN as u32;
pub const HEADER_LEN: usize = 44;
const PCM_FORMAT: u16 = 1;

/// Wrap raw PCM bytes in a WAV header.
///
/// Every input byte is copied through unchanged and the data size is the input length,
/// so an odd trailing byte is kept as-is. Never fails.
pub fn encode_wav(pcm: &[u8]) -> Vec<u8> {
    if pcm.len() % 2 != 0 {
        warn!(bytes = pcm.len(), "PCM buffer has an odd length; last sample is incomplete");
    }

    let data_size = pcm.len() as u32;
    let mut wav = Vec::with_capacity(HEADER_LEN + pcm.len());

    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    wav.extend_from_slice(&CHANNELS.to_le_bytes());
    wav.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    wav.extend_from_slice(&BYTE_RATE.to_le_bytes());
    wav.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.extend_from_slice(pcm);

    debug!(pcm_bytes = pcm.len(), wav_bytes = wav.len(), "Encoded WAV container");
    wav
}

/// Summary of an existing WAV file
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub frames: u32,
}

impl WavInfo {
    pub fn read(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path).map_err(|e| match e {
            hound::Error::IoError(io) => PipelineError::storage(path, io),
            other => PipelineError::storage(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, other.to_string()),
            ),
        })?;
        let spec = reader.spec();
        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            frames: reader.duration(),
        })
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}
