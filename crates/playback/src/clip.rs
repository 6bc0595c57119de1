//! PCM clip model and RIFF/WAVE parsing.
//!
//! The DAC on the interaction board is 8 bits wide, so clips are stored as
//! unsigned 8-bit mono PCM (silence = `0x80`) exactly as they sit in flash.
//! [`PcmClip::from_wav`] borrows the sample data straight out of a WAV image;
//! nothing is copied or decoded.

/// Errors returned while parsing a WAV image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Missing RIFF/WAVE magic or a malformed chunk header.
    InvalidData,
    /// Valid WAV but not 8-bit mono PCM.
    UnsupportedFormat,
    /// A chunk claims more bytes than the image holds, or `data` is missing.
    Truncated,
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidData => write!(f, "not a RIFF/WAVE image"),
            Self::UnsupportedFormat => write!(f, "only 8-bit mono PCM is supported"),
            Self::Truncated => write!(f, "WAV image is truncated"),
        }
    }
}

/// A borrowed clip of unsigned 8-bit mono samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmClip<'a> {
    samples: &'a [u8],
    sample_rate: u32,
}

const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const FMT_PCM: u16 = 1;

impl<'a> PcmClip<'a> {
    /// Wrap raw samples already known to be 8-bit mono PCM.
    pub const fn from_raw(samples: &'a [u8], sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Parse a RIFF/WAVE image, borrowing its `data` chunk.
    ///
    /// Chunks other than `fmt ` and `data` are skipped; chunk bodies are
    /// word-aligned as the RIFF format requires.
    ///
    /// # Errors
    ///
    /// See [`DecodeError`].
    pub fn from_wav(image: &'a [u8]) -> Result<Self, DecodeError> {
        let header = image.get(..RIFF_HEADER_LEN).ok_or(DecodeError::InvalidData)?;
        if header.get(0..4) != Some(b"RIFF".as_slice()) || header.get(8..12) != Some(b"WAVE".as_slice()) {
            return Err(DecodeError::InvalidData);
        }

        let mut sample_rate = None;
        let mut cursor = RIFF_HEADER_LEN;
        while let Some(chunk_header) = image.get(cursor..cursor.saturating_add(CHUNK_HEADER_LEN)) {
            let id = chunk_header.get(0..4).ok_or(DecodeError::InvalidData)?;
            let len = read_u32(chunk_header, 4)? as usize;
            let body_start = cursor.saturating_add(CHUNK_HEADER_LEN);
            let body_end = body_start.checked_add(len).ok_or(DecodeError::Truncated)?;
            let body = image.get(body_start..body_end).ok_or(DecodeError::Truncated)?;

            match id {
                b"fmt " => sample_rate = Some(parse_fmt(body)?),
                b"data" => {
                    let sample_rate = sample_rate.ok_or(DecodeError::InvalidData)?;
                    return Ok(Self::from_raw(body, sample_rate));
                }
                _ => {}
            }

            // Bodies are padded to an even length.
            cursor = body_end.saturating_add(len & 1);
        }
        Err(DecodeError::Truncated)
    }

    /// Sample data.
    pub fn samples(&self) -> &'a [u8] {
        self.samples
    }

    /// Playback rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` for a clip without samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clip length in milliseconds, rounded down.
    pub fn duration_ms(&self) -> u64 {
        (self.samples.len() as u64)
            .saturating_mul(1000)
            .checked_div(u64::from(self.sample_rate))
            .unwrap_or(0)
    }
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16, DecodeError> {
    bytes
        .get(at..at.saturating_add(2))
        .and_then(|b| b.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or(DecodeError::InvalidData)
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, DecodeError> {
    bytes
        .get(at..at.saturating_add(4))
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(DecodeError::InvalidData)
}

/// Validate a `fmt ` body and return its sample rate.
fn parse_fmt(body: &[u8]) -> Result<u32, DecodeError> {
    let format = read_u16(body, 0)?;
    let channels = read_u16(body, 2)?;
    let sample_rate = read_u32(body, 4)?;
    let bits_per_sample = read_u16(body, 14)?;
    if format != FMT_PCM || channels != 1 || bits_per_sample != 8 || sample_rate == 0 {
        return Err(DecodeError::UnsupportedFormat);
    }
    Ok(sample_rate)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    /// Minimal WAV image: header, optional extra chunk, fmt, data.
    fn wav(channels: u16, bits: u16, rate: u32, extra: Option<&[u8]>, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&0u32.to_le_bytes()); // size is not checked
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&rate.to_le_bytes());
        out.extend_from_slice(&(rate * u32::from(channels) * u32::from(bits / 8)).to_le_bytes());
        out.extend_from_slice(&(channels * bits / 8).to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        if let Some(body) = extra {
            out.extend_from_slice(b"LIST");
            out.extend_from_slice(&(body.len() as u32).to_le_bytes());
            out.extend_from_slice(body);
            if body.len() % 2 == 1 {
                out.push(0);
            }
        }
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_parse_8bit_mono() {
        let image = wav(1, 8, 8000, None, &[0x80, 0x90, 0x70]);
        let clip = PcmClip::from_wav(&image).unwrap();
        assert_eq!(clip.sample_rate(), 8000);
        assert_eq!(clip.samples(), &[0x80, 0x90, 0x70]);
    }

    #[test]
    fn test_skips_unknown_chunk_with_padding() {
        let image = wav(1, 8, 11025, Some(b"odd"), &[1, 2, 3, 4]);
        let clip = PcmClip::from_wav(&image).unwrap();
        assert_eq!(clip.len(), 4);
        assert_eq!(clip.sample_rate(), 11025);
    }

    #[test]
    fn test_rejects_stereo_and_16bit() {
        let stereo = wav(2, 8, 8000, None, &[0; 4]);
        assert_eq!(PcmClip::from_wav(&stereo), Err(DecodeError::UnsupportedFormat));
        let wide = wav(1, 16, 8000, None, &[0; 4]);
        assert_eq!(PcmClip::from_wav(&wide), Err(DecodeError::UnsupportedFormat));
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut image = wav(1, 8, 8000, None, &[0; 4]);
        image[0] = b'X';
        assert_eq!(PcmClip::from_wav(&image), Err(DecodeError::InvalidData));
        assert_eq!(PcmClip::from_wav(b"RIFF"), Err(DecodeError::InvalidData));
    }

    #[test]
    fn test_truncated_data_chunk() {
        let mut image = wav(1, 8, 8000, None, &[0; 16]);
        image.truncate(image.len() - 4);
        assert_eq!(PcmClip::from_wav(&image), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_duration_ms() {
        let samples = [0x80u8; 4000];
        assert_eq!(PcmClip::from_raw(&samples, 8000).duration_ms(), 500);
        assert_eq!(PcmClip::from_raw(&samples, 0).duration_ms(), 0);
    }
}
