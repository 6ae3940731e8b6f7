//! Audio sub-chunk records.
//!
//! Animation streams interleave sound chunks with video frames. Each sound
//! chunk opens with a small track record followed by raw PCM; the flag word
//! describes how the PCM bytes are to be read.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use retrodec_core::{Field, Layout, Width};

use crate::error::{AnimError, Result};

static SOUND_HEADER: Layout = Layout::new(
    "sound_header",
    &[
        Field::le("track_id", Width::U16),
        Field::le("index", Width::U16),
        Field::le("max_frames", Width::U16),
        Field::le("flags", Width::U16),
        Field::le("volume", Width::U8),
        Field::le("pan", Width::U8),
    ],
);

/// Size of the track record preceding the PCM bytes.
pub const SOUND_HEADER_LEN: usize = 10;

/// Flag bit: samples are 16 bits wide instead of 8.
pub const FLAG_16BIT: u16 = 1 << 0;
/// Flag bit: samples are signed.
pub const FLAG_SIGNED: u16 = 1 << 1;
/// Flag bit: 16-bit samples are big-endian.
pub const FLAG_BIG_ENDIAN: u16 = 1 << 2;

/// The track record of one audio sub-chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundHeader {
    /// Track identifier; chunks of one track concatenate into a stream.
    pub track_id: u16,
    /// Position of this chunk within its track.
    pub index: u16,
    /// Total number of chunks the track will carry.
    pub max_frames: u16,
    /// PCM format flags.
    pub flags: u16,
    /// Playback volume, 0-255.
    pub volume: u8,
    /// Stereo pan, 0-255 with 128 centred.
    pub pan: u8,
}

impl SoundHeader {
    /// Split a sound chunk payload into its record and PCM bytes.
    pub fn parse(payload: &[u8]) -> Result<(Self, &[u8])> {
        let record = SOUND_HEADER.unpack(payload)?;
        let header = SoundHeader {
            track_id: record.get("track_id")? as u16,
            index: record.get("index")? as u16,
            max_frames: record.get("max_frames")? as u16,
            flags: record.get("flags")? as u16,
            volume: record.get("volume")? as u8,
            pan: record.get("pan")? as u8,
        };
        Ok((header, &payload[SOUND_HEADER_LEN..]))
    }

    /// Encode the record, the inverse of [`SoundHeader::parse`].
    pub fn to_bytes(&self) -> Vec<u8> {
        SOUND_HEADER
            .pack(&[
                u64::from(self.track_id),
                u64::from(self.index),
                u64::from(self.max_frames),
                u64::from(self.flags),
                u64::from(self.volume),
                u64::from(self.pan),
            ])
            .unwrap_or_default()
    }

    /// The PCM format the flag bits describe.
    pub fn format(&self) -> PcmFormat {
        match (
            self.flags & FLAG_16BIT != 0,
            self.flags & FLAG_SIGNED != 0,
            self.flags & FLAG_BIG_ENDIAN != 0,
        ) {
            (false, false, _) => PcmFormat::U8,
            (false, true, _) => PcmFormat::S8,
            (true, false, false) => PcmFormat::U16Le,
            (true, false, true) => PcmFormat::U16Be,
            (true, true, false) => PcmFormat::S16Le,
            (true, true, true) => PcmFormat::S16Be,
        }
    }
}

/// PCM sample formats expressible by the sound flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmFormat {
    /// Unsigned 8-bit PCM.
    U8,
    /// Signed 8-bit PCM.
    S8,
    /// Unsigned 16-bit PCM, little endian.
    U16Le,
    /// Unsigned 16-bit PCM, big endian.
    U16Be,
    /// Signed 16-bit PCM, little endian.
    S16Le,
    /// Signed 16-bit PCM, big endian.
    S16Be,
}

impl PcmFormat {
    /// Bytes per sample.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            PcmFormat::U8 | PcmFormat::S8 => 1,
            _ => 2,
        }
    }
}

/// Convert raw PCM bytes to normalised signed 16-bit samples.
pub fn pcm_to_i16(format: PcmFormat, data: &[u8]) -> Result<Vec<i16>> {
    let step = format.bytes_per_sample();
    if data.len() % step != 0 {
        return Err(AnimError::UnexpectedEnd {
            needed: step - data.len() % step,
            available: 0,
        });
    }

    let samples = match format {
        PcmFormat::U8 => data
            .iter()
            .map(|&b| (i16::from(b) - 128) << 8)
            .collect(),
        PcmFormat::S8 => data.iter().map(|&b| i16::from(b as i8) << 8).collect(),
        PcmFormat::U16Le => data
            .chunks_exact(2)
            .map(|c| (LittleEndian::read_u16(c) as i32 - 0x8000) as i16)
            .collect(),
        PcmFormat::U16Be => data
            .chunks_exact(2)
            .map(|c| (BigEndian::read_u16(c) as i32 - 0x8000) as i16)
            .collect(),
        PcmFormat::S16Le => data
            .chunks_exact(2)
            .map(|c| LittleEndian::read_i16(c))
            .collect(),
        PcmFormat::S16Be => data.chunks_exact(2).map(|c| BigEndian::read_i16(c)).collect(),
    };
    Ok(samples)
}
