//! Chunk header codecs.
//!
//! The archive families share the chunk abstraction but not the header
//! layout: the main resource archives store a big-endian `tag + size` pair
//! whose size field counts the header itself, while the animation/audio
//! family stores a little-endian `size + tag` pair, with a legacy variant
//! carrying two-character tags. The codec is selected by configuration, not
//! auto-detected.

use retrodec_core::{Field, Layout, Width};

use crate::error::{ContainerError, Result};
use crate::fourcc::{FourCC, SENTINEL};

static RESOURCE_HEADER: Layout = Layout::new(
    "resource_header",
    &[Field::be("tag", Width::U32), Field::be("size", Width::U32)],
);

static STREAM_HEADER: Layout = Layout::new(
    "stream_header",
    &[Field::le("size", Width::U32), Field::be("tag", Width::U32)],
);

static LEGACY_HEADER: Layout = Layout::new(
    "legacy_header",
    &[
        Field::le("size", Width::U32),
        Field::be("tag", Width::U16),
        Field::be("pad", Width::U16),
    ],
);

/// A decoded chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Chunk tag; [`SENTINEL`] for a null header.
    pub tag: FourCC,
    /// Payload length in bytes, header excluded.
    pub body_len: usize,
}

/// Header layout strategy for one archive family.
///
/// The `size_delta` of each variant is added to the stored size field to
/// obtain the payload length; its default reflects whether the family counts
/// the header in the size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCodec {
    /// Big-endian `tag(4) + size(u32)`; size counts the 8-byte header.
    Resource {
        /// Correction added to the stored size to get the payload length.
        size_delta: i32,
    },
    /// Little-endian `size(u32) + tag(4)`; size counts the payload only.
    Stream {
        /// Correction added to the stored size to get the payload length.
        size_delta: i32,
    },
    /// Little-endian `size(u32) + tag(2 ASCII + 2 zero)`; size counts the
    /// 8-byte header.
    Legacy {
        /// Correction added to the stored size to get the payload length.
        size_delta: i32,
    },
}

impl ChunkCodec {
    /// The resource-archive codec with its default size correction.
    pub fn resource() -> Self {
        ChunkCodec::Resource { size_delta: -8 }
    }

    /// The animation/audio stream codec with its default size correction.
    pub fn stream() -> Self {
        ChunkCodec::Stream { size_delta: 0 }
    }

    /// The legacy two-character tag codec with its default size correction.
    pub fn legacy() -> Self {
        ChunkCodec::Legacy { size_delta: -8 }
    }

    /// Header length in bytes.
    pub fn header_len(&self) -> usize {
        match self {
            ChunkCodec::Resource { .. } => RESOURCE_HEADER.size(),
            ChunkCodec::Stream { .. } => STREAM_HEADER.size(),
            ChunkCodec::Legacy { .. } => LEGACY_HEADER.size(),
        }
    }

    fn size_delta(&self) -> i32 {
        match *self {
            ChunkCodec::Resource { size_delta }
            | ChunkCodec::Stream { size_delta }
            | ChunkCodec::Legacy { size_delta } => size_delta,
        }
    }

    /// Decode one header from the front of `bytes`.
    ///
    /// `remaining` is the byte count from the header start to the end of the
    /// enclosing buffer; a null header resolves to a sentinel chunk spanning
    /// all of it. `offset` is carried into diagnostics only.
    pub fn decode(&self, bytes: &[u8], remaining: usize, offset: u64) -> Result<ChunkHeader> {
        let header_len = self.header_len();
        if bytes.len() < header_len {
            return Err(ContainerError::TruncatedHeader {
                offset,
                available: bytes.len(),
            });
        }

        let (tag, stored) = match self {
            ChunkCodec::Resource { .. } => {
                let record = RESOURCE_HEADER.unpack(bytes)?;
                (
                    FourCC::from_u32(record.get("tag")? as u32),
                    record.get("size")? as u32,
                )
            }
            ChunkCodec::Stream { .. } => {
                let record = STREAM_HEADER.unpack(bytes)?;
                (
                    FourCC::from_u32(record.get("tag")? as u32),
                    record.get("size")? as u32,
                )
            }
            ChunkCodec::Legacy { .. } => {
                let record = LEGACY_HEADER.unpack(bytes)?;
                (
                    FourCC::from_u32((record.get("tag")? as u32) << 16),
                    record.get("size")? as u32,
                )
            }
        };

        if tag.is_null() {
            return match self {
                // Null header: the rest of the buffer is one raw chunk.
                ChunkCodec::Resource { .. } | ChunkCodec::Stream { .. } if stored == 0 => {
                    Ok(ChunkHeader {
                        tag: SENTINEL,
                        body_len: remaining.saturating_sub(header_len),
                    })
                }
                // Legacy null tags keep their stored size.
                ChunkCodec::Legacy { .. } => self.body_len(SENTINEL, stored, offset),
                _ => Err(ContainerError::InvalidChunkSize {
                    tag,
                    offset,
                    stored,
                }),
            };
        }

        self.body_len(tag, stored, offset)
    }

    fn body_len(&self, tag: FourCC, stored: u32, offset: u64) -> Result<ChunkHeader> {
        let body = i64::from(stored) + i64::from(self.size_delta());
        if body < 0 {
            return Err(ContainerError::InvalidChunkSize {
                tag,
                offset,
                stored,
            });
        }
        Ok(ChunkHeader {
            tag,
            body_len: body as usize,
        })
    }

    /// Encode a header for a chunk with the given payload length.
    ///
    /// The sentinel tag encodes as an all-zero header, the inverse of the
    /// null-header read path.
    pub fn encode(&self, tag: FourCC, body_len: usize) -> Result<Vec<u8>> {
        if tag == SENTINEL {
            return Ok(vec![0u8; self.header_len()]);
        }

        let stored = body_len as i64 - i64::from(self.size_delta());
        if stored < 0 || stored > i64::from(u32::MAX) {
            return Err(ContainerError::OversizeChunk { tag, body_len });
        }
        let stored = stored as u64;

        let bytes = match self {
            ChunkCodec::Resource { .. } => {
                RESOURCE_HEADER.pack(&[u64::from(tag.as_u32()), stored])?
            }
            ChunkCodec::Stream { .. } => {
                STREAM_HEADER.pack(&[stored, u64::from(tag.as_u32())])?
            }
            ChunkCodec::Legacy { .. } => {
                LEGACY_HEADER.pack(&[stored, u64::from(tag.as_u32() >> 16), 0])?
            }
        };
        Ok(bytes)
    }
}
