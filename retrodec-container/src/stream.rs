//! Chunk stream scanning and writing.

use std::io::Write;

use tracing::{debug, warn};

use crate::align;
use crate::chunk::Chunk;
use crate::error::{ContainerError, Result};
use crate::fourcc::FourCC;
use crate::header::ChunkCodec;

/// Kernel configuration for one archive family.
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    /// Header codec.
    pub codec: ChunkCodec,
    /// Alignment boundary between consecutive chunks.
    pub boundary: u64,
    /// Opt-in workaround: a single stray byte of this value ahead of a
    /// chunk header is skipped with a warning instead of failing the scan.
    pub stray_byte: Option<u8>,
}

impl ScanConfig {
    /// Configuration for the main resource archives (no inter-chunk
    /// padding unless the archive family specifies one).
    pub fn resource() -> Self {
        ScanConfig {
            codec: ChunkCodec::resource(),
            boundary: 1,
            stray_byte: None,
        }
    }

    /// Configuration for the animation/audio stream family (word-aligned).
    pub fn stream() -> Self {
        ScanConfig {
            codec: ChunkCodec::stream(),
            boundary: 2,
            stray_byte: None,
        }
    }

    /// Configuration for legacy two-character tag archives.
    pub fn legacy() -> Self {
        ScanConfig {
            codec: ChunkCodec::legacy(),
            boundary: 1,
            stray_byte: None,
        }
    }

    /// Set the alignment boundary.
    pub fn with_boundary(mut self, boundary: u64) -> Self {
        self.boundary = boundary;
        self
    }

    /// Enable the stray-byte skip for the given byte value.
    pub fn with_stray_byte(mut self, value: u8) -> Self {
        self.stray_byte = Some(value);
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig::resource()
    }
}

/// Iterator over the `(offset, chunk)` pairs of a buffer.
///
/// The scan must account for every byte: it terminates when the cursor lands
/// exactly on the buffer end and fails on anything short of that.
#[derive(Debug, Clone)]
pub struct ChunkScanner<'a> {
    buf: &'a [u8],
    pos: usize,
    config: ScanConfig,
    base_offset: u64,
    done: bool,
}

impl<'a> ChunkScanner<'a> {
    /// Scan `buf` from its start.
    pub fn new(buf: &'a [u8], config: ScanConfig) -> Self {
        Self::with_base_offset(buf, config, 0)
    }

    /// Scan `buf`, reporting offsets relative to a containing archive.
    ///
    /// Used when `buf` is the payload of an enclosing chunk, so diagnostics
    /// and element attributes carry archive-absolute positions.
    pub fn with_base_offset(buf: &'a [u8], config: ScanConfig, base_offset: u64) -> Self {
        ChunkScanner {
            buf,
            pos: 0,
            config,
            base_offset,
            done: false,
        }
    }

    fn abs(&self, pos: usize) -> u64 {
        self.base_offset + pos as u64
    }

    fn scan_next(&mut self) -> Result<Option<(u64, Chunk<'a>)>> {
        if self.pos == self.buf.len() {
            return Ok(None);
        }

        let pad = align::read_padding(self.buf, self.abs(self.pos), self.config.boundary)?;
        self.pos += pad;
        if self.pos == self.buf.len() {
            return Ok(None);
        }

        if let Some(stray) = self.config.stray_byte {
            if self.buf[self.pos] == stray {
                warn!(
                    offset = self.abs(self.pos),
                    value = stray,
                    "skipping stray byte ahead of chunk header"
                );
                self.pos += 1;
                if self.pos == self.buf.len() {
                    return Ok(None);
                }
            }
        }

        let offset = self.abs(self.pos);
        let remaining = self.buf.len() - self.pos;
        let header = self
            .config
            .codec
            .decode(&self.buf[self.pos..], remaining, offset)?;

        let body_start = self.pos + self.config.codec.header_len();
        let body_end = body_start.checked_add(header.body_len);
        let body = body_end
            .and_then(|end| self.buf.get(body_start..end))
            .ok_or(ContainerError::UnexpectedBufferSize {
                tag: header.tag,
                offset,
                needed: header.body_len,
                available: self.buf.len().saturating_sub(body_start),
            })?;

        debug!(tag = %header.tag, offset, len = header.body_len, "scanned chunk");

        let chunk = Chunk::new(header.tag, offset, body);
        self.pos = body_start + header.body_len;

        Ok(Some((offset, chunk)))
    }
}

impl<'a> Iterator for ChunkScanner<'a> {
    type Item = Result<(u64, Chunk<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.scan_next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Serialises a chunk sequence, the inverse of [`ChunkScanner`].
#[derive(Debug)]
pub struct ChunkWriter<W: Write> {
    writer: W,
    config: ScanConfig,
    written: u64,
}

impl<W: Write> ChunkWriter<W> {
    /// Wrap a writer.
    pub fn new(writer: W, config: ScanConfig) -> Self {
        ChunkWriter {
            writer,
            config,
            written: 0,
        }
    }

    /// Append one chunk: header, payload, then zero padding to the boundary.
    pub fn put(&mut self, tag: FourCC, payload: &[u8]) -> Result<()> {
        let header = self.config.codec.encode(tag, payload.len())?;
        self.writer.write_all(&header)?;
        self.writer.write_all(payload)?;
        self.written += (header.len() + payload.len()) as u64;

        let pad = align::write_padding(&mut self.writer, self.written, self.config.boundary)?;
        self.written += pad;
        Ok(())
    }

    /// Total bytes emitted so far, padding included.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
