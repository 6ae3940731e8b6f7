//! Frame headers and decoded frames.

use retrodec_core::{Field, Layout, Width};

use crate::error::Result;

static FRAME_HEADER: Layout = Layout::new(
    "frame_header",
    &[
        Field::le("opcode", Width::U8),
        Field::le("table_index", Width::U8),
        Field::le("seq", Width::U16),
        Field::le("decoded_size", Width::U32),
        Field::le("unused", Width::U24),
        Field::le("mask_flags", Width::U8),
    ],
);

/// Size of the per-frame header preceding the opcode payload.
pub const FRAME_HEADER_LEN: usize = 12;

/// The per-frame header of a compressed video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Block-procedure selector (0-4).
    pub opcode: u8,
    /// Motion-table index, fixed for the scene.
    pub table_index: u8,
    /// Sequence number; 0 starts a new scene.
    pub seq: u16,
    /// Declared output size in bytes.
    pub decoded_size: u32,
    /// Per-frame flag bits; bit 0 feeds the buffer-swap rule, bit 2
    /// enables the large-fill block codes.
    pub mask_flags: u8,
}

impl FrameHeader {
    /// Parse a header from the front of a frame payload.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let record = FRAME_HEADER.unpack(bytes)?;
        Ok(FrameHeader {
            opcode: record.get("opcode")? as u8,
            table_index: record.get("table_index")? as u8,
            seq: record.get("seq")? as u16,
            decoded_size: record.get("decoded_size")? as u32,
            mask_flags: record.get("mask_flags")? as u8,
        })
    }

    /// Encode the header, the inverse of [`FrameHeader::parse`].
    pub fn to_bytes(&self) -> Vec<u8> {
        FRAME_HEADER
            .pack(&[
                u64::from(self.opcode),
                u64::from(self.table_index),
                u64::from(self.seq),
                u64::from(self.decoded_size),
                0,
                u64::from(self.mask_flags),
            ])
            .unwrap_or_default()
    }
}

/// One decoded frame of palette-indexed pixels.
///
/// `data` holds exactly the bytes the frame declared; for a full frame that
/// is `width * height` bytes in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Decoded bytes.
    pub data: Vec<u8>,
    /// Session frame width in pixels.
    pub width: u32,
    /// Session frame height in pixels.
    pub height: u32,
}

impl Frame {
    /// True when the frame covers the whole `height x width` matrix.
    pub fn is_full(&self) -> bool {
        self.data.len() == (self.width as usize) * (self.height as usize)
    }

    /// One pixel row of a full frame.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if !self.is_full() {
            return None;
        }
        let width = self.width as usize;
        self.data.get(y * width..(y + 1) * width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_len() {
        assert_eq!(FRAME_HEADER.size(), FRAME_HEADER_LEN);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = FrameHeader {
            opcode: 3,
            table_index: 1,
            seq: 7,
            decoded_size: 64000,
            mask_flags: 0b101,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), FRAME_HEADER_LEN);
        assert_eq!(FrameHeader::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_field_positions() {
        let bytes = [
            2, // opcode
            5, // table_index
            0x34, 0x12, // seq, little endian
            0x00, 0xFA, 0x00, 0x00, // decoded_size, little endian
            0, 0, 0, // unused
            0b100, // mask_flags
        ];
        let header = FrameHeader::parse(&bytes).unwrap();
        assert_eq!(header.opcode, 2);
        assert_eq!(header.table_index, 5);
        assert_eq!(header.seq, 0x1234);
        assert_eq!(header.decoded_size, 64000);
        assert_eq!(header.mask_flags, 0b100);
    }

    #[test]
    fn test_header_too_short() {
        assert!(FrameHeader::parse(&[0; 5]).is_err());
    }

    #[test]
    fn test_frame_rows() {
        let frame = Frame {
            data: (0..12).collect(),
            width: 4,
            height: 3,
        };
        assert!(frame.is_full());
        assert_eq!(frame.row(1).unwrap(), &[4, 5, 6, 7]);
        assert!(frame.row(3).is_none());

        let partial = Frame {
            data: vec![1, 2],
            width: 4,
            height: 3,
        };
        assert!(!partial.is_full());
        assert!(partial.row(0).is_none());
    }
}
