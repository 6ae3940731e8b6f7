//! Declarative fixed-size binary record layouts.
//!
//! A [`Layout`] names an ordered table of fields, each with a byte width and
//! an endianness. The same table drives both directions: [`Layout::unpack`]
//! turns raw bytes into a [`Record`] with by-name access, [`Layout::pack`]
//! turns field values back into bytes. Chunk headers and codec metadata
//! records are described this way instead of hand-written per format.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::LayoutError;

/// Byte order of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

/// Width of a single field in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// One byte.
    U8,
    /// Two bytes.
    U16,
    /// Three bytes.
    U24,
    /// Four bytes.
    U32,
}

impl Width {
    /// Number of bytes the field occupies.
    pub const fn bytes(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U16 => 2,
            Width::U24 => 3,
            Width::U32 => 4,
        }
    }

    /// Largest value the field can hold.
    pub const fn max_value(self) -> u64 {
        match self {
            Width::U8 => 0xFF,
            Width::U16 => 0xFFFF,
            Width::U24 => 0xFF_FFFF,
            Width::U32 => 0xFFFF_FFFF,
        }
    }
}

/// One field of a binary record.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Field name, unique within its layout.
    pub name: &'static str,
    /// Field width.
    pub width: Width,
    /// Field byte order.
    pub endian: Endian,
}

impl Field {
    /// Create a big-endian field.
    pub const fn be(name: &'static str, width: Width) -> Self {
        Field {
            name,
            width,
            endian: Endian::Big,
        }
    }

    /// Create a little-endian field.
    pub const fn le(name: &'static str, width: Width) -> Self {
        Field {
            name,
            width,
            endian: Endian::Little,
        }
    }
}

/// A named, fixed-size binary record description.
#[derive(Debug)]
pub struct Layout {
    /// Record name, used in diagnostics.
    pub name: &'static str,
    /// Ordered fields.
    pub fields: &'static [Field],
}

impl Layout {
    /// Create a layout over a static field table.
    pub const fn new(name: &'static str, fields: &'static [Field]) -> Self {
        Layout { name, fields }
    }

    /// Total record size in bytes.
    pub const fn size(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.fields.len() {
            total += self.fields[i].width.bytes();
            i += 1;
        }
        total
    }

    /// Decode one record from the front of `bytes`.
    ///
    /// `bytes` may be longer than the record; trailing bytes are ignored.
    pub fn unpack(&'static self, bytes: &[u8]) -> Result<Record, LayoutError> {
        let size = self.size();
        if bytes.len() < size {
            return Err(LayoutError::BufferSizeMismatch {
                layout: self.name,
                expected: size,
                actual: bytes.len(),
            });
        }

        let mut values = Vec::with_capacity(self.fields.len());
        let mut pos = 0;
        for field in self.fields {
            let end = pos + field.width.bytes();
            let raw = &bytes[pos..end];
            let value = match (field.width, field.endian) {
                (Width::U8, _) => u64::from(raw[0]),
                (Width::U16, Endian::Big) => u64::from(BigEndian::read_u16(raw)),
                (Width::U16, Endian::Little) => u64::from(LittleEndian::read_u16(raw)),
                (Width::U24, Endian::Big) => u64::from(BigEndian::read_u24(raw)),
                (Width::U24, Endian::Little) => u64::from(LittleEndian::read_u24(raw)),
                (Width::U32, Endian::Big) => u64::from(BigEndian::read_u32(raw)),
                (Width::U32, Endian::Little) => u64::from(LittleEndian::read_u32(raw)),
            };
            values.push(value);
            pos = end;
        }

        Ok(Record {
            layout: self,
            values,
        })
    }

    /// Encode `values` (one per field, in declaration order) into bytes.
    pub fn pack(&'static self, values: &[u64]) -> Result<Vec<u8>, LayoutError> {
        if values.len() != self.fields.len() {
            return Err(LayoutError::FieldCountMismatch {
                layout: self.name,
                expected: self.fields.len(),
                actual: values.len(),
            });
        }

        let mut out = vec![0u8; self.size()];
        let mut pos = 0;
        for (field, &value) in self.fields.iter().zip(values) {
            if value > field.width.max_value() {
                return Err(LayoutError::FieldOverflow {
                    layout: self.name,
                    field: field.name,
                    value,
                });
            }
            let end = pos + field.width.bytes();
            let raw = &mut out[pos..end];
            match (field.width, field.endian) {
                (Width::U8, _) => raw[0] = value as u8,
                (Width::U16, Endian::Big) => BigEndian::write_u16(raw, value as u16),
                (Width::U16, Endian::Little) => LittleEndian::write_u16(raw, value as u16),
                (Width::U24, Endian::Big) => BigEndian::write_u24(raw, value as u32),
                (Width::U24, Endian::Little) => LittleEndian::write_u24(raw, value as u32),
                (Width::U32, Endian::Big) => BigEndian::write_u32(raw, value as u32),
                (Width::U32, Endian::Little) => LittleEndian::write_u32(raw, value as u32),
            }
            pos = end;
        }

        Ok(out)
    }
}

/// A record decoded by [`Layout::unpack`].
#[derive(Debug, Clone)]
pub struct Record {
    layout: &'static Layout,
    values: Vec<u64>,
}

impl Record {
    /// Look up a field value by name.
    pub fn get(&self, field: &'static str) -> Result<u64, LayoutError> {
        self.layout
            .fields
            .iter()
            .position(|f| f.name == field)
            .map(|i| self.values[i])
            .ok_or(LayoutError::UnknownField {
                layout: self.layout.name,
                field,
            })
    }

    /// All field values in declaration order.
    pub fn values(&self) -> &[u64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_LAYOUT: Layout = Layout::new(
        "test_record",
        &[
            Field::be("magic", Width::U32),
            Field::le("count", Width::U16),
            Field::le("flags", Width::U8),
            Field::le("span", Width::U24),
        ],
    );

    #[test]
    fn test_size() {
        assert_eq!(TEST_LAYOUT.size(), 10);
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let values = [0x4C45_4346, 0x1234, 0x7F, 0x00AB_CDEF];
        let bytes = TEST_LAYOUT.pack(&values).unwrap();
        assert_eq!(bytes.len(), 10);

        let record = TEST_LAYOUT.unpack(&bytes).unwrap();
        assert_eq!(record.values(), &values);
        assert_eq!(record.get("magic").unwrap(), 0x4C45_4346);
        assert_eq!(record.get("count").unwrap(), 0x1234);
    }

    #[test]
    fn test_unpack_field_order() {
        let bytes = [
            0x4C, 0x45, 0x43, 0x46, // magic, big endian
            0x34, 0x12, // count, little endian
            0x7F, // flags
            0xEF, 0xCD, 0xAB, // span, little endian
        ];
        let record = TEST_LAYOUT.unpack(&bytes).unwrap();
        assert_eq!(record.get("count").unwrap(), 0x1234);
        assert_eq!(record.get("span").unwrap(), 0x00AB_CDEF);
    }

    #[test]
    fn test_unpack_short_buffer() {
        let err = TEST_LAYOUT.unpack(&[0u8; 4]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::BufferSizeMismatch {
                layout: "test_record",
                expected: 10,
                actual: 4,
            }
        );
    }

    #[test]
    fn test_unpack_ignores_trailing_bytes() {
        let mut bytes = TEST_LAYOUT.pack(&[1, 2, 3, 4]).unwrap();
        bytes.extend_from_slice(&[0xDE, 0xAD]);
        let record = TEST_LAYOUT.unpack(&bytes).unwrap();
        assert_eq!(record.values(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_pack_overflow() {
        let err = TEST_LAYOUT.pack(&[0, 0x1_0000, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::FieldOverflow { field: "count", .. }
        ));
    }

    #[test]
    fn test_pack_field_count() {
        let err = TEST_LAYOUT.pack(&[1, 2]).unwrap_err();
        assert!(matches!(err, LayoutError::FieldCountMismatch { .. }));
    }

    #[test]
    fn test_unknown_field() {
        let bytes = TEST_LAYOUT.pack(&[0, 0, 0, 0]).unwrap();
        let record = TEST_LAYOUT.unpack(&bytes).unwrap();
        assert!(matches!(
            record.get("missing"),
            Err(LayoutError::UnknownField { .. })
        ));
    }
}
