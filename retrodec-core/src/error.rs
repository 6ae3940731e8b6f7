//! Error types for the core primitives.
//!
//! Each decoder crate carries its own error enum; the core types here are
//! the shared leaves they convert from.

use thiserror::Error;

/// Errors raised while packing or unpacking a fixed-size binary record.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The byte slice does not match the record size.
    #[error("record '{layout}' needs {expected} bytes, have {actual}")]
    BufferSizeMismatch {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A value does not fit the declared field width.
    #[error("value {value:#x} does not fit field '{field}' of record '{layout}'")]
    FieldOverflow {
        layout: &'static str,
        field: &'static str,
        value: u64,
    },

    /// A field name was requested that the layout does not declare.
    #[error("record '{layout}' has no field '{field}'")]
    UnknownField {
        layout: &'static str,
        field: &'static str,
    },

    /// Pack was given a value count different from the field count.
    #[error("record '{layout}' has {expected} fields, {actual} values given")]
    FieldCountMismatch {
        layout: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Errors raised by the bit-level reader.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BitstreamError {
    /// Unexpected end of bitstream.
    #[error("unexpected end of bitstream at bit {position}")]
    UnexpectedEnd { position: usize },

    /// More bits requested than a single read supports.
    #[error("cannot read {count} bits at once")]
    ReadTooWide { count: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_error_display() {
        let err = LayoutError::BufferSizeMismatch {
            layout: "chunk_header",
            expected: 8,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "record 'chunk_header' needs 8 bytes, have 3"
        );
    }

    #[test]
    fn test_bitstream_error_display() {
        let err = BitstreamError::UnexpectedEnd { position: 17 };
        assert_eq!(err.to_string(), "unexpected end of bitstream at bit 17");
    }
}
