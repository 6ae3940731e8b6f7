//! Error types for the chunk container kernel.

use retrodec_core::LayoutError;
use thiserror::Error;

use crate::fourcc::FourCC;

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors that can occur while scanning, indexing or writing containers.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// A chunk's derived payload range leaves the buffer.
    #[error("chunk '{tag}' at offset {offset} needs {needed} bytes, have {available}")]
    UnexpectedBufferSize {
        tag: FourCC,
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// A chunk header does not fit in the remaining bytes.
    #[error("truncated chunk header at offset {offset}: {available} bytes left")]
    TruncatedHeader { offset: u64, available: usize },

    /// A chunk header declares a size its codec cannot honour.
    #[error("chunk '{tag}' at offset {offset} declares invalid size {stored}")]
    InvalidChunkSize {
        tag: FourCC,
        offset: u64,
        stored: u32,
    },

    /// A chunk body is too large for its codec's size field.
    #[error("chunk '{tag}' body length {body_len} cannot be encoded")]
    OversizeChunk { tag: FourCC, body_len: usize },

    /// Alignment padding contained a non-zero byte.
    #[error("non-zero padding byte {value:#04x} at offset {offset}")]
    PaddingCorruption { offset: u64, value: u8 },

    /// A tag has no schema entry at all.
    #[error("no schema entry for tag '{tag}'")]
    MissingSchemaKey { tag: FourCC },

    /// A tag appeared under a parent whose child set does not allow it.
    #[error("tag '{tag}' is not an allowed child of '{parent}'")]
    MissingSchemaEntry { parent: FourCC, tag: FourCC },

    /// Schema inference cannot refine the working schema any further.
    #[error("schema cannot be resolved for parent '{parent}'")]
    SchemaUnresolvable { parent: FourCC },

    /// The payload of a supposed container did not scan as a chunk stream.
    #[error("payload of '{parent}' at offset {offset} is not a chunk stream: {source}")]
    SubchunkScan {
        parent: FourCC,
        offset: u64,
        #[source]
        source: Box<ContainerError>,
    },

    /// A schema file could not be parsed.
    #[error("invalid schema document: {0}")]
    InvalidSchema(#[from] serde_json::Error),

    /// Record pack/unpack failure in a chunk header.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// I/O error on the write path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContainerError {
    /// True for the recoverable schema-violation kinds.
    ///
    /// In lenient indexing these are downgraded to warnings; in strict mode
    /// they are the structured signals the inference loop reacts to.
    #[must_use]
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            ContainerError::MissingSchemaKey { .. } | ContainerError::MissingSchemaEntry { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContainerError::MissingSchemaEntry {
            parent: FourCC::new(*b"LFLF"),
            tag: FourCC::new(*b"ROOM"),
        };
        assert_eq!(err.to_string(), "tag 'ROOM' is not an allowed child of 'LFLF'");
    }

    #[test]
    fn test_schema_violation_classification() {
        let key = ContainerError::MissingSchemaKey {
            tag: FourCC::new(*b"SOUN"),
        };
        assert!(key.is_schema_violation());

        let padding = ContainerError::PaddingCorruption {
            offset: 12,
            value: 0x80,
        };
        assert!(!padding.is_schema_violation());
    }
}
