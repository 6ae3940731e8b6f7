//! Error types for animation decoding.

use retrodec_core::LayoutError;
use thiserror::Error;

/// Result type for animation operations.
pub type Result<T> = std::result::Result<T, AnimError>;

/// Errors that can occur while decoding animation frames and records.
#[derive(Error, Debug)]
pub enum AnimError {
    /// A block procedure produced the wrong number of bytes.
    #[error("procedure {opcode} produced {actual} bytes, expected {expected}")]
    DecodeLengthMismatch {
        opcode: u8,
        expected: usize,
        actual: usize,
    },

    /// The frame opcode selects no known block procedure.
    #[error("unknown frame opcode {opcode}")]
    UnknownOpcode { opcode: u8 },

    /// A continuation frame arrived before any scene start.
    #[error("continuation frame {seq} before any scene start")]
    StrayContinuation { seq: u16 },

    /// A continuation frame contradicts the configuration captured at the
    /// scene start.
    #[error("scene configuration changed mid-scene: {0}")]
    SceneMismatch(String),

    /// A scene-start frame declares more output than the session frame.
    #[error("declared frame size {declared} exceeds the session frame of {capacity} bytes")]
    OversizeFrame { declared: usize, capacity: usize },

    /// Frame payload ended before the procedure was satisfied.
    #[error("frame data exhausted: need {needed} more bytes, have {available}")]
    UnexpectedEnd { needed: usize, available: usize },

    /// A motion code references pixels outside the delta buffers.
    #[error("motion reference {offset} leaves the delta buffer")]
    ReferenceOutOfBounds { offset: i64 },

    /// The repeated code of a motion run is not a motion or fill code.
    #[error("invalid repeated block code {code:#04x}")]
    InvalidRepeat { code: u8 },

    /// The session dimensions cannot be tiled into 4x4 blocks.
    #[error("frame dimensions {width}x{height} are not multiples of 4")]
    InvalidDimensions { width: u32, height: u32 },

    /// Record pack/unpack failure in a frame or sound header.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}
