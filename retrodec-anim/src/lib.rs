//! Animation stream decoding.
//!
//! Cutscenes ship as chunked animation streams whose video frames are
//! compressed with an interframe block codec ("codec 37"). This crate
//! provides the decoding half:
//!
//! - [`Codec37Decoder`] — a per-animation session reconstructing raw
//!   palette-indexed frames from run-length, fill and motion-compensation
//!   opcodes against a persistent pair of delta buffers
//! - [`rle`] — the literal/fill run-length primitive, also usable on its own
//! - [`SoundHeader`] — the audio sub-chunk record carried alongside video
//!   frames, with its PCM format flags
//!
//! Frame payloads are handed in by the container kernel; palette
//! application and raster export are downstream concerns and operate on the
//! returned [`Frame`] bytes.

pub mod codec37;
pub mod error;
pub mod frame;
pub mod motion;
pub mod rle;
pub mod sound;
pub mod tags;

pub use codec37::Codec37Decoder;
pub use error::{AnimError, Result};
pub use frame::{Frame, FrameHeader, FRAME_HEADER_LEN};
pub use sound::{PcmFormat, SoundHeader, SOUND_HEADER_LEN};
