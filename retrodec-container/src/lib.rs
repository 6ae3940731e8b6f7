//! Nested chunk container kernel.
//!
//! The resource archives of this engine family are sequences of tagged,
//! length-delimited records ("chunks") that nest recursively: a chunk's
//! payload may itself be a chunk stream. This crate provides the
//! format-agnostic kernel for reading and writing such containers:
//!
//! - [`ChunkCodec`] — the pluggable header layouts (big-endian resource
//!   archives, little-endian animation/audio streams, the legacy two-byte
//!   tag variant)
//! - [`ChunkScanner`] / [`ChunkWriter`] — iterate a buffer as
//!   `(offset, chunk)` pairs, or serialise chunks back with alignment
//!   padding
//! - [`Indexer`] — recursive descent into an [`Element`] tree, validated
//!   against a [`Schema`] of parent/child tag relationships
//! - [`infer_schema`] — discover the nesting schema of an unknown archive
//!   by speculative re-parsing
//! - [`crypt`] — the fixed-key XOR transform applied to archives on disk

pub mod align;
pub mod chunk;
pub mod crypt;
pub mod element;
pub mod error;
pub mod fourcc;
pub mod header;
pub mod index;
pub mod infer;
pub mod schema;
pub mod stream;

pub use chunk::Chunk;
pub use element::{find_path, Attribute, Element};
pub use error::{ContainerError, Result};
pub use fourcc::FourCC;
pub use header::{ChunkCodec, ChunkHeader};
pub use index::{AttribHook, Indexer};
pub use infer::infer_schema;
pub use schema::Schema;
pub use stream::{ChunkScanner, ChunkWriter, ScanConfig};
