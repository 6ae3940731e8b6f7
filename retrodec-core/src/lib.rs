//! # Retrodec Core
//!
//! Core types and utilities shared by the retrodec decoder crates.
//!
//! This crate provides the building blocks used across all retrodec
//! components:
//! - Error handling types
//! - Declarative binary record layouts with two-way pack/unpack
//! - Bit-level stream reading for packed codec payloads

pub mod error;
pub mod layout;
pub mod bitstream;

pub use error::{BitstreamError, LayoutError};
pub use layout::{Endian, Field, Layout, Record, Width};
pub use bitstream::BitReader;
