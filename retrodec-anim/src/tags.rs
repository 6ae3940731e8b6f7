//! Well-known tags of the animation stream family.

use retrodec_container::FourCC;

/// Animation container root.
pub const ANIM: FourCC = FourCC(*b"ANIM");
/// Animation header: version, frame count, palette.
pub const AHDR: FourCC = FourCC(*b"AHDR");
/// One animation frame, holding video and audio sub-chunks.
pub const FRME: FourCC = FourCC(*b"FRME");
/// Compressed video object inside a frame.
pub const FOBJ: FourCC = FourCC(*b"FOBJ");
/// Streamed audio sub-chunk inside a frame.
pub const PSAD: FourCC = FourCC(*b"PSAD");
/// Standalone sound resource.
pub const SAUD: FourCC = FourCC(*b"SAUD");
/// Raw sample data inside a sound resource.
pub const SDAT: FourCC = FourCC(*b"SDAT");
