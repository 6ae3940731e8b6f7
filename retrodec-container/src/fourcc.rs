//! Four-character chunk tags.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::{Serialize, Serializer};

/// FourCC (Four Character Code) chunk tag.
///
/// Tags are four ASCII bytes. Legacy two-character tags occupy the first two
/// bytes with zero padding; the padding is trimmed for display.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCC(pub [u8; 4]);

/// The sentinel tag assigned to a null-header chunk spanning the rest of its
/// buffer.
pub const SENTINEL: FourCC = FourCC(*b"____");

impl FourCC {
    /// Create from raw bytes.
    pub fn new(bytes: [u8; 4]) -> Self {
        FourCC(bytes)
    }

    /// Create from a string of up to 4 bytes; shorter tags are zero-padded.
    pub fn from_str(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 4 {
            return None;
        }
        let mut bytes = [0u8; 4];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Some(FourCC(bytes))
    }

    /// Get as a string, trailing NUL padding trimmed.
    pub fn as_str(&self) -> String {
        let end = self
            .0
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.0[..end]).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Big-endian numeric view, as stored in a 32-bit tag field.
    pub fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Inverse of [`FourCC::as_u32`].
    pub fn from_u32(value: u32) -> Self {
        FourCC(value.to_be_bytes())
    }

    /// True when every tag byte is zero.
    pub fn is_null(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{}\")", self.as_str())
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<[u8; 4]> for FourCC {
    fn from(bytes: [u8; 4]) -> Self {
        FourCC(bytes)
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(bytes: &[u8; 4]) -> Self {
        FourCC(*bytes)
    }
}

impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for FourCC {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FourCCVisitor;

        impl Visitor<'_> for FourCCVisitor {
            type Value = FourCC;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a tag of 1 to 4 characters")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FourCC, E> {
                FourCC::from_str(v)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_str(FourCCVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc() {
        let tag = FourCC::new(*b"LECF");
        assert_eq!(tag.as_str(), "LECF");
        assert_eq!(tag.as_bytes(), b"LECF");

        let tag2 = FourCC::from_str("ANIM").unwrap();
        assert_eq!(tag2.as_str(), "ANIM");
    }

    #[test]
    fn test_short_tag_padding() {
        let tag = FourCC::from_str("RO").unwrap();
        assert_eq!(tag.as_bytes(), &[b'R', b'O', 0, 0]);
        assert_eq!(tag.as_str(), "RO");
    }

    #[test]
    fn test_u32_roundtrip() {
        let tag = FourCC::new(*b"FRME");
        assert_eq!(FourCC::from_u32(tag.as_u32()), tag);
    }

    #[test]
    fn test_null() {
        assert!(FourCC::new([0; 4]).is_null());
        assert!(!SENTINEL.is_null());
    }

    #[test]
    fn test_serde_string_form() {
        let tag = FourCC::new(*b"ROOM");
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"ROOM\"");
        let back: FourCC = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }

    #[test]
    fn test_from_str_rejects_oversize() {
        assert!(FourCC::from_str("TOOBIG").is_none());
        assert!(FourCC::from_str("").is_none());
    }
}
