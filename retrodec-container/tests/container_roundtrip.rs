//! Container kernel round-trip tests.
//!
//! Writes chunk sequences through every header codec and reads them back,
//! including property-based coverage of the round-trip and alignment laws.

use proptest::prelude::*;
use retrodec_container::{
    align, crypt, ChunkCodec, ChunkScanner, ChunkWriter, FourCC, ScanConfig,
};

fn roundtrip(config: ScanConfig, chunks: &[(FourCC, Vec<u8>)]) -> Vec<(FourCC, Vec<u8>)> {
    let mut writer = ChunkWriter::new(Vec::new(), config);
    for (tag, payload) in chunks {
        writer.put(*tag, payload).unwrap();
    }
    let buf = writer.into_inner();

    ChunkScanner::new(&buf, config)
        .map(|item| {
            let (_, chunk) = item.unwrap();
            (chunk.tag(), chunk.materialize())
        })
        .collect()
}

#[test]
fn roundtrip_all_codecs() {
    let chunks = vec![
        (FourCC::new(*b"AHDR"), vec![1, 2, 3, 4, 5]),
        (FourCC::new(*b"FRME"), vec![]),
        (FourCC::new(*b"FRME"), vec![0xFF; 31]),
    ];
    for config in [
        ScanConfig::resource(),
        ScanConfig::stream(),
        ScanConfig::resource().with_boundary(4),
    ] {
        assert_eq!(roundtrip(config, &chunks), chunks);
    }
}

#[test]
fn roundtrip_legacy_two_byte_tags() {
    let chunks = vec![
        (FourCC::from_str("HD").unwrap(), vec![9, 9]),
        (FourCC::from_str("RO").unwrap(), vec![1; 7]),
    ];
    assert_eq!(roundtrip(ScanConfig::legacy(), &chunks), chunks);
}

#[test]
fn decrypt_then_scan() {
    let config = ScanConfig::stream();
    let mut writer = ChunkWriter::new(Vec::new(), config);
    writer.put(FourCC::new(*b"SDAT"), &[10, 20, 30]).unwrap();
    let clear = writer.into_inner();

    let mut masked = crypt::decrypt(&clear, crypt::DEFAULT_KEY);
    crypt::decrypt_in_place(&mut masked, crypt::DEFAULT_KEY);
    assert_eq!(masked, clear);

    let items: Vec<_> = ChunkScanner::new(&masked, config)
        .map(Result::unwrap)
        .collect();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].1.slice(), &[10, 20, 30]);
}

fn arb_tag() -> impl Strategy<Value = FourCC> {
    proptest::collection::vec(b'A'..=b'Z', 4).prop_map(|v| {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&v);
        FourCC::new(bytes)
    })
}

proptest! {
    /// Scanning a written stream reproduces the chunk sequence under every
    /// codec variant and boundary.
    #[test]
    fn prop_roundtrip_sequence(
        chunks in proptest::collection::vec(
            (arb_tag(), proptest::collection::vec(any::<u8>(), 0..40)),
            0..8,
        ),
        boundary in 1u64..8,
        codec_pick in 0u8..3,
    ) {
        let codec = match codec_pick {
            0 => ChunkCodec::resource(),
            1 => ChunkCodec::stream(),
            _ => ChunkCodec::legacy(),
        };
        let config = ScanConfig {
            codec,
            boundary,
            stray_byte: None,
        };

        // Legacy headers only carry two tag characters.
        let expected: Vec<(FourCC, Vec<u8>)> = if codec_pick == 2 {
            chunks
                .into_iter()
                .map(|(tag, payload)| {
                    let bytes = tag.as_bytes();
                    (FourCC::new([bytes[0], bytes[1], 0, 0]), payload)
                })
                .collect()
        } else {
            chunks
        };
        prop_assert_eq!(roundtrip(config, &expected), expected);
    }

    /// The padding function lands on the boundary and never overshoots.
    #[test]
    fn prop_alignment_law(offset in 0u64..1_000_000, boundary in 1u64..64) {
        let pad = align::padding(offset, boundary);
        prop_assert!(pad < boundary);
        prop_assert_eq!((offset + pad) % boundary, 0);
    }

    /// XOR unmasking is an involution for every key.
    #[test]
    fn prop_decrypt_involution(data in proptest::collection::vec(any::<u8>(), 0..64), key in any::<u8>()) {
        let once = crypt::decrypt(&data, key);
        let twice = crypt::decrypt(&once, key);
        prop_assert_eq!(twice, data);
    }
}
