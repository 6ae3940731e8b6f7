//! Property-based tests for the run-length primitive.

use proptest::prelude::*;
use retrodec_anim::rle;

/// Encode `data` as alternating literal and fill runs, exercising both
/// control-byte parities.
fn encode_naive(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, chunk) in data.chunks(4).enumerate() {
        let code = (chunk.len() as u8 - 1) << 1;
        if i % 2 == 0 || chunk.iter().any(|&b| b != chunk[0]) {
            // Literal run: even code, length (code >> 1) + 1.
            out.push(code);
            out.extend_from_slice(chunk);
        } else {
            // Fill run: odd code.
            out.push(code | 1);
            out.push(chunk[0]);
        }
    }
    out
}

proptest! {
    /// A decode that succeeds always yields exactly the requested size.
    #[test]
    fn output_is_exact_or_error(
        src in proptest::collection::vec(any::<u8>(), 0..64),
        size in 0usize..128,
    ) {
        if let Ok(out) = rle::decode(&src, size) {
            prop_assert_eq!(out.len(), size);
        }
    }

    /// Decoding a naively encoded stream reproduces the input bytes.
    #[test]
    fn naive_encode_decodes_back(data in proptest::collection::vec(any::<u8>(), 1..48)) {
        let encoded = encode_naive(&data);
        let decoded = rle::decode(&encoded, data.len()).unwrap();
        prop_assert_eq!(decoded, data);
    }

    /// A pure fill stream expands to the run length.
    #[test]
    fn fill_run_expands(code_half in 0u8..128, fill in any::<u8>()) {
        let code = (code_half << 1) | 1;
        let run = (code >> 1) as usize + 1;
        let out = rle::decode(&[code, fill], run).unwrap();
        prop_assert_eq!(out, vec![fill; run]);
    }
}
