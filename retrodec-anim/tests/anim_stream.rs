//! End-to-end decoding of a synthetic animation stream.
//!
//! Builds an ANIM container with the kernel's writer, indexes it back, and
//! feeds the video and audio payloads to their decoders.

use retrodec_anim::{tags, Codec37Decoder, FrameHeader, PcmFormat, SoundHeader};
use retrodec_container::{element, Indexer, ScanConfig, Schema};
use retrodec_container::{ChunkWriter, FourCC};

fn video_payload(opcode: u8, seq: u16, decoded_size: u32, pixels: &[u8]) -> Vec<u8> {
    let mut payload = FrameHeader {
        opcode,
        table_index: 0,
        seq,
        decoded_size,
        mask_flags: 0,
    }
    .to_bytes();
    payload.extend_from_slice(pixels);
    payload
}

fn anim_schema() -> Schema {
    Schema::from_entries([
        (tags::ANIM, vec![tags::AHDR, tags::FRME]),
        (tags::FRME, vec![tags::FOBJ, tags::PSAD]),
        (tags::AHDR, vec![]),
        (tags::FOBJ, vec![]),
        (tags::PSAD, vec![]),
    ])
}

fn build_stream() -> Vec<u8> {
    let config = ScanConfig::stream();

    // Frame 0: a full video frame plus one audio chunk.
    let sound = SoundHeader {
        track_id: 1,
        index: 0,
        max_frames: 2,
        flags: 0,
        volume: 255,
        pan: 128,
    };
    let mut sound_payload = sound.to_bytes();
    sound_payload.extend_from_slice(&[128, 255, 0, 128]);

    let mut frame0 = ChunkWriter::new(Vec::new(), config);
    frame0
        .put(tags::FOBJ, &video_payload(0, 0, 64, &[0x10; 64]))
        .unwrap();
    frame0.put(tags::PSAD, &sound_payload).unwrap();

    // Frame 1: a continuation frame, co-located motion only.
    let mut frame1 = ChunkWriter::new(Vec::new(), config);
    frame1
        .put(tags::FOBJ, &video_payload(3, 1, 64, &[0, 0, 0, 0]))
        .unwrap();

    let mut body = ChunkWriter::new(Vec::new(), config);
    body.put(tags::AHDR, &[2, 0]).unwrap();
    body.put(tags::FRME, &frame0.into_inner()).unwrap();
    body.put(tags::FRME, &frame1.into_inner()).unwrap();

    let mut root = ChunkWriter::new(Vec::new(), config);
    root.put(tags::ANIM, &body.into_inner()).unwrap();
    root.into_inner()
}

#[test]
fn decode_stream_end_to_end() {
    let buf = build_stream();
    let schema = anim_schema();
    let roots = Indexer::new(&schema, ScanConfig::stream())
        .index(&buf, None)
        .unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].tag(), tags::ANIM);

    let mut decoder = Codec37Decoder::new(8, 8).unwrap();
    let mut frames = Vec::new();
    for frme in roots[0].children.iter().filter(|e| e.tag() == tags::FRME) {
        for fobj in frme.children.iter().filter(|e| e.tag() == tags::FOBJ) {
            frames.push(decoder.decode_frame(fobj.chunk.slice()).unwrap());
        }
    }

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].data, vec![0x10; 64]);
    // The continuation frame motion-copies the first frame.
    assert_eq!(frames[1].data, vec![0x10; 64]);
}

#[test]
fn audio_chunk_roundtrip() {
    let buf = build_stream();
    let schema = anim_schema();
    let roots = Indexer::new(&schema, ScanConfig::stream())
        .index(&buf, None)
        .unwrap();

    let psad = element::find_path(&roots, "ANIM/FRME/PSAD").unwrap();
    let (header, pcm) = SoundHeader::parse(psad.chunk.slice()).unwrap();
    assert_eq!(header.track_id, 1);
    assert_eq!(header.max_frames, 2);
    assert_eq!(header.format(), PcmFormat::U8);

    let samples = retrodec_anim::sound::pcm_to_i16(header.format(), pcm).unwrap();
    assert_eq!(samples, vec![0, 32512, -32768, 0]);
}

#[test]
fn inferred_schema_matches_declared() {
    let buf = build_stream();
    let inferred =
        retrodec_container::infer_schema(&buf, ScanConfig::stream(), Schema::new()).unwrap();

    // Every declared relationship must be discovered.
    let declared = anim_schema();
    for parent in declared.tags() {
        for child in declared.children(parent).unwrap() {
            assert!(
                inferred
                    .children(parent)
                    .is_some_and(|set| set.contains(child)),
                "missing {parent} -> {child}"
            );
        }
    }
}

#[test]
fn tags_are_distinct() {
    let all = [
        tags::ANIM,
        tags::AHDR,
        tags::FRME,
        tags::FOBJ,
        tags::PSAD,
        tags::SAUD,
        tags::SDAT,
    ];
    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            assert_ne!(a, b);
        }
    }
    let _ = FourCC::new(*b"ANIM");
}
