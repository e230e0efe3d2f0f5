use super::*;
use crate::bridge::format::{MAX_CHUNK_COUNT, MAX_CHUNK_SIZE, MAX_TEXT_BYTES};
use crate::chunk_pipeline::artifact::{CHUNK_FRAME_SIZE, HEADER_SIZE};
use crate::chunk_pipeline::models::Record;
use crate::config::{CodecConfig, OptimizationLevel};
use crate::error::{ErrorKind, SjzipError};
use crate::space::Alphabet;
use proptest::prelude::*;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Helper to build a codec around a config tweak.
fn codec_with(config: CodecConfig) -> Codec {
    Codec::new(Arc::new(config)).unwrap()
}

fn alphabet_text() -> impl Strategy<Value = String> {
    let chars = Alphabet::global().chars().to_vec();
    prop::collection::vec(prop::sample::select(chars), 0..1_200)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_round_trip_at_every_level(text in alphabet_text()) {
        let codec = codec_with(CodecConfig { chunk_size: 97, ..CodecConfig::default() });
        for level in OptimizationLevel::ALL {
            let bytes = codec.encode_at(&text, level).unwrap().to_bytes().unwrap();
            prop_assert_eq!(codec.decode_from_bytes(&bytes).unwrap(), text.clone());
        }
    }

    #[test]
    fn prop_rotation_delta_reencoding_is_stable(text in alphabet_text()) {
        let codec = codec_with(CodecConfig { chunk_size: 97, ..CodecConfig::default() });
        let first = codec.encode_at(&text, OptimizationLevel::RotationDelta).unwrap();
        let bytes = first.to_bytes().unwrap();

        let reread = Record::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&reread, &first);

        let second = codec.encode_at(&codec.decode(&reread).unwrap(), OptimizationLevel::RotationDelta).unwrap();
        prop_assert_eq!(&second, &first);
        prop_assert_eq!(second.to_bytes().unwrap(), bytes);
    }
}

#[test]
fn test_hello_world_at_level_zero() {
    let record = encode("Hello, World!", OptimizationLevel::Mapping).unwrap();
    assert_eq!(record.chunk_count(), 1);
    assert_eq!(record.original_length(), 13);
    assert_eq!(decode(&record).unwrap(), "Hello, World!");
}

#[test]
fn test_empty_text_yields_empty_record() {
    let record = encode("", OptimizationLevel::RotationDelta).unwrap();
    assert_eq!(record.chunk_count(), 0);
    assert_eq!(record.original_length(), 0);
    assert_eq!(decode(&record).unwrap(), "");
}

#[test]
fn test_every_alphabet_character_round_trips() {
    let text: String = Alphabet::global().chars().iter().collect();
    for level in OptimizationLevel::ALL {
        let bytes = encode_to_bytes(&text, level).unwrap();
        assert_eq!(decode_from_bytes(&bytes).unwrap(), text, "level {}", level);
    }
}

#[test]
fn test_encoding_is_deterministic() {
    let text = "안녕하세요 \u{201C}sjzip\u{201D} — ".repeat(60);
    for level in OptimizationLevel::ALL {
        let a = encode_to_bytes(&text, level).unwrap();
        let b = encode_to_bytes(&text, level).unwrap();
        assert_eq!(a, b, "level {}", level);
    }
}

#[test]
fn test_parallel_and_sequential_produce_identical_bytes() {
    let text = "abcdefghij".repeat(700);
    let parallel = codec_with(CodecConfig {
        chunk_size: 50,
        parallel: true,
        parallel_threshold: 1,
        ..CodecConfig::default()
    });
    let sequential = codec_with(CodecConfig {
        chunk_size: 50,
        parallel: false,
        ..CodecConfig::default()
    });
    let a = parallel.encode_to_bytes(&text).unwrap();
    let b = sequential.encode_to_bytes(&text).unwrap();
    assert_eq!(a, b);
    assert_eq!(sequential.decode_from_bytes(&a).unwrap(), text);
}

#[test]
fn test_input_one_byte_over_the_limit_is_rejected() {
    let text = "a".repeat(MAX_TEXT_BYTES + 1);
    let err = encode(&text, OptimizationLevel::Mapping).unwrap_err();
    assert!(matches!(err, SjzipError::InputTooLarge { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_too_many_chunks_is_rejected() {
    let codec = codec_with(CodecConfig {
        chunk_size: 1,
        ..CodecConfig::default()
    });
    let text = "a".repeat(MAX_CHUNK_COUNT + 1);
    let err = codec.encode(&text).unwrap_err();
    assert!(matches!(
        err,
        SjzipError::TooManyChunks {
            count: 100_001,
            max: 100_000
        }
    ));
}

#[test]
fn test_oversized_chunk_is_rejected() {
    let chunk = "a".repeat(MAX_CHUNK_SIZE + 1);
    assert!(matches!(
        crate::dot::encode_chunk(&chunk),
        Err(SjzipError::ChunkTooLarge { len: 501, max: 500 })
    ));

    let config = CodecConfig {
        chunk_size: MAX_CHUNK_SIZE + 1,
        ..CodecConfig::default()
    };
    assert!(matches!(
        Codec::new(Arc::new(config)),
        Err(SjzipError::InvalidConfig(_))
    ));
}

#[test]
fn test_unsupported_character_reports_position() {
    let err = encode("abc€def", OptimizationLevel::Quantized).unwrap_err();
    match err {
        SjzipError::UnsupportedCharacter { ch, position } => {
            assert_eq!(ch, '€');
            assert_eq!(position, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_codec_uses_default_level_from_json_config() {
    let config = CodecConfig::from_json_str(r#"{"chunk_size": 64, "default_level": 1}"#).unwrap();
    let codec = codec_with(config);
    let record = codec.encode("level one please").unwrap();
    assert_eq!(record.level(), OptimizationLevel::CurveOrdered);
    assert_eq!(record.header.chunk_size, 64);
    assert_eq!(codec.decode(&record).unwrap(), "level one please");
}

#[test]
fn test_preset_cancel_flag_returns_no_output() {
    let flag = Arc::new(AtomicBool::new(true));
    let codec = Codec::default().with_cancel_flag(flag);
    let err = codec.encode("cancel me").unwrap_err();
    assert!(matches!(err, SjzipError::Cancelled { completed: 0, total: 1 }));
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[test]
fn test_corrupted_point_fails_with_a_mapping_error() {
    let mut bytes = encode_to_bytes("xyz", OptimizationLevel::Mapping).unwrap();
    // The spiral never passes through the centre of the cube.
    let first_point = HEADER_SIZE + CHUNK_FRAME_SIZE;
    for axis in 0..3 {
        let at = first_point + axis * 8;
        bytes[at..at + 8].copy_from_slice(&0.5f64.to_le_bytes());
    }
    let err = decode_from_bytes(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mapping);
    assert!(matches!(err, SjzipError::StageError { chunk: 0, .. }));
}

#[test]
fn test_record_with_mismatched_length_is_rejected() {
    let mut record: Record = encode("abcdef", OptimizationLevel::Quantized).unwrap();
    record.header.original_length = 7;
    let err = decode(&record).unwrap_err();
    assert!(matches!(err, SjzipError::RecordFormat(_)));
}

#[test]
fn test_analyze_reports_ratio_above_one_for_short_text() {
    let text = "hi";
    let bytes = encode_to_bytes(text, OptimizationLevel::Mapping).unwrap();
    let stats = Codec::default().analyze(&bytes, Some(text.len())).unwrap();
    assert!(stats.ratio.unwrap() > 1.0);
    assert_eq!(stats.bodies[0].level, OptimizationLevel::Mapping);
}
