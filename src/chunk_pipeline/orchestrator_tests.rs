use crate::chunk_pipeline::models::{ChunkBody, Record};
use crate::chunk_pipeline::orchestrator::{
    decode_record, encode_text, validate_input, validate_record,
};
use crate::config::{CodecConfig, OptimizationLevel};
use crate::error::SjzipError;
use crate::kernels::rotation::DeltaStep;
use crate::space::Alphabet;
use rand::Rng;

// Test Helpers
fn small_chunks() -> CodecConfig {
    CodecConfig {
        chunk_size: 10,
        ..CodecConfig::default()
    }
}

/// Random text drawn uniformly from the alphabet.
fn random_text(len: usize) -> String {
    let chars = Alphabet::global().chars();
    let mut rng = rand::rng();
    (0..len)
        .map(|_| chars[rng.random_range(0..chars.len())])
        .collect()
}

fn roundtrip(text: &str, level: OptimizationLevel, config: &CodecConfig) -> Record {
    let record = encode_text(text, level, config, None).unwrap();
    let decoded = decode_record(&record, config, None).unwrap();
    assert_eq!(decoded, text, "round trip failed at level {}", level);
    record
}

#[test]
fn test_roundtrip_random_text_all_levels() {
    let config = small_chunks();
    for _ in 0..5 {
        let text = random_text(237);
        for level in OptimizationLevel::ALL {
            roundtrip(&text, level, &config);
        }
    }
}

#[test]
fn test_chunk_lengths_follow_chunk_size() {
    let text = random_text(95);
    let record = roundtrip(&text, OptimizationLevel::Quantized, &small_chunks());
    let lengths: Vec<u16> = record.chunks.iter().map(|c| c.length).collect();
    assert_eq!(lengths.len(), 10);
    assert!(lengths[..9].iter().all(|&l| l == 10));
    assert_eq!(lengths[9], 5);
    assert_eq!(record.original_length(), 95);
}

#[test]
fn test_body_variant_matches_level() {
    for level in OptimizationLevel::ALL {
        let record = roundtrip("abcabc가가가", level, &small_chunks());
        for chunk in &record.chunks {
            assert_eq!(chunk.body.level(), level);
            assert_eq!(chunk.body.len(), chunk.length as usize);
        }
    }
}

#[test]
fn test_repeated_characters_become_identity_deltas() {
    let record = roundtrip("aaaaaaaaaa", OptimizationLevel::RotationDelta, &small_chunks());
    let ChunkBody::RotationDelta { steps, .. } = &record.chunks[0].body else {
        panic!("expected a rotation delta body");
    };
    assert!(matches!(steps[0], DeltaStep::Absolute(_)));
    assert!(steps[1..].iter().all(|s| matches!(s, DeltaStep::Delta(_))));
}

#[test]
fn test_decode_ignores_caller_geometry() {
    let encode_config = CodecConfig {
        quantizer_bits: 20,
        curve_order: 12,
        ..small_chunks()
    };
    let text = random_text(40);
    let record = encode_text(&text, OptimizationLevel::RotationDelta, &encode_config, None).unwrap();
    assert_eq!(record.header.geometry, encode_config.geometry());

    // Decoding with the default geometry still uses the header's.
    let decoded = decode_record(&record, &CodecConfig::default(), None).unwrap();
    assert_eq!(decoded, text);
}

#[test]
fn test_validate_input_counts_characters() {
    assert_eq!(validate_input("가나다", 500).unwrap(), 3);
    assert_eq!(validate_input("", 500).unwrap(), 0);
    assert!(matches!(
        validate_input("ok\u{00A0}", 500),
        Err(SjzipError::UnsupportedCharacter { position: 2, .. })
    ));
}

#[test]
fn test_validate_record_rejects_bad_structure() {
    let config = small_chunks();
    let good = encode_text(&random_text(25), OptimizationLevel::Mapping, &config, None).unwrap();
    assert!(validate_record(&good).is_ok());

    // A short chunk that is not the last one.
    let mut short_middle = good.clone();
    short_middle.chunks.swap(1, 2);
    assert!(matches!(
        validate_record(&short_middle),
        Err(SjzipError::RecordFormat(_))
    ));

    // Body stored at a different level than the header declares.
    let mut wrong_level = good.clone();
    wrong_level.header.level = OptimizationLevel::Quantized;
    assert!(matches!(
        validate_record(&wrong_level),
        Err(SjzipError::RecordFormat(_))
    ));

    // Unsupported version.
    let mut wrong_version = good.clone();
    wrong_version.header.version = 99;
    assert!(validate_record(&wrong_version).is_err());

    // Zero chunk size.
    let mut zero = good;
    zero.header.chunk_size = 0;
    assert!(validate_record(&zero).is_err());
}

#[test]
fn test_payload_length_mismatch_is_a_stage_error() {
    let mut record = encode_text("hello", OptimizationLevel::Mapping, &small_chunks(), None).unwrap();
    if let ChunkBody::Absolute(points) = &mut record.chunks[0].body {
        points.pop();
    }
    let err = decode_record(&record, &small_chunks(), None).unwrap_err();
    assert!(matches!(err.root(), SjzipError::RecordFormat(_)));
}

#[test]
fn test_reencoding_decoded_text_reproduces_delta_steps() {
    let config = small_chunks();
    let text = format!("{}aaaa가가{}", random_text(63), random_text(30));
    let first = encode_text(&text, OptimizationLevel::RotationDelta, &config, None).unwrap();
    let decoded = decode_record(&first, &config, None).unwrap();
    let second = encode_text(&decoded, OptimizationLevel::RotationDelta, &config, None).unwrap();

    assert_eq!(first.chunks.len(), second.chunks.len());
    for (a, b) in first.chunks.iter().zip(&second.chunks) {
        let (ChunkBody::RotationDelta { steps: left, .. }, ChunkBody::RotationDelta { steps: right, .. }) =
            (&a.body, &b.body)
        else {
            panic!("expected rotation delta bodies");
        };
        assert_eq!(left, right);
    }
}
