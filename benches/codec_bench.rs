// In sjzip-core/benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

use sjzip::{Codec, CodecConfig, OptimizationLevel, Record};

// --- Mock Data Generation ---

/// Repetitive prose: long runs of identical characters and short words.
fn generate_low_entropy_text(chars: usize) -> String {
    "the cat sat on the mat. 안녕하세요. "
        .chars()
        .cycle()
        .take(chars)
        .collect()
}

/// Walks the whole alphabet so every front is exercised.
fn generate_high_entropy_text(chars: usize) -> String {
    let alphabet: Vec<char> = sjzip::space::Alphabet::global().chars().to_vec();
    (0..chars)
        .map(|i| alphabet[(i * 7919) % alphabet.len()])
        .collect()
}

// --- Benchmark Suite ---

const BENCH_CHARS: usize = 50_000;

fn bench_levels(c: &mut Criterion) {
    let codec = Codec::new(Arc::new(CodecConfig::default())).unwrap();
    let inputs = [
        ("Low Entropy", generate_low_entropy_text(BENCH_CHARS)),
        ("High Entropy", generate_high_entropy_text(BENCH_CHARS)),
    ];

    let mut group = c.benchmark_group("Codec Levels");
    group.throughput(Throughput::Elements(BENCH_CHARS as u64));
    group.sample_size(20);

    for (label, text) in &inputs {
        for level in OptimizationLevel::ALL {
            group.bench_function(format!("Encode L{} ({})", level.as_u8(), label), |b| {
                b.iter(|| black_box(codec.encode_at(black_box(text), level)))
            });

            let bytes = codec.encode_at(text, level).unwrap().to_bytes().unwrap();
            group.bench_function(format!("Decode L{} ({})", level.as_u8(), label), |b| {
                b.iter(|| black_box(codec.decode_from_bytes(black_box(&bytes))))
            });
        }
    }
    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let text = generate_low_entropy_text(BENCH_CHARS);
    let record = sjzip::encode(&text, OptimizationLevel::RotationDelta).unwrap();
    let bytes = record.to_bytes().unwrap();

    let mut group = c.benchmark_group("Record Artifact");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("to_bytes", |b| b.iter(|| black_box(record.to_bytes())));
    group.bench_function("from_bytes", |b| {
        b.iter(|| black_box(Record::from_bytes(black_box(&bytes))))
    });
    group.bench_function("peek_info", |b| {
        b.iter(|| black_box(Record::peek_info(black_box(&bytes))))
    });
    group.finish();
}

criterion_group!(benches, bench_levels, bench_serialization);
criterion_main!(benches);
