//! Criterion benchmarks for transcript ingestion

use std::hint::black_box;
use std::path::PathBuf;

use costlens::parsers::SessionLogParser;
use costlens::services::{dedup_entries, price_entries, PricingTable};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn bench_parse_file(c: &mut Criterion) {
    let parser = SessionLogParser::with_data_dir(fixture_dir());
    let file = fixture_dir().join("session-sample.jsonl");
    let file_size = std::fs::metadata(&file).map(|m| m.len()).unwrap_or(0);

    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(file_size));
    group.bench_function("parse_file", |b| {
        b.iter(|| parser.parse_file(black_box(&file)));
    });
    group.finish();
}

fn bench_parse_line(c: &mut Criterion) {
    let sample_line = br#"{"type":"assistant","sessionId":"s1","timestamp":"2025-01-26T10:00:00Z","cwd":"/home/dev/alpha","message":{"id":"m1","model":"claude-sonnet-4-20250514","usage":{"input_tokens":100,"output_tokens":50,"cache_creation_input_tokens":10,"cache_read_input_tokens":20}}}"#;

    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Bytes(sample_line.len() as u64));
    group.bench_function("parse_line", |b| {
        b.iter(|| {
            let mut line_copy = sample_line.to_vec();
            let _: Result<serde_json::Value, _> = simd_json::from_slice(black_box(&mut line_copy));
        });
    });
    group.finish();
}

fn bench_full_pipeline(c: &mut Criterion) {
    let parser = SessionLogParser::with_data_dir(fixture_dir());

    let mut group = c.benchmark_group("pipeline");
    group.bench_function("parse_dedup_price", |b| {
        b.iter(|| {
            let parsed = parser.parse_all();
            let deduped = dedup_entries(black_box(parsed));
            price_entries(deduped, PricingTable::global())
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_file,
    bench_parse_line,
    bench_full_pipeline
);
criterion_main!(benches);
