//! Criterion benchmarks for the hybrid codec.
//!
//! Run with:
//!   cargo bench --bench codec

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use brio::{CompressorConfig, HybridCompressor, MetadataExtractor};

fn corpus() -> Vec<(&'static str, String)> {
    vec![
        ("template", "The capital of France is Paris.".to_string()),
        (
            "limitation",
            "I don't have access to real-time weather data. Please check weather.com".to_string(),
        ),
        (
            "free_text",
            "completely unstructured rambling with no recognizable response shape at all"
                .to_string(),
        ),
        ("repetitive", "the same sentence again and again. ".repeat(20)),
    ]
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    let compressor = HybridCompressor::with_config(CompressorConfig {
        min_compression_size: 0,
        ..CompressorConfig::default()
    });

    for (name, text) in corpus() {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("hybrid", name), &text, |b, text| {
            b.iter(|| compressor.compress(text))
        });
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    let compressor = HybridCompressor::with_config(CompressorConfig {
        min_compression_size: 0,
        ..CompressorConfig::default()
    });

    for (name, text) in corpus() {
        let (envelope, _, _) = compressor.compress(&text);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("hybrid", name), &envelope, |b, envelope| {
            b.iter(|| compressor.decompress(envelope).unwrap())
        });
    }
    group.finish();
}

fn bench_metadata_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("metadata_extract");
    let compressor = HybridCompressor::with_config(CompressorConfig {
        min_compression_size: 0,
        ..CompressorConfig::default()
    });

    for (name, text) in corpus() {
        let (envelope, _, _) = compressor.compress(&text);
        group.bench_with_input(
            BenchmarkId::new("header_only", name),
            &envelope,
            |b, envelope| b.iter(|| MetadataExtractor::extract(envelope).unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress, bench_metadata_extract);
criterion_main!(benches);
