#![no_main]
use libfuzzer_sys::fuzz_target;

use brio::{CompressorConfig, HybridCompressor};

fuzz_target!(|data: &[u8]| {
    // Round-trip any valid UTF-8 input through the full candidate pipeline.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let compressor = HybridCompressor::with_config(CompressorConfig {
        min_compression_size: 0,
        ..CompressorConfig::default()
    });
    let (envelope, method, _) = compressor.compress(text);
    let decoded = compressor
        .decompress(&envelope)
        .unwrap_or_else(|e| panic!("decode failed for {method:?}: {e}"));
    assert_eq!(decoded, text);
});
