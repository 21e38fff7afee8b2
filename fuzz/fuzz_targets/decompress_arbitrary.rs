#![no_main]
use libfuzzer_sys::fuzz_target;

use brio::{HybridCompressor, MetadataExtractor};

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes through the decoder and the metadata extractor.
    // Err results are expected and fine; what we verify is no panics.
    let compressor = HybridCompressor::new();
    let _ = compressor.decompress(data);
    let _ = MetadataExtractor::extract(data);
});
