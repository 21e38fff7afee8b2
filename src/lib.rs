//! brio: hybrid codec for short, highly templated text messages.
//!
//! The codec combines a static phrase dictionary, an LZ77 sliding-window
//! matcher, a rANS entropy coder, and parameterized template substitution
//! into a versioned binary envelope.  An inline metadata table mirrors the
//! token stream so consumers can classify, route, screen, and cache messages
//! from the header alone, without entropy decoding or window replay.

pub mod accel;
pub mod audit;
pub mod cache;
pub mod codec;
pub mod compress;
pub mod config;
pub mod dict;
pub mod error;
pub mod lz77;
pub mod metadata;
pub mod rans;
pub mod template;

// ── Version constants ─────────────────────────────────────────────────────────
pub const BRIO_VERSION_MAJOR: u32 = 0;
pub const BRIO_VERSION_MINOR: u32 = 3;
pub const BRIO_VERSION_RELEASE: u32 = 0;
pub const BRIO_VERSION_NUMBER: u32 =
    BRIO_VERSION_MAJOR * 100 * 100 + BRIO_VERSION_MINOR * 100 + BRIO_VERSION_RELEASE;
pub const BRIO_VERSION_STRING: &str = "0.3.0";

/// Returns the runtime version number.
pub fn version_number() -> u32 {
    BRIO_VERSION_NUMBER
}

/// Returns the runtime version string.
pub fn version_string() -> &'static str {
    BRIO_VERSION_STRING
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use audit::{AuditEntry, AuditSink};
pub use compress::{
    compress_batch, decompress_batch, CompressionInfo, CompressionMethod, HybridCompressor,
};
pub use config::CompressorConfig;
pub use error::{DecodeError, EncodeError};
pub use metadata::{
    ExtractedMetadata, FastPathClassifier, MetadataExtractor, MetadataRouter, SecurityScreener,
};
pub use template::{TemplateLibrary, TemplateMatch};
