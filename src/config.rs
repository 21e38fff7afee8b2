// Runtime configuration for the hybrid compressor.
//
// All knobs here are policy, not correctness: the codec round-trips
// identically for any setting.  The preference margin in particular is a
// tunable trade-off between envelope size and fast-path availability and is
// deliberately exposed rather than hard-coded.

/// Messages below this byte length are stored uncompressed (0xFF envelope);
/// header overhead dominates any possible savings at this size.
pub const MIN_COMPRESSION_SIZE_DEFAULT: usize = 50;

/// Default preference margin: the advanced codec is chosen over a smaller
/// fallback envelope as long as it is within this fraction of the best size.
/// A negative margin forces the advanced codec whenever it is available.
pub const PREFERENCE_MARGIN_DEFAULT: f64 = 0.05;

/// Default zstd compression level for the general-purpose fallback path.
pub const ZSTD_LEVEL_DEFAULT: i32 = 3;

/// Runtime configuration for [`crate::HybridCompressor`].
#[derive(Debug, Clone, Copy)]
pub struct CompressorConfig {
    /// Skip compression entirely for messages shorter than this.
    pub min_compression_size: usize,
    /// Fractional margin by which the advanced codec may lose to the best
    /// candidate and still be selected (metadata side-channel is worth a
    /// few bytes).  Negative = always prefer the advanced codec.
    pub preference_margin: f64,
    /// Evaluate the advanced (dictionary + LZ77 + rANS) candidate.
    pub enable_brio: bool,
    /// Evaluate the Lite (token model without entropy coding) candidate.
    pub enable_lite: bool,
    /// Compression level handed to the zstd fallback encoder.
    pub zstd_level: i32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            min_compression_size: MIN_COMPRESSION_SIZE_DEFAULT,
            preference_margin: PREFERENCE_MARGIN_DEFAULT,
            enable_brio: true,
            enable_lite: true,
            zstd_level: ZSTD_LEVEL_DEFAULT,
        }
    }
}
