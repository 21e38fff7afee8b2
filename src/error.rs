//! Error taxonomy for encode and decode paths.
//!
//! Decode errors are always fatal for the single call that raised them; no
//! partial output is ever produced.  Encode errors are only reachable for a
//! single *candidate* inside [`crate::HybridCompressor::compress`], which
//! drops the failing candidate and continues; the general-purpose fallback
//! keeps the overall call infallible for well-formed text.

use thiserror::Error;

/// Errors raised while decoding a compressed envelope.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Envelope body does not start with the expected magic bytes.
    #[error("invalid payload: missing magic bytes")]
    BadMagic,

    /// Envelope carries a format version this build cannot read.
    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(u8),

    /// Header or payload ended before the advertised field could be read.
    #[error("truncated payload: {0}")]
    Truncated(&'static str),

    /// Entropy decode produced fewer token bytes than the header promised.
    #[error("token count mismatch: expected {expected}, decoded {actual}")]
    TokenCountMismatch { expected: usize, actual: usize },

    /// An LZ77 back-reference points before the start of the replay window.
    #[error("match distance {distance} exceeds {available} bytes of history")]
    InvalidDistance { distance: usize, available: usize },

    /// Token stream references a dictionary id that is not in the table.
    #[error("unknown dictionary entry id: {0}")]
    UnknownDictionaryId(u16),

    /// Template id never registered on this side: the expected failure mode
    /// when encoder and decoder template stores drift; distinct from
    /// corruption by design of the taxonomy.
    #[error("unknown template id: {0} (template store out of sync?)")]
    UnknownTemplate(u16),

    /// The envelope's method byte is not one this build knows.
    #[error("unknown compression method: {0:#04x}")]
    UnknownMethod(u8),

    /// A token tag byte outside the closed token set.
    #[error("unknown token tag: {0:#04x}")]
    UnknownTokenTag(u8),

    /// Replayed output (or a template slot) is not valid UTF-8.
    #[error("decoded payload is not valid UTF-8")]
    InvalidUtf8,

    /// Stored frequency table does not sum to the rANS scale.
    #[error("frequency table sums to {0}, expected {1}")]
    FrequencyTableCorrupt(u32, u32),

    /// General-purpose fallback frame failed to decode.
    #[error("fallback frame error: {0}")]
    FallbackFrame(String),
}

/// Errors raised while building a single compression candidate or mutating
/// the template registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// A template slot or literal exceeds its length field's capacity.
    #[error("slot of {0} bytes exceeds the 65535-byte field limit")]
    SlotTooLong(usize),

    /// More slots than the 1-byte slot count can express.
    #[error("{0} slots exceed the 255-slot limit")]
    TooManySlots(usize),

    /// Template id does not fit the 1-byte wire field.
    #[error("template id {0} does not fit the wire format")]
    TemplateIdOutOfRange(u16),

    /// A reserved id range has no free slots left.
    #[error("{0} template id range exhausted")]
    RangeExhausted(&'static str),

    /// Pattern failed to compile into a matcher.
    #[error("invalid template pattern: {0}")]
    InvalidPattern(String),
}
