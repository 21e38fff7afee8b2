//! Envelope codecs: advanced (dictionary + LZ77 + rANS + templates), Lite
//! (same token model without entropy coding), and template-binary bodies.

pub mod binary;
pub mod decoder;
pub mod encoder;
pub mod lite;
pub mod types;

// Re-export the most important public API items at the module level.
pub use binary::{decode_template_binary, encode_template_binary};
pub use decoder::{BrioDecoder, BrioDecompressed};
pub use encoder::{BrioCompressed, BrioEncoder};
pub use lite::{LiteDecoded, LiteDecoder, LiteEncoded, LiteEncoder};
pub use types::{
    parse_tokens, serialize_tokens, MetadataEntry, MetadataKind, Token, FLAG_SERVER_ONLY,
    FREQ_TABLE_LEN, HEADER_LEN, MAGIC, MAX_CHUNK, METADATA_ENTRY_LEN, MIN_PHRASE_LEN, VERSION,
};
