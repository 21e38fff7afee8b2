//! Advanced-codec decoder: exact inverse of the encoder.
//!
//! `PARSE_HEADER → ENTROPY_DECODE → DESERIALIZE_TOKENS → REPLAY → DONE`;
//! linear, no branching back.  Every validation failure aborts the whole
//! decode with no partial output.

use crate::dict;
use crate::error::DecodeError;
use crate::lz77::Window;
use crate::rans;
use crate::template::TemplateLibrary;

use super::types::{
    parse_tokens, MetadataEntry, Token, FREQ_TABLE_LEN, HEADER_LEN, MAGIC, METADATA_ENTRY_LEN,
    VERSION,
};

/// Output of one advanced-codec decode.
#[derive(Debug, Clone)]
pub struct BrioDecompressed {
    pub text: String,
    pub tokens: Vec<Token>,
    pub metadata: Vec<MetadataEntry>,
}

/// Decoder over a shared template library.
pub struct BrioDecoder<'a> {
    templates: &'a TemplateLibrary,
}

impl<'a> BrioDecoder<'a> {
    pub fn new(templates: &'a TemplateLibrary) -> Self {
        Self { templates }
    }

    /// Decode an advanced-codec envelope body (without the method byte).
    pub fn decompress(&self, payload: &[u8]) -> Result<BrioDecompressed, DecodeError> {
        if payload.len() < HEADER_LEN {
            return Err(DecodeError::Truncated("envelope header"));
        }
        if &payload[..4] != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        if payload[4] != VERSION {
            return Err(DecodeError::UnsupportedVersion(payload[4]));
        }

        let token_len = u32::from_be_bytes([payload[5], payload[6], payload[7], payload[8]]) as usize;
        let entropy_len =
            u32::from_be_bytes([payload[9], payload[10], payload[11], payload[12]]) as usize;
        let metadata_count = u16::from_be_bytes([payload[13], payload[14]]) as usize;

        let freq_start = HEADER_LEN;
        let freq_end = freq_start + FREQ_TABLE_LEN;
        if payload.len() < freq_end {
            return Err(DecodeError::Truncated("frequency table"));
        }
        let mut freqs = [0u32; 256];
        for (i, slot) in freqs.iter_mut().enumerate() {
            let off = freq_start + i * 2;
            *slot = u16::from_be_bytes([payload[off], payload[off + 1]]) as u32;
        }
        let sum: u32 = freqs.iter().sum();
        if sum != rans::SCALE {
            return Err(DecodeError::FrequencyTableCorrupt(sum, rans::SCALE));
        }

        let metadata_end = freq_end + metadata_count * METADATA_ENTRY_LEN;
        if payload.len() < metadata_end {
            return Err(DecodeError::Truncated("metadata table"));
        }
        let mut metadata = Vec::with_capacity(metadata_count);
        for i in 0..metadata_count {
            let off = freq_end + i * METADATA_ENTRY_LEN;
            metadata.push(MetadataEntry::from_bytes(
                &payload[off..off + METADATA_ENTRY_LEN],
            )?);
        }

        let entropy_end = metadata_end + entropy_len;
        if payload.len() < entropy_end {
            return Err(DecodeError::Truncated("entropy payload"));
        }
        let entropy = &payload[metadata_end..entropy_end];

        let cum = rans::cumulative(&freqs);
        let lookup = rans::build_symbol_lookup(&freqs, &cum);
        let plain = rans::decode(entropy, token_len, &freqs, &cum, &lookup)?;
        if plain.len() != token_len {
            return Err(DecodeError::TokenCountMismatch {
                expected: token_len,
                actual: plain.len(),
            });
        }

        let tokens = parse_tokens(&plain)?;
        let text = self.replay(&tokens)?;

        Ok(BrioDecompressed {
            text,
            tokens,
            metadata,
        })
    }

    /// Replay tokens against a fresh window, producing the original bytes.
    fn replay(&self, tokens: &[Token]) -> Result<String, DecodeError> {
        let mut window = Window::new();
        let mut out: Vec<u8> = Vec::new();

        for token in tokens {
            match token {
                Token::Literal(byte) => {
                    out.push(*byte);
                    window.push(*byte);
                }
                Token::DictionaryRef(id) => {
                    let entry =
                        dict::by_id(*id).ok_or(DecodeError::UnknownDictionaryId(*id))?;
                    out.extend_from_slice(entry.phrase_bytes());
                    window.extend(entry.phrase_bytes());
                }
                Token::Match { distance, length } => {
                    let run = window
                        .copy_match(*distance as usize, *length as usize)
                        .ok_or(DecodeError::InvalidDistance {
                            distance: *distance as usize,
                            available: window.len(),
                        })?;
                    out.extend_from_slice(&run);
                    window.extend(&run);
                }
                Token::TemplateRef { template_id, slots } => {
                    let rendered = self.templates.format_template(*template_id, slots)?;
                    out.extend_from_slice(rendered.as_bytes());
                    window.extend(rendered.as_bytes());
                }
            }
        }

        String::from_utf8(out).map_err(|_| DecodeError::InvalidUtf8)
    }
}
