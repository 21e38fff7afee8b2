//! Advanced-codec encoder: dictionary + LZ77 + rANS + template tokens.
//!
//! Encode pipeline per message (linear, no partial commits):
//! `TOKENIZE → SERIALIZE → ENTROPY_ENCODE → DONE`.  Any stage failure
//! aborts the whole message with no output.

use tracing::trace;

use crate::dict;
use crate::error::EncodeError;
use crate::lz77::{self, LzToken, Window, MAX_MATCH};
use crate::rans;
use crate::template::{TemplateLibrary, TemplateMatch};

use super::types::{
    serialize_tokens, MetadataEntry, MetadataKind, Token, FLAG_SERVER_ONLY, FREQ_TABLE_LEN,
    HEADER_LEN, MAGIC, MAX_CHUNK, METADATA_ENTRY_LEN, MIN_PHRASE_LEN, VERSION,
};

/// Output of one advanced-codec encode.
#[derive(Debug, Clone)]
pub struct BrioCompressed {
    /// Envelope body (header + entropy payload), without the method byte.
    pub payload: Vec<u8>,
    pub tokens: Vec<Token>,
    pub metadata: Vec<MetadataEntry>,
}

/// Encoder over a shared template library.
pub struct BrioEncoder<'a> {
    templates: &'a TemplateLibrary,
}

impl<'a> BrioEncoder<'a> {
    pub fn new(templates: &'a TemplateLibrary) -> Self {
        Self { templates }
    }

    /// Compress `text`, optionally short-circuiting through a pre-verified
    /// whole-message template match.
    pub fn compress(
        &self,
        text: &str,
        template_match: Option<&TemplateMatch>,
    ) -> Result<BrioCompressed, EncodeError> {
        let (tokens, metadata) = match template_match {
            Some(m) => {
                let tokens = vec![Token::TemplateRef {
                    template_id: m.template_id,
                    slots: m.slots.clone(),
                }];
                let metadata = vec![MetadataEntry {
                    token_index: 0,
                    kind: MetadataKind::Template,
                    value: m.template_id,
                    flags: (m.slots.len().max(1) as u8).min(0x7F),
                }];
                (tokens, metadata)
            }
            None => self.tokenise(text),
        };

        let plain = serialize_tokens(&tokens)?;
        let freqs = rans::normalise(&rans::build_frequencies(&plain));
        let cum = rans::cumulative(&freqs);
        let entropy = rans::encode(&plain, &freqs, &cum);
        trace!(
            tokens = tokens.len(),
            plain_len = plain.len(),
            entropy_len = entropy.len(),
            "brio encode"
        );

        let mut payload = Vec::with_capacity(
            HEADER_LEN + FREQ_TABLE_LEN + metadata.len() * METADATA_ENTRY_LEN + entropy.len(),
        );
        payload.extend_from_slice(MAGIC);
        payload.push(VERSION);
        payload.extend_from_slice(&(plain.len() as u32).to_be_bytes());
        payload.extend_from_slice(&(entropy.len() as u32).to_be_bytes());
        payload.extend_from_slice(&(metadata.len() as u16).to_be_bytes());
        for f in freqs.iter() {
            payload.extend_from_slice(&(*f as u16).to_be_bytes());
        }
        for entry in &metadata {
            payload.extend_from_slice(&entry.to_bytes());
        }
        payload.extend_from_slice(&entropy);

        Ok(BrioCompressed {
            payload,
            tokens,
            metadata,
        })
    }

    /// Scan `text` into dictionary / LZ77 tokens with one metadata entry
    /// per token.
    fn tokenise(&self, text: &str) -> (Vec<Token>, Vec<MetadataEntry>) {
        let data = text.as_bytes();
        let mut tokens = Vec::new();
        let mut metadata = Vec::new();
        let mut window = Window::new();
        let mut pos = 0usize;

        while pos < data.len() {
            let entry = dict::longest_prefix_match_bytes(data, pos)
                .filter(|e| (MIN_PHRASE_LEN..MAX_MATCH).contains(&e.phrase_bytes().len()));

            if let Some(entry) = entry {
                tokens.push(Token::DictionaryRef(entry.id));
                metadata.push(MetadataEntry {
                    token_index: (tokens.len() - 1) as u16,
                    kind: MetadataKind::Dictionary,
                    value: entry.id,
                    flags: FLAG_SERVER_ONLY,
                });
                window.extend(entry.phrase_bytes());
                pos += entry.phrase_bytes().len();
                continue;
            }

            // Collect a bounded chunk up to the next dictionary hit.
            let chunk_start = pos;
            pos += 1;
            while pos < data.len()
                && pos - chunk_start < MAX_CHUNK
                && dict::longest_prefix_match_bytes(data, pos)
                    .filter(|e| e.phrase_bytes().len() >= MIN_PHRASE_LEN)
                    .is_none()
            {
                pos += 1;
            }

            let chunk = &data[chunk_start..pos];
            for lz_token in lz77::tokenize(chunk, &window) {
                match lz_token {
                    LzToken::Literal(byte) => {
                        tokens.push(Token::Literal(byte));
                        metadata.push(MetadataEntry {
                            token_index: (tokens.len() - 1) as u16,
                            kind: MetadataKind::Literal,
                            value: byte as u16,
                            flags: FLAG_SERVER_ONLY,
                        });
                        window.push(byte);
                    }
                    LzToken::Match { distance, length } => {
                        tokens.push(Token::Match { distance, length });
                        metadata.push(MetadataEntry {
                            token_index: (tokens.len() - 1) as u16,
                            kind: MetadataKind::Lz77Match,
                            value: distance,
                            flags: FLAG_SERVER_ONLY,
                        });
                        let run = window
                            .copy_match(distance as usize, length as usize)
                            .expect("tokenizer emits window-covered distances");
                        window.extend(&run);
                    }
                }
            }
        }

        (tokens, metadata)
    }

    /// Shared library handle, used by the compressor for the template path.
    pub fn templates(&self) -> &TemplateLibrary {
        self.templates
    }
}
