//! Token model, metadata entries, and envelope constants.
//!
//! `Token` is a closed sum type: the serializer and the replay loop both
//! match exhaustively, so adding a token kind is a compile-time change in
//! every place that must handle it.

use crate::error::{DecodeError, EncodeError};

// ── Envelope constants (advanced codec) ──────────────────────────────────────

/// Magic bytes opening the advanced-codec body.
pub const MAGIC: &[u8; 4] = b"AURA";
/// Advanced-codec format version.
pub const VERSION: u8 = 1;
/// Fixed header length: magic + version + token_len + entropy_len + metadata_count.
pub const HEADER_LEN: usize = 4 + 1 + 4 + 4 + 2;
/// Serialized frequency table: 256 × u16 big-endian.
pub const FREQ_TABLE_LEN: usize = 512;
/// Wire size of one metadata entry.
pub const METADATA_ENTRY_LEN: usize = 6;

/// Dictionary hits shorter than this stay in the literal/LZ77 stream.
pub const MIN_PHRASE_LEN: usize = 6;
/// Longest literal chunk handed to the LZ77 tokenizer in one go.
pub const MAX_CHUNK: usize = 64;

// ── Token wire tags ──────────────────────────────────────────────────────────

pub const TAG_LITERAL: u8 = 0x00;
pub const TAG_DICT: u8 = 0x01;
pub const TAG_MATCH: u8 = 0x02;
pub const TAG_TEMPLATE: u8 = 0x03;

/// Metadata flag bit: entry is server-side bookkeeping, not client-relevant.
pub const FLAG_SERVER_ONLY: u8 = 0x80;

// ── Tokens ───────────────────────────────────────────────────────────────────

/// One unit of the encoded stream.  Created per message during encode,
/// consumed during decode, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Single raw byte.
    Literal(u8),
    /// Reference into the static phrase dictionary.
    DictionaryRef(u16),
    /// LZ77 back-reference into the sliding window.
    Match { distance: u16, length: u8 },
    /// Whole-template substitution; slots travel as UTF-8, not entropy-coded
    /// raw text.
    TemplateRef { template_id: u16, slots: Vec<String> },
}

// ── Metadata side-channel ────────────────────────────────────────────────────

/// Structural kind recorded per token in the metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MetadataKind {
    Template = 0x01,
    Lz77Match = 0x02,
    Dictionary = 0x03,
    Literal = 0x04,
    Fallback = 0x05,
}

impl MetadataKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Template),
            0x02 => Some(Self::Lz77Match),
            0x03 => Some(Self::Dictionary),
            0x04 => Some(Self::Literal),
            0x05 => Some(Self::Fallback),
            _ => None,
        }
    }
}

/// Fixed 6-byte metadata entry mirroring one token of the stream.
///
/// Wire layout: `token_index:2BE, kind:1, value:2BE, flags:1`.  `value`
/// carries the dictionary id, the clamped match distance, or the template
/// id, depending on `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataEntry {
    pub token_index: u16,
    pub kind: MetadataKind,
    pub value: u16,
    pub flags: u8,
}

impl MetadataEntry {
    pub fn to_bytes(&self) -> [u8; METADATA_ENTRY_LEN] {
        let idx = self.token_index.to_be_bytes();
        let val = self.value.to_be_bytes();
        [idx[0], idx[1], self.kind as u8, val[0], val[1], self.flags]
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < METADATA_ENTRY_LEN {
            return Err(DecodeError::Truncated("metadata entry"));
        }
        let kind = MetadataKind::from_u8(data[2]).unwrap_or(MetadataKind::Literal);
        Ok(Self {
            token_index: u16::from_be_bytes([data[0], data[1]]),
            kind,
            value: u16::from_be_bytes([data[3], data[4]]),
            flags: data[5],
        })
    }

    /// Whether the entry is flagged server-only.
    pub fn is_server_only(&self) -> bool {
        self.flags & FLAG_SERVER_ONLY != 0
    }
}

// ── Token serialization ──────────────────────────────────────────────────────

/// Serialize tokens to the tagged byte stream fed to the entropy coder.
pub fn serialize_tokens(tokens: &[Token]) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    for token in tokens {
        match token {
            Token::Literal(byte) => {
                buf.push(TAG_LITERAL);
                buf.push(*byte);
            }
            Token::DictionaryRef(id) => {
                buf.push(TAG_DICT);
                buf.push(*id as u8);
            }
            Token::Match { distance, length } => {
                buf.push(TAG_MATCH);
                buf.extend_from_slice(&distance.to_be_bytes());
                buf.push(*length);
            }
            Token::TemplateRef { template_id, slots } => {
                if *template_id > u8::MAX as u16 {
                    return Err(EncodeError::TemplateIdOutOfRange(*template_id));
                }
                if slots.len() > u8::MAX as usize {
                    return Err(EncodeError::TooManySlots(slots.len()));
                }
                buf.push(TAG_TEMPLATE);
                buf.push(*template_id as u8);
                buf.push(slots.len() as u8);
                for slot in slots {
                    let bytes = slot.as_bytes();
                    if bytes.len() > u16::MAX as usize {
                        return Err(EncodeError::SlotTooLong(bytes.len()));
                    }
                    buf.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
                    buf.extend_from_slice(bytes);
                }
            }
        }
    }
    Ok(buf)
}

/// Re-parse a tagged byte stream back into tokens.
pub fn parse_tokens(data: &[u8]) -> Result<Vec<Token>, DecodeError> {
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < data.len() {
        let tag = data[i];
        i += 1;
        match tag {
            TAG_LITERAL => {
                let byte = *data.get(i).ok_or(DecodeError::Truncated("literal token"))?;
                tokens.push(Token::Literal(byte));
                i += 1;
            }
            TAG_DICT => {
                let id = *data
                    .get(i)
                    .ok_or(DecodeError::Truncated("dictionary token"))?;
                tokens.push(Token::DictionaryRef(id as u16));
                i += 1;
            }
            TAG_MATCH => {
                if i + 3 > data.len() {
                    return Err(DecodeError::Truncated("match token"));
                }
                let distance = u16::from_be_bytes([data[i], data[i + 1]]);
                let length = data[i + 2];
                tokens.push(Token::Match { distance, length });
                i += 3;
            }
            TAG_TEMPLATE => {
                if i + 2 > data.len() {
                    return Err(DecodeError::Truncated("template token"));
                }
                let template_id = data[i] as u16;
                let slot_count = data[i + 1] as usize;
                i += 2;
                let mut slots = Vec::with_capacity(slot_count);
                for _ in 0..slot_count {
                    if i + 2 > data.len() {
                        return Err(DecodeError::Truncated("template slot header"));
                    }
                    let len = u16::from_be_bytes([data[i], data[i + 1]]) as usize;
                    i += 2;
                    if i + len > data.len() {
                        return Err(DecodeError::Truncated("template slot payload"));
                    }
                    let slot = std::str::from_utf8(&data[i..i + len])
                        .map_err(|_| DecodeError::InvalidUtf8)?
                        .to_string();
                    slots.push(slot);
                    i += len;
                }
                tokens.push(Token::TemplateRef { template_id, slots });
            }
            other => return Err(DecodeError::UnknownTokenTag(other)),
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_stream_roundtrips() {
        let tokens = vec![
            Token::Literal(b'x'),
            Token::DictionaryRef(12),
            Token::Match {
                distance: 770,
                length: 9,
            },
            Token::TemplateRef {
                template_id: 44,
                slots: vec!["capital".into(), "France".into(), "Paris".into()],
            },
        ];
        let bytes = serialize_tokens(&tokens).unwrap();
        assert_eq!(parse_tokens(&bytes).unwrap(), tokens);
    }

    #[test]
    fn oversized_slot_is_rejected() {
        let tokens = vec![Token::TemplateRef {
            template_id: 1,
            slots: vec!["s".repeat(70_000)],
        }];
        assert_eq!(
            serialize_tokens(&tokens),
            Err(EncodeError::SlotTooLong(70_000))
        );
    }

    #[test]
    fn metadata_entry_wire_roundtrip() {
        let entry = MetadataEntry {
            token_index: 3,
            kind: MetadataKind::Lz77Match,
            value: 512,
            flags: FLAG_SERVER_ONLY,
        };
        let bytes = entry.to_bytes();
        assert_eq!(MetadataEntry::from_bytes(&bytes).unwrap(), entry);
        assert!(entry.is_server_only());
    }

    #[test]
    fn truncated_template_slot_errors() {
        // template tag, id 5, one slot, claimed length 10, only 2 bytes present
        let data = [TAG_TEMPLATE, 5, 1, 0, 10, b'a', b'b'];
        assert!(matches!(
            parse_tokens(&data),
            Err(DecodeError::Truncated("template slot payload"))
        ));
    }
}
