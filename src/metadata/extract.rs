//! Header-only metadata extraction.
//!
//! `extract` reads the method byte, the fixed header fields, and the
//! metadata-entry table.  It never touches the entropy-coded bytes, so it
//! stays cheap regardless of message content.

use crate::codec::lite::{LITE_DICT, LITE_LITERAL, LITE_MAGIC_COMPACT, LITE_MAGIC_FULL, LITE_TEMPLATE};
use crate::codec::{
    MetadataEntry, MetadataKind, FREQ_TABLE_LEN, HEADER_LEN, MAGIC, METADATA_ENTRY_LEN, VERSION,
};
use crate::compress::CompressionMethod;
use crate::error::DecodeError;

/// Structural summary of an envelope, readable without decompression.
///
/// A fixed struct rather than an open key/value map: which fields are
/// present for which method is a compile-time fact.
#[derive(Debug, Clone)]
pub struct ExtractedMetadata {
    pub method: CompressionMethod,
    /// Body size excluding the method byte.
    pub compressed_size: usize,
    /// Serialized token-stream byte length (advanced and Lite bodies).
    pub token_len: Option<usize>,
    /// Entropy-payload byte length (advanced bodies only).
    pub entropy_len: Option<usize>,
    /// Token count: metadata-entry count for advanced bodies, walked token
    /// count for Lite, 1 for template-binary.
    pub token_count: Option<usize>,
    pub metadata_entries: Vec<MetadataEntry>,
    /// Template ids referenced anywhere in the stream.
    pub template_ids: Vec<u16>,
    pub has_lz77_matches: bool,
    pub has_literals: bool,
    pub has_dictionary_refs: bool,
    /// True iff at least one template id is present; template identity
    /// alone often fully determines structure.
    pub fast_path_candidate: bool,
}

impl ExtractedMetadata {
    fn bare(method: CompressionMethod, compressed_size: usize) -> Self {
        Self {
            method,
            compressed_size,
            token_len: None,
            entropy_len: None,
            token_count: None,
            metadata_entries: Vec::new(),
            template_ids: Vec::new(),
            has_lz77_matches: false,
            has_literals: false,
            has_dictionary_refs: false,
            fast_path_candidate: false,
        }
    }
}

/// Stateless extractor over envelope bytes.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract the structural summary of `envelope`.
    pub fn extract(envelope: &[u8]) -> Result<ExtractedMetadata, DecodeError> {
        let (&method_byte, payload) = envelope
            .split_first()
            .ok_or(DecodeError::Truncated("empty envelope"))?;
        let method = CompressionMethod::from_u8(method_byte)
            .ok_or(DecodeError::UnknownMethod(method_byte))?;

        match method {
            CompressionMethod::TemplateBinary => Self::extract_template_binary(payload),
            CompressionMethod::Brio => Self::extract_brio(payload),
            CompressionMethod::Lite => Self::extract_lite(payload),
            CompressionMethod::Fallback | CompressionMethod::Uncompressed => {
                Ok(ExtractedMetadata::bare(method, payload.len()))
            }
        }
    }

    fn extract_template_binary(payload: &[u8]) -> Result<ExtractedMetadata, DecodeError> {
        if payload.len() < 2 {
            return Err(DecodeError::Truncated("template-binary header"));
        }
        let mut meta = ExtractedMetadata::bare(CompressionMethod::TemplateBinary, payload.len());
        meta.template_ids = vec![payload[0] as u16];
        meta.token_count = Some(1);
        meta.fast_path_candidate = true;
        Ok(meta)
    }

    fn extract_brio(payload: &[u8]) -> Result<ExtractedMetadata, DecodeError> {
        if payload.len() < HEADER_LEN {
            return Err(DecodeError::Truncated("envelope header"));
        }
        if &payload[..4] != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        if payload[4] != VERSION {
            return Err(DecodeError::UnsupportedVersion(payload[4]));
        }

        let token_len =
            u32::from_be_bytes([payload[5], payload[6], payload[7], payload[8]]) as usize;
        let entropy_len =
            u32::from_be_bytes([payload[9], payload[10], payload[11], payload[12]]) as usize;
        let metadata_count = u16::from_be_bytes([payload[13], payload[14]]) as usize;

        let metadata_start = HEADER_LEN + FREQ_TABLE_LEN;
        let metadata_end = metadata_start + metadata_count * METADATA_ENTRY_LEN;
        if payload.len() < metadata_end {
            return Err(DecodeError::Truncated("metadata table"));
        }

        let mut meta = ExtractedMetadata::bare(CompressionMethod::Brio, payload.len());
        meta.token_len = Some(token_len);
        meta.entropy_len = Some(entropy_len);
        meta.token_count = Some(metadata_count);

        for i in 0..metadata_count {
            let off = metadata_start + i * METADATA_ENTRY_LEN;
            let entry = MetadataEntry::from_bytes(&payload[off..off + METADATA_ENTRY_LEN])?;
            match entry.kind {
                MetadataKind::Template => meta.template_ids.push(entry.value),
                MetadataKind::Lz77Match => meta.has_lz77_matches = true,
                MetadataKind::Dictionary => meta.has_dictionary_refs = true,
                MetadataKind::Literal => meta.has_literals = true,
                MetadataKind::Fallback => {}
            }
            meta.metadata_entries.push(entry);
        }

        meta.fast_path_candidate = !meta.template_ids.is_empty();
        Ok(meta)
    }

    /// Lite bodies carry no metadata table; the token stream itself is
    /// shallow enough to walk (kind bytes and length fields only).
    fn extract_lite(payload: &[u8]) -> Result<ExtractedMetadata, DecodeError> {
        let tokens = lite_tokens(payload)?;
        let mut meta = ExtractedMetadata::bare(CompressionMethod::Lite, payload.len());
        meta.token_len = Some(tokens.len());

        let mut token_count = 0usize;
        let mut pos = 0usize;
        while pos < tokens.len() {
            let kind = tokens[pos];
            pos += 1;
            token_count += 1;
            match kind {
                LITE_TEMPLATE => {
                    if pos + 2 > tokens.len() {
                        return Err(DecodeError::Truncated("lite template token"));
                    }
                    meta.template_ids.push(tokens[pos] as u16);
                    let slot_count = tokens[pos + 1] as usize;
                    pos += 2;
                    for _ in 0..slot_count {
                        if pos + 2 > tokens.len() {
                            return Err(DecodeError::Truncated("lite slot length"));
                        }
                        let len = u16::from_be_bytes([tokens[pos], tokens[pos + 1]]) as usize;
                        pos += 2 + len;
                    }
                    if pos > tokens.len() {
                        return Err(DecodeError::Truncated("lite slot payload"));
                    }
                }
                LITE_DICT => {
                    meta.has_dictionary_refs = true;
                    pos += 1;
                }
                LITE_LITERAL => {
                    meta.has_literals = true;
                    let len = *tokens
                        .get(pos)
                        .ok_or(DecodeError::Truncated("lite literal length"))?
                        as usize;
                    pos += 1 + len;
                    if pos > tokens.len() {
                        return Err(DecodeError::Truncated("lite literal payload"));
                    }
                }
                other => return Err(DecodeError::UnknownTokenTag(other)),
            }
        }

        meta.token_count = Some(token_count);
        meta.fast_path_candidate = !meta.template_ids.is_empty();
        Ok(meta)
    }
}

fn lite_tokens(payload: &[u8]) -> Result<&[u8], DecodeError> {
    if payload.first() == Some(&LITE_MAGIC_COMPACT) {
        if payload.len() < 3 {
            return Err(DecodeError::Truncated("lite compact header"));
        }
        let token_len = payload[2] as usize;
        if payload.len() < 3 + token_len {
            return Err(DecodeError::Truncated("lite token stream"));
        }
        Ok(&payload[3..3 + token_len])
    } else if payload.len() >= 11 && &payload[..4] == LITE_MAGIC_FULL {
        let token_len =
            u32::from_be_bytes([payload[6], payload[7], payload[8], payload[9]]) as usize;
        if payload.len() < 11 + token_len {
            return Err(DecodeError::Truncated("lite token stream"));
        }
        Ok(&payload[11..11 + token_len])
    } else {
        Err(DecodeError::BadMagic)
    }
}
