//! Lite codec: the advanced token model without entropy coding.
//!
//! Used when the rANS frequency table and header would cost more than they
//! save, i.e. very short messages.  Token kinds are template, dictionary, and
//! literal runs; there is no LZ77 pass.  Headers come in two forms:
//!
//! - compact (3 bytes): `0xAA, version<<4 | flags, token_len:u8` when the
//!   token stream fits 255 bytes;
//! - full (11 bytes): `"AUL1", version:1B, flags:1B, token_len:4B BE,
//!   metadata_count:1B` otherwise.

use tracing::trace;

use crate::dict;
use crate::error::{DecodeError, EncodeError};
use crate::template::{TemplateLibrary, TemplateMatch};

/// Token kind bytes (distinct from the advanced codec's tag set).
pub const LITE_TEMPLATE: u8 = 0x00;
pub const LITE_DICT: u8 = 0x01;
pub const LITE_LITERAL: u8 = 0x03;

/// Compact-header magic byte.
pub const LITE_MAGIC_COMPACT: u8 = 0xAA;
/// Full-header magic bytes.
pub const LITE_MAGIC_FULL: &[u8; 4] = b"AUL1";
/// Lite format version.
pub const LITE_VERSION: u8 = 1;

/// Longest literal run one token can carry.
const MAX_LITERAL_RUN: usize = 255;

/// Output of one Lite encode.
#[derive(Debug, Clone)]
pub struct LiteEncoded {
    /// Envelope body (header + tokens), without the method byte.
    pub payload: Vec<u8>,
    pub template_ids: Vec<u16>,
}

/// Output of one Lite decode.
#[derive(Debug, Clone)]
pub struct LiteDecoded {
    pub text: String,
    pub template_ids: Vec<u16>,
}

/// Lite encoder over a shared template library.
pub struct LiteEncoder<'a> {
    templates: &'a TemplateLibrary,
}

impl<'a> LiteEncoder<'a> {
    pub fn new(templates: &'a TemplateLibrary) -> Self {
        Self { templates }
    }

    /// Encode `text`.
    ///
    /// `template_match` short-circuits the whole message through one
    /// template token.  Otherwise `spans` (non-overlapping substring
    /// matches) are embedded as template tokens between dictionary/literal
    /// runs; spans whose rendering does not byte-match the source text are
    /// skipped so decode always reproduces the input exactly.
    pub fn encode(
        &self,
        text: &str,
        template_match: Option<&TemplateMatch>,
        spans: &[TemplateMatch],
    ) -> Result<LiteEncoded, EncodeError> {
        let (tokens, template_ids) = match template_match {
            Some(m) => (
                encode_template_token(m.template_id, &m.slots)?,
                vec![m.template_id],
            ),
            None if spans.is_empty() => self.tokenise(text)?,
            None => self.encode_with_spans(text, spans)?,
        };
        trace!(token_len = tokens.len(), "lite encode");

        let mut payload;
        if tokens.len() <= u8::MAX as usize {
            payload = Vec::with_capacity(3 + tokens.len());
            payload.push(LITE_MAGIC_COMPACT);
            payload.push(LITE_VERSION << 4);
            payload.push(tokens.len() as u8);
        } else {
            payload = Vec::with_capacity(11 + tokens.len());
            payload.extend_from_slice(LITE_MAGIC_FULL);
            payload.push(LITE_VERSION);
            payload.push(0); // flags
            payload.extend_from_slice(&(tokens.len() as u32).to_be_bytes());
            payload.push(0); // metadata count: server retains audit data only
        }
        payload.extend_from_slice(&tokens);

        Ok(LiteEncoded {
            payload,
            template_ids,
        })
    }

    fn encode_with_spans(
        &self,
        text: &str,
        spans: &[TemplateMatch],
    ) -> Result<(Vec<u8>, Vec<u16>), EncodeError> {
        let mut ordered: Vec<&TemplateMatch> = spans
            .iter()
            .filter(|m| m.start.is_some() && m.end.is_some())
            .collect();
        ordered.sort_by_key(|m| m.start.unwrap_or(0));

        let mut tokens = Vec::new();
        let mut template_ids = Vec::new();
        let mut cursor = 0usize;

        for span in ordered {
            let (start, end) = (span.start.unwrap(), span.end.unwrap());
            if start < cursor {
                continue;
            }
            // Re-render to learn the template's true footprint; a span whose
            // rendering diverges from the source bytes (case folding, slot
            // trimming) is dropped so the decode stays exact.
            let Ok(rendered) = self.templates.format_template(span.template_id, &span.slots)
            else {
                continue;
            };
            if !text[start..].as_bytes().starts_with(rendered.as_bytes()) {
                continue;
            }

            if start > cursor {
                let (gap_tokens, _) = self.tokenise(&text[cursor..start])?;
                tokens.extend_from_slice(&gap_tokens);
            }

            tokens.extend_from_slice(&encode_template_token(span.template_id, &span.slots)?);
            template_ids.push(span.template_id);

            cursor = (start + rendered.len()).min(text.len());
            if cursor < end {
                // Trailing bytes the regex span covered but the rendering
                // does not (typically whitespace).
                let (ws_tokens, _) = self.tokenise(&text[cursor..end])?;
                tokens.extend_from_slice(&ws_tokens);
                cursor = end;
            }
        }

        if cursor < text.len() {
            let (suffix_tokens, _) = self.tokenise(&text[cursor..])?;
            tokens.extend_from_slice(&suffix_tokens);
        }

        Ok((tokens, template_ids))
    }

    /// Dictionary/literal-run tokenizer (no LZ77 in the Lite model).
    fn tokenise(&self, text: &str) -> Result<(Vec<u8>, Vec<u16>), EncodeError> {
        let data = text.as_bytes();
        let mut tokens = Vec::new();
        let mut pos = 0usize;

        while pos < data.len() {
            if let Some(entry) = dict::longest_prefix_match_bytes(data, pos) {
                tokens.push(LITE_DICT);
                tokens.push(entry.id as u8);
                pos += entry.phrase_bytes().len();
                continue;
            }

            let run_start = pos;
            pos += 1;
            while pos < data.len()
                && pos - run_start < MAX_LITERAL_RUN
                && dict::longest_prefix_match_bytes(data, pos).is_none()
            {
                pos += 1;
            }
            let run = &data[run_start..pos];
            tokens.push(LITE_LITERAL);
            tokens.push(run.len() as u8);
            tokens.extend_from_slice(run);
        }

        Ok((tokens, Vec::new()))
    }
}

fn encode_template_token(template_id: u16, slots: &[String]) -> Result<Vec<u8>, EncodeError> {
    if template_id > u8::MAX as u16 {
        return Err(EncodeError::TemplateIdOutOfRange(template_id));
    }
    if slots.len() > u8::MAX as usize {
        return Err(EncodeError::TooManySlots(slots.len()));
    }
    let mut token = Vec::new();
    token.push(LITE_TEMPLATE);
    token.push(template_id as u8);
    token.push(slots.len() as u8);
    for slot in slots {
        let bytes = slot.as_bytes();
        if bytes.len() > u16::MAX as usize {
            return Err(EncodeError::SlotTooLong(bytes.len()));
        }
        token.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        token.extend_from_slice(bytes);
    }
    Ok(token)
}

/// Lite decoder over a shared template library.
pub struct LiteDecoder<'a> {
    templates: &'a TemplateLibrary,
}

impl<'a> LiteDecoder<'a> {
    pub fn new(templates: &'a TemplateLibrary) -> Self {
        Self { templates }
    }

    /// Decode a Lite envelope body (without the method byte).
    pub fn decode(&self, payload: &[u8]) -> Result<LiteDecoded, DecodeError> {
        let tokens = lite_token_stream(payload)?;

        let mut out: Vec<u8> = Vec::new();
        let mut template_ids = Vec::new();
        let mut pos = 0usize;

        while pos < tokens.len() {
            let kind = tokens[pos];
            pos += 1;
            match kind {
                LITE_TEMPLATE => {
                    if pos + 2 > tokens.len() {
                        return Err(DecodeError::Truncated("lite template token"));
                    }
                    let template_id = tokens[pos] as u16;
                    let slot_count = tokens[pos + 1] as usize;
                    pos += 2;
                    let mut slots = Vec::with_capacity(slot_count);
                    for _ in 0..slot_count {
                        if pos + 2 > tokens.len() {
                            return Err(DecodeError::Truncated("lite slot length"));
                        }
                        let len = u16::from_be_bytes([tokens[pos], tokens[pos + 1]]) as usize;
                        pos += 2;
                        if pos + len > tokens.len() {
                            return Err(DecodeError::Truncated("lite slot payload"));
                        }
                        let slot = std::str::from_utf8(&tokens[pos..pos + len])
                            .map_err(|_| DecodeError::InvalidUtf8)?
                            .to_string();
                        slots.push(slot);
                        pos += len;
                    }
                    let rendered = self.templates.format_template(template_id, &slots)?;
                    out.extend_from_slice(rendered.as_bytes());
                    template_ids.push(template_id);
                }
                LITE_DICT => {
                    let id = *tokens
                        .get(pos)
                        .ok_or(DecodeError::Truncated("lite dictionary token"))?
                        as u16;
                    pos += 1;
                    let entry = dict::by_id(id).ok_or(DecodeError::UnknownDictionaryId(id))?;
                    out.extend_from_slice(entry.phrase_bytes());
                }
                LITE_LITERAL => {
                    let len = *tokens
                        .get(pos)
                        .ok_or(DecodeError::Truncated("lite literal length"))?
                        as usize;
                    pos += 1;
                    if pos + len > tokens.len() {
                        return Err(DecodeError::Truncated("lite literal payload"));
                    }
                    out.extend_from_slice(&tokens[pos..pos + len]);
                    pos += len;
                }
                other => return Err(DecodeError::UnknownTokenTag(other)),
            }
        }

        let text = String::from_utf8(out).map_err(|_| DecodeError::InvalidUtf8)?;
        Ok(LiteDecoded { text, template_ids })
    }
}

/// Slice the token stream out of a compact or full Lite header.
fn lite_token_stream(payload: &[u8]) -> Result<&[u8], DecodeError> {
    if payload.first() == Some(&LITE_MAGIC_COMPACT) {
        if payload.len() < 3 {
            return Err(DecodeError::Truncated("lite compact header"));
        }
        let version = payload[1] >> 4;
        if version != LITE_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let token_len = payload[2] as usize;
        if payload.len() < 3 + token_len {
            return Err(DecodeError::Truncated("lite token stream"));
        }
        return Ok(&payload[3..3 + token_len]);
    }

    if payload.len() >= 11 && &payload[..4] == LITE_MAGIC_FULL {
        if payload[4] != LITE_VERSION {
            return Err(DecodeError::UnsupportedVersion(payload[4]));
        }
        let token_len =
            u32::from_be_bytes([payload[6], payload[7], payload[8], payload[9]]) as usize;
        if payload.len() < 11 + token_len {
            return Err(DecodeError::Truncated("lite token stream"));
        }
        return Ok(&payload[11..11 + token_len]);
    }

    Err(DecodeError::BadMagic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_header_roundtrip() {
        let lib = TemplateLibrary::new();
        let encoder = LiteEncoder::new(&lib);
        let decoder = LiteDecoder::new(&lib);
        let text = "plain words with no phrases";
        let encoded = encoder.encode(text, None, &[]).unwrap();
        assert_eq!(encoded.payload[0], LITE_MAGIC_COMPACT);
        let decoded = decoder.decode(&encoded.payload).unwrap();
        assert_eq!(decoded.text, text);
    }

    #[test]
    fn full_header_for_long_streams() {
        let lib = TemplateLibrary::new();
        let encoder = LiteEncoder::new(&lib);
        let decoder = LiteDecoder::new(&lib);
        let text = "x".repeat(600);
        let encoded = encoder.encode(&text, None, &[]).unwrap();
        assert_eq!(&encoded.payload[..4], LITE_MAGIC_FULL);
        let decoded = decoder.decode(&encoded.payload).unwrap();
        assert_eq!(decoded.text, text);
    }

    #[test]
    fn span_encoding_survives_roundtrip() {
        let lib = TemplateLibrary::new();
        let encoder = LiteEncoder::new(&lib);
        let decoder = LiteDecoder::new(&lib);
        let text = "Quick note. The capital of France is Paris. Carry on.";
        let spans = lib.find_substring_matches(text);
        let encoded = encoder.encode(text, None, &spans).unwrap();
        let decoded = decoder.decode(&encoded.payload).unwrap();
        assert_eq!(decoded.text, text);
    }

    #[test]
    fn dictionary_tokens_resolve_on_decode() {
        let lib = TemplateLibrary::new();
        let encoder = LiteEncoder::new(&lib);
        let decoder = LiteDecoder::new(&lib);
        let text = "I don't have access to the production cluster right now";
        let encoded = encoder.encode(text, None, &[]).unwrap();
        assert!(encoded.payload.contains(&LITE_DICT));
        let decoded = decoder.decode(&encoded.payload).unwrap();
        assert_eq!(decoded.text, text);
    }
}
