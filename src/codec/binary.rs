//! Template-binary bodies: the cheapest envelope for whole-template messages.
//!
//! Wire layout: `template_id:1B, slot_count:1B, (slot_len:2B BE, slot_bytes)
//! × slot_count`.  No header, no entropy coding: template identity plus
//! slot values is the entire message.

use crate::error::{DecodeError, EncodeError};
use crate::template::TemplateLibrary;

/// Encode a template id and its slot values.
pub fn encode_template_binary(template_id: u16, slots: &[String]) -> Result<Vec<u8>, EncodeError> {
    if template_id > u8::MAX as u16 {
        return Err(EncodeError::TemplateIdOutOfRange(template_id));
    }
    if slots.len() > u8::MAX as usize {
        return Err(EncodeError::TooManySlots(slots.len()));
    }

    let mut out = Vec::with_capacity(2 + slots.iter().map(|s| 2 + s.len()).sum::<usize>());
    out.push(template_id as u8);
    out.push(slots.len() as u8);
    for slot in slots {
        let bytes = slot.as_bytes();
        if bytes.len() > u16::MAX as usize {
            return Err(EncodeError::SlotTooLong(bytes.len()));
        }
        out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        out.extend_from_slice(bytes);
    }
    Ok(out)
}

/// Decode a template-binary body back to `(rendered text, template id)`.
pub fn decode_template_binary(
    data: &[u8],
    templates: &TemplateLibrary,
) -> Result<(String, u16), DecodeError> {
    if data.len() < 2 {
        return Err(DecodeError::Truncated("template-binary header"));
    }
    let template_id = data[0] as u16;
    let slot_count = data[1] as usize;

    let mut slots = Vec::with_capacity(slot_count);
    let mut offset = 2usize;
    for _ in 0..slot_count {
        if offset + 2 > data.len() {
            return Err(DecodeError::Truncated("template-binary slot length"));
        }
        let len = u16::from_be_bytes([data[offset], data[offset + 1]]) as usize;
        offset += 2;
        if offset + len > data.len() {
            return Err(DecodeError::Truncated("template-binary slot payload"));
        }
        let slot = std::str::from_utf8(&data[offset..offset + len])
            .map_err(|_| DecodeError::InvalidUtf8)?
            .to_string();
        slots.push(slot);
        offset += len;
    }

    let text = templates.format_template(template_id, &slots)?;
    Ok((text, template_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_the_library() {
        let lib = TemplateLibrary::new();
        let slots = vec!["capital".to_string(), "France".into(), "Paris".into()];
        let body = encode_template_binary(44, &slots).unwrap();
        let (text, id) = decode_template_binary(&body, &lib).unwrap();
        assert_eq!(id, 44);
        assert_eq!(text, "The capital of France is Paris.");
    }

    #[test]
    fn zero_slot_template() {
        let lib = TemplateLibrary::new();
        let body = encode_template_binary(0, &[]).unwrap();
        assert_eq!(body, vec![0, 0]);
        let (text, id) = decode_template_binary(&body, &lib).unwrap();
        assert_eq!((text.as_str(), id), ("Yes", 0));
    }

    #[test]
    fn unknown_template_is_a_desync_error() {
        let lib = TemplateLibrary::new();
        let body = encode_template_binary(150, &[]).unwrap();
        assert_eq!(
            decode_template_binary(&body, &lib),
            Err(DecodeError::UnknownTemplate(150))
        );
    }
}
