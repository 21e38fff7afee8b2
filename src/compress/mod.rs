//! Top-level hybrid compressor: candidate evaluation and method dispatch.
//!
//! Every `compress` call evaluates up to five candidates (template-binary,
//! advanced (Brio), Lite, the zstd general-purpose fallback, and
//! uncompressed) and keeps the smallest envelope.  The fallback is always
//! computed, which is the never-worse guarantee: the specialized codecs are
//! preferred only when they beat it by more than the configured margin.
//!
//! Failures while building a candidate drop that candidate silently (the
//! fallback remains viable); failures never abort the whole call.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::audit::{AuditEntry, AuditSink};
use crate::codec::{
    decode_template_binary, encode_template_binary, BrioDecoder, BrioEncoder, LiteDecoder,
    LiteEncoder,
};
use crate::config::CompressorConfig;
use crate::error::DecodeError;
use crate::template::TemplateLibrary;

// ── Method bytes ─────────────────────────────────────────────────────────────

/// Envelope method byte: the first byte of every envelope deterministically
/// identifies the decode path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionMethod {
    /// Template-binary body: id + slots, nothing else.
    TemplateBinary = 0x00,
    /// General-purpose fallback (zstd frame).
    Fallback = 0x01,
    /// Advanced codec: dictionary + LZ77 + rANS + templates.
    Brio = 0x02,
    /// Token model without entropy coding.
    Lite = 0x03,
    /// Raw UTF-8.
    Uncompressed = 0xFF,
}

impl CompressionMethod {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::TemplateBinary),
            0x01 => Some(Self::Fallback),
            0x02 => Some(Self::Brio),
            0x03 => Some(Self::Lite),
            0xFF => Some(Self::Uncompressed),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TemplateBinary => "template_binary",
            Self::Fallback => "fallback",
            Self::Brio => "brio",
            Self::Lite => "lite",
            Self::Uncompressed => "uncompressed",
        }
    }
}

// ── Compression report ───────────────────────────────────────────────────────

/// Fixed-shape report for one `compress` call.
#[derive(Debug, Clone)]
pub struct CompressionInfo {
    pub method: CompressionMethod,
    pub original_size: usize,
    /// Envelope size including the method byte.
    pub compressed_size: usize,
    pub ratio: f64,
    /// Whole-message template id, when one drove the encoding.
    pub template_id: Option<u16>,
    pub slot_count: Option<usize>,
    /// Size advantage over the fallback candidate, as a fraction
    /// (`fallback/chosen - 1`); `None` when the fallback was unavailable.
    pub advantage_vs_fallback: Option<f64>,
    /// Whether header-only consumers can act on this envelope.
    pub fast_path_candidate: bool,
}

struct Candidate {
    payload: Vec<u8>,
    method: CompressionMethod,
    template_id: Option<u16>,
    slot_count: Option<usize>,
    fast_path: bool,
}

impl Candidate {
    fn size(&self) -> usize {
        self.payload.len()
    }
}

// ── Compressor ───────────────────────────────────────────────────────────────

/// Hybrid compressor over a shared template library.
pub struct HybridCompressor {
    templates: Arc<TemplateLibrary>,
    config: CompressorConfig,
    audit: Option<Arc<dyn AuditSink>>,
}

impl HybridCompressor {
    pub fn new() -> Self {
        Self::with_config(CompressorConfig::default())
    }

    pub fn with_config(config: CompressorConfig) -> Self {
        Self {
            templates: Arc::new(TemplateLibrary::new()),
            config,
            audit: None,
        }
    }

    /// Build over an existing (possibly shared) template library.
    pub fn with_templates(templates: Arc<TemplateLibrary>, config: CompressorConfig) -> Self {
        Self {
            templates,
            config,
            audit: None,
        }
    }

    /// Attach an audit sink to be notified after audited decodes.
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Shared template library handle; register dynamic templates here.
    pub fn templates(&self) -> &Arc<TemplateLibrary> {
        &self.templates
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Compress `text` with the best available method.
    pub fn compress(&self, text: &str) -> (Vec<u8>, CompressionMethod, CompressionInfo) {
        let original_size = text.len();

        if original_size < self.config.min_compression_size {
            let candidate = uncompressed_candidate(text);
            let info = self.build_info(&candidate, original_size, None);
            return (candidate.payload, candidate.method, info);
        }

        // A whole-message template match is only usable when its rendering
        // reproduces the input byte-for-byte (matching is case-insensitive
        // and trims slots, so this is not guaranteed).
        let template_match = self.templates.match_text(text).filter(|m| {
            self.templates
                .format_template(m.template_id, &m.slots)
                .map(|rendered| rendered == text)
                .unwrap_or(false)
        });

        let mut candidates: Vec<Candidate> = Vec::with_capacity(5);

        if let Some(m) = &template_match {
            match encode_template_binary(m.template_id, &m.slots) {
                Ok(body) => candidates.push(Candidate {
                    payload: with_method(CompressionMethod::TemplateBinary, &body),
                    method: CompressionMethod::TemplateBinary,
                    template_id: Some(m.template_id),
                    slot_count: Some(m.slots.len()),
                    fast_path: true,
                }),
                Err(err) => warn!(%err, "template-binary candidate dropped"),
            }
        }

        if self.config.enable_brio {
            let encoder = BrioEncoder::new(&self.templates);
            match encoder.compress(text, template_match.as_ref()) {
                Ok(compressed) => {
                    let fast_path = template_match.is_some();
                    candidates.push(Candidate {
                        payload: with_method(CompressionMethod::Brio, &compressed.payload),
                        method: CompressionMethod::Brio,
                        template_id: template_match.as_ref().map(|m| m.template_id),
                        slot_count: template_match.as_ref().map(|m| m.slots.len()),
                        fast_path,
                    });
                }
                Err(err) => warn!(%err, "brio candidate dropped"),
            }
        }

        if self.config.enable_lite {
            let spans = if template_match.is_none() {
                self.templates.find_substring_matches(text)
            } else {
                Vec::new()
            };
            let encoder = LiteEncoder::new(&self.templates);
            match encoder.encode(text, template_match.as_ref(), &spans) {
                Ok(encoded) => {
                    let fast_path = !encoded.template_ids.is_empty();
                    candidates.push(Candidate {
                        payload: with_method(CompressionMethod::Lite, &encoded.payload),
                        method: CompressionMethod::Lite,
                        template_id: encoded.template_ids.first().copied(),
                        slot_count: template_match.as_ref().map(|m| m.slots.len()),
                        fast_path,
                    });
                }
                Err(err) => warn!(%err, "lite candidate dropped"),
            }
        }

        match zstd::encode_all(text.as_bytes(), self.config.zstd_level) {
            Ok(frame) => candidates.push(Candidate {
                payload: with_method(CompressionMethod::Fallback, &frame),
                method: CompressionMethod::Fallback,
                template_id: None,
                slot_count: None,
                fast_path: false,
            }),
            Err(err) => warn!(%err, "fallback candidate dropped"),
        }

        candidates.push(uncompressed_candidate(text));

        let fallback_size = candidates
            .iter()
            .find(|c| c.method == CompressionMethod::Fallback)
            .map(Candidate::size);

        let chosen = self.select(candidates, fallback_size);
        debug!(
            method = chosen.method.name(),
            original = original_size,
            compressed = chosen.size(),
            "candidate selected"
        );

        let info = self.build_info(&chosen, original_size, fallback_size);
        (chosen.payload, chosen.method, info)
    }

    /// Pick the smallest candidate, demoting the specialized codecs when
    /// they fail to beat the fallback by the configured margin.  A negative
    /// margin unconditionally forces the advanced codec when it was built.
    fn select(&self, mut candidates: Vec<Candidate>, fallback_size: Option<usize>) -> Candidate {
        let margin = self.config.preference_margin;

        if margin < 0.0 {
            if let Some(pos) = candidates
                .iter()
                .position(|c| c.method == CompressionMethod::Brio)
            {
                return candidates.swap_remove(pos);
            }
        }

        let mut best: Option<Candidate> = None;
        for candidate in candidates {
            let acceptable = match (candidate.method, fallback_size) {
                (CompressionMethod::Brio | CompressionMethod::Lite, Some(fb)) => {
                    (candidate.size() as f64) <= (fb as f64) * (1.0 - margin)
                }
                _ => true,
            };
            if !acceptable {
                continue;
            }
            let better = match &best {
                Some(current) => candidate.size() < current.size(),
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }
        best.expect("uncompressed candidate always present")
    }

    fn build_info(
        &self,
        chosen: &Candidate,
        original_size: usize,
        fallback_size: Option<usize>,
    ) -> CompressionInfo {
        let compressed_size = chosen.size();
        let ratio = if compressed_size > 0 {
            original_size as f64 / compressed_size as f64
        } else {
            0.0
        };
        let advantage_vs_fallback = fallback_size
            .filter(|_| compressed_size > 0)
            .map(|fb| fb as f64 / compressed_size as f64 - 1.0);

        CompressionInfo {
            method: chosen.method,
            original_size,
            compressed_size,
            ratio,
            template_id: chosen.template_id,
            slot_count: chosen.slot_count,
            advantage_vs_fallback,
            fast_path_candidate: chosen.fast_path,
        }
    }

    /// Decompress an envelope back to text (method auto-detected).
    pub fn decompress(&self, data: &[u8]) -> Result<String, DecodeError> {
        let (&method_byte, payload) = data
            .split_first()
            .ok_or(DecodeError::Truncated("empty envelope"))?;
        let method = CompressionMethod::from_u8(method_byte)
            .ok_or(DecodeError::UnknownMethod(method_byte))?;

        match method {
            CompressionMethod::TemplateBinary => {
                decode_template_binary(payload, &self.templates).map(|(text, _)| text)
            }
            CompressionMethod::Fallback => zstd::decode_all(payload)
                .map_err(|e| DecodeError::FallbackFrame(e.to_string()))
                .and_then(|bytes| {
                    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
                }),
            CompressionMethod::Brio => {
                let decoder = BrioDecoder::new(&self.templates);
                decoder.decompress(payload).map(|d| d.text)
            }
            CompressionMethod::Lite => {
                let decoder = LiteDecoder::new(&self.templates);
                decoder.decode(payload).map(|d| d.text)
            }
            CompressionMethod::Uncompressed => std::str::from_utf8(payload)
                .map(str::to_string)
                .map_err(|_| DecodeError::InvalidUtf8),
        }
    }

    /// Decompress and report the result to the attached audit sink.
    ///
    /// The sink call is best-effort and happens only after a successful
    /// decode; without a sink this is identical to [`decompress`].
    ///
    /// [`decompress`]: Self::decompress
    pub fn decompress_audited(
        &self,
        data: &[u8],
        session_id: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<String, DecodeError> {
        let text = self.decompress(data)?;
        if let Some(sink) = &self.audit {
            if let Ok(metadata) = crate::metadata::MetadataExtractor::extract(data) {
                sink.record(AuditEntry {
                    plaintext: &text,
                    compressed: data,
                    metadata: &metadata,
                    session_id,
                    user_id,
                });
            }
        }
        Ok(text)
    }
}

impl Default for HybridCompressor {
    fn default() -> Self {
        Self::new()
    }
}

fn with_method(method: CompressionMethod, body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(1 + body.len());
    payload.push(method.as_u8());
    payload.extend_from_slice(body);
    payload
}

fn uncompressed_candidate(text: &str) -> Candidate {
    Candidate {
        payload: with_method(CompressionMethod::Uncompressed, text.as_bytes()),
        method: CompressionMethod::Uncompressed,
        template_id: None,
        slot_count: None,
        fast_path: false,
    }
}

// ── Parallel batch helpers ───────────────────────────────────────────────────

/// Compress a batch of independent messages in parallel.
///
/// Each message owns its window and token buffers, so messages parallelize
/// with no shared mutable state beyond the template registry's read side.
pub fn compress_batch<S: AsRef<str> + Sync>(
    compressor: &HybridCompressor,
    texts: &[S],
) -> Vec<(Vec<u8>, CompressionMethod, CompressionInfo)> {
    texts
        .par_iter()
        .map(|text| compressor.compress(text.as_ref()))
        .collect()
}

/// Decompress a batch of envelopes in parallel.  Per-message failures stay
/// per-message.
pub fn decompress_batch<B: AsRef<[u8]> + Sync>(
    compressor: &HybridCompressor,
    envelopes: &[B],
) -> Vec<Result<String, DecodeError>> {
    envelopes
        .par_iter()
        .map(|data| compressor.decompress(data.as_ref()))
        .collect()
}
