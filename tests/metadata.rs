// Metadata side-channel: header-only extraction fidelity and the fast-path
// consumers (classifier, screener, router).

use std::collections::HashSet;

use brio::codec::BrioEncoder;
use brio::{
    CompressionMethod, FastPathClassifier, HybridCompressor, MetadataExtractor, MetadataRouter,
    SecurityScreener, TemplateLibrary,
};

/// Build a method-prefixed advanced-codec envelope directly.
fn brio_envelope(lib: &TemplateLibrary, text: &str) -> (Vec<u8>, usize) {
    let template_match = lib.match_text(text).filter(|m| {
        lib.format_template(m.template_id, &m.slots)
            .map(|r| r == text)
            .unwrap_or(false)
    });
    let compressed = BrioEncoder::new(lib)
        .compress(text, template_match.as_ref())
        .unwrap();
    let mut envelope = vec![CompressionMethod::Brio.as_u8()];
    envelope.extend_from_slice(&compressed.payload);
    (envelope, compressed.tokens.len())
}

// ---------------------------------------------------------------------------
// Extraction fidelity
// ---------------------------------------------------------------------------

#[test]
fn metadata_entry_count_equals_token_count() {
    let lib = TemplateLibrary::new();
    for text in [
        "The capital of France is Paris.",
        "free-form content that matches no template at all, with repeats, repeats",
        "I don't have access to the production logs right now unfortunately",
        "ababababababab",
    ] {
        let (envelope, token_count) = brio_envelope(&lib, text);
        let meta = MetadataExtractor::extract(&envelope).unwrap();
        assert_eq!(meta.method, CompressionMethod::Brio);
        assert_eq!(
            meta.token_count,
            Some(token_count),
            "metadata/token count diverged for {text:?}"
        );
        assert_eq!(meta.metadata_entries.len(), token_count);
    }
}

#[test]
fn extraction_never_reads_the_entropy_payload() {
    let lib = TemplateLibrary::new();
    let (mut envelope, _) = brio_envelope(&lib, "The capital of France is Paris.");
    let before = MetadataExtractor::extract(&envelope).unwrap();

    // Corrupt the entropy payload (everything after the metadata table).
    let tail = envelope.len() - 1;
    envelope[tail] ^= 0xFF;
    let after = MetadataExtractor::extract(&envelope).unwrap();

    assert_eq!(before.template_ids, after.template_ids);
    assert_eq!(before.token_count, after.token_count);
    assert_eq!(before.fast_path_candidate, after.fast_path_candidate);
}

#[test]
fn template_envelope_is_fast_path_candidate() {
    let lib = TemplateLibrary::new();
    let (envelope, _) = brio_envelope(&lib, "The capital of France is Paris.");
    let meta = MetadataExtractor::extract(&envelope).unwrap();
    assert_eq!(meta.template_ids, vec![44]);
    assert!(meta.fast_path_candidate);
    assert!(!meta.has_lz77_matches);
}

#[test]
fn non_template_envelope_reports_shape_flags() {
    let lib = TemplateLibrary::new();
    let (envelope, _) = brio_envelope(
        &lib,
        "repeats repeats repeats with no recognizable response shape",
    );
    let meta = MetadataExtractor::extract(&envelope).unwrap();
    assert!(meta.template_ids.is_empty());
    assert!(!meta.fast_path_candidate);
    assert!(meta.has_literals || meta.has_lz77_matches || meta.has_dictionary_refs);
}

#[test]
fn extraction_matches_full_decode_across_methods() {
    // The projection contract: metadata must agree with what decode sees.
    let compressor = HybridCompressor::with_config(brio::CompressorConfig {
        min_compression_size: 0,
        ..brio::CompressorConfig::default()
    });
    for text in [
        "The capital of France is Paris.",
        "Common HTTP status codes include: 200, 404, 500.",
        "nothing templated here, just regular prose about the weather today",
    ] {
        let (envelope, method, info) = compressor.compress(text);
        let meta = MetadataExtractor::extract(&envelope).unwrap();
        assert_eq!(meta.method, method);
        assert_eq!(meta.fast_path_candidate, info.fast_path_candidate);
        if let Some(id) = info.template_id {
            assert_eq!(meta.template_ids.first().copied(), Some(id));
        }
        assert_eq!(compressor.decompress(&envelope).unwrap(), text);
    }
}

// ---------------------------------------------------------------------------
// Fast-path consumers
// ---------------------------------------------------------------------------

#[test]
fn classifier_labels_template_envelopes() {
    let lib = TemplateLibrary::new();
    let classifier = FastPathClassifier::new();

    let (fact, _) = brio_envelope(&lib, "The capital of France is Paris.");
    assert_eq!(classifier.classify(&fact), Some("fact"));

    let (limitation, _) = brio_envelope(
        &lib,
        "I don't have access to the billing system. Ask the finance team instead.",
    );
    assert_eq!(classifier.classify(&limitation), Some("limitation"));
}

#[test]
fn classifier_declines_without_template() {
    let lib = TemplateLibrary::new();
    let classifier = FastPathClassifier::new();
    let (envelope, _) = brio_envelope(&lib, "free text without any template shape at all");
    assert_eq!(classifier.classify(&envelope), None);
}

#[test]
fn screener_approves_whitelisted_templates_only() {
    let lib = TemplateLibrary::new();
    let screener = SecurityScreener::new();

    let (templated, _) = brio_envelope(&lib, "The capital of France is Paris.");
    assert!(screener.is_safe(&templated));

    let (free_text, _) = brio_envelope(&lib, "free text requires full content inspection");
    assert!(!screener.is_safe(&free_text));

    // A screener with an empty whitelist approves nothing.
    let strict = SecurityScreener::with_whitelist(HashSet::new());
    assert!(!strict.is_safe(&templated));
}

#[test]
fn screener_treats_garbage_as_unsafe() {
    let screener = SecurityScreener::new();
    assert!(!screener.is_safe(&[]));
    assert!(!screener.is_safe(&[0x02, 0xDE, 0xAD]));
    assert!(!screener.is_safe(&[0x42, 0x00]));
}

#[test]
fn router_maps_template_to_handler() {
    let lib = TemplateLibrary::new();
    let mut router = MetadataRouter::new();
    router.add_route(44, "facts-service");

    let (envelope, _) = brio_envelope(&lib, "The capital of France is Paris.");
    assert_eq!(router.route(&envelope), Some("facts-service"));

    let (unrouted, _) = brio_envelope(&lib, "plain message that no handler claims today");
    assert_eq!(router.route(&unrouted), None);
}
