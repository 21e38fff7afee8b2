// Template library behavior: matching, idempotence, substring search, and
// the dynamic id ranges.

use brio::error::EncodeError;
use brio::template::{
    TemplateLibrary, CLIENT_SYNC_RANGE_END, CLIENT_SYNC_RANGE_START, DYNAMIC_RANGE_END,
    DYNAMIC_RANGE_START,
};

// ---------------------------------------------------------------------------
// Whole-message matching
// ---------------------------------------------------------------------------

#[test]
fn match_is_case_insensitive() {
    let lib = TemplateLibrary::new();
    let m = lib.match_text("the capital of France is Paris.").unwrap();
    assert_eq!(m.template_id, 44);
}

#[test]
fn no_match_for_free_text() {
    let lib = TemplateLibrary::new();
    assert!(lib
        .match_text("completely unstructured rambling with no recognizable shape")
        .is_none());
}

#[test]
fn tie_break_prefers_less_captured_content() {
    let lib = TemplateLibrary::new();
    // "I recommend {0}." (75) and "{0} is {1}." (40) both plausibly overlap
    // on some inputs; the selected template must minimize captured bytes.
    let m = lib.match_text("I recommend caching.").unwrap();
    assert_eq!(m.template_id, 75);
    assert_eq!(m.slots, vec!["caching"]);
}

// ---------------------------------------------------------------------------
// Idempotence: format → extract → same slots
// ---------------------------------------------------------------------------

#[test]
fn format_then_extract_returns_the_slots() {
    let lib = TemplateLibrary::new();
    let cases: &[(u16, &[&str])] = &[
        (0, &[]),
        (22, &["verify that claim"]),
        (44, &["capital", "France", "Paris"]),
        (70, &["restart", "drain the queue first"]),
        (90, &["Backpropagation", "propagating gradients"]),
        (110, &["status codes", "200 and 404"]),
    ];
    for (id, slots) in cases {
        let slots: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
        let rendered = lib.format_template(*id, &slots).unwrap();
        let extracted = lib
            .extract_slots(*id, &rendered)
            .unwrap_or_else(|| panic!("template {id} failed to re-match {rendered:?}"));
        assert_eq!(extracted, slots, "template {id}");
    }
}

#[test]
fn format_unknown_template_errors() {
    let lib = TemplateLibrary::new();
    let err = lib.format_template(200, &[]).unwrap_err();
    assert_eq!(err, brio::DecodeError::UnknownTemplate(200));
}

// ---------------------------------------------------------------------------
// Substring search
// ---------------------------------------------------------------------------

#[test]
fn substring_match_extends_to_longest_clean_span() {
    let lib = TemplateLibrary::new();
    let text = "prefix text, then: The capital of France is Paris. And a suffix.";
    let spans = lib.find_substring_matches(text);
    let span = spans
        .iter()
        .find(|m| m.template_id == 44)
        .expect("fact template found in substring scan");
    let (start, end) = (span.start.unwrap(), span.end.unwrap());
    assert!(text[start..end].starts_with("The capital of France is Paris."));
    assert_eq!(span.slots, vec!["capital", "France", "Paris"]);
}

#[test]
fn substring_spans_deduplicate_and_order() {
    let lib = TemplateLibrary::new();
    let spans = lib.find_substring_matches("Try caching. Try batching. Try sharding.");
    // Greedy non-overlapping selection, ordered by start.
    let mut last_end = 0usize;
    for span in &spans {
        assert!(span.start.unwrap() >= last_end);
        last_end = span.end.unwrap();
    }
}

// ---------------------------------------------------------------------------
// Dynamic registration and id ranges
// ---------------------------------------------------------------------------

#[test]
fn dynamic_range_exhaustion_errors() {
    let lib = TemplateLibrary::new();
    for _ in DYNAMIC_RANGE_START..DYNAMIC_RANGE_END {
        let id = lib.allocate_dynamic_id().unwrap();
        lib.add(id, "pattern {0}").unwrap();
    }
    assert_eq!(
        lib.allocate_dynamic_id(),
        Err(EncodeError::RangeExhausted("dynamic"))
    );
}

#[test]
fn client_sync_range_is_disjoint() {
    let lib = TemplateLibrary::new();
    let dynamic = lib.allocate_dynamic_id().unwrap();
    let client = lib.allocate_client_sync_id().unwrap();
    assert!((DYNAMIC_RANGE_START..DYNAMIC_RANGE_END).contains(&dynamic));
    assert!((CLIENT_SYNC_RANGE_START..CLIENT_SYNC_RANGE_END).contains(&client));
}

#[test]
fn sync_replaces_dynamic_population() {
    let lib = TemplateLibrary::new();
    lib.add(128, "old pattern {0}").unwrap();
    lib.add(129, "kept pattern {0}").unwrap();
    lib.sync_dynamic_templates(&[(129, "kept pattern {0}"), (131, "new pattern {0}")])
        .unwrap();
    assert!(!lib.contains(128));
    assert!(lib.contains(129));
    assert!(lib.contains(131));
    // Static population untouched.
    assert!(lib.contains(0));
    assert!(lib.contains(127));
}

#[test]
fn oversized_id_rejected() {
    let lib = TemplateLibrary::new();
    assert_eq!(
        lib.add(256, "too big {0}"),
        Err(EncodeError::TemplateIdOutOfRange(256))
    );
}

#[test]
fn registration_invalidates_the_match_memo() {
    let lib = TemplateLibrary::new();
    let text = "rollout paused at 50 percent";
    assert!(lib.match_text(text).is_none());
    lib.add(150, "rollout paused at {0} percent").unwrap();
    assert_eq!(lib.match_text(text).unwrap().template_id, 150);
    lib.remove(150);
    assert!(lib.match_text(text).is_none());
}
