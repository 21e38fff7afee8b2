//! Template registry, matching, and substring search.
//!
//! # Thread safety
//! The registry is guarded by an `RwLock`: in-flight matches take the read
//! side, while registration (`add` / `remove` / `sync_dynamic_templates`)
//! takes the write side so concurrent matchers never observe a half-updated
//! record set.  The match memo is a bounded LRU behind its own `Mutex` and
//! is cleared on every registration change.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cache::LruCache;
use crate::error::{DecodeError, EncodeError};

use super::patterns::{
    default_templates, CLIENT_SYNC_RANGE_END, CLIENT_SYNC_RANGE_START, DYNAMIC_RANGE_END,
    DYNAMIC_RANGE_START,
};

/// Capacity of the per-library match memo.
const MATCH_MEMO_CAPACITY: usize = 1024;

static SLOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").expect("slot regex"));

/// A successful template match: which template, and the captured slots.
///
/// `start`/`end` are byte offsets into the searched text and are only set by
/// [`TemplateLibrary::find_substring_matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    pub template_id: u16,
    pub slots: Vec<String>,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl TemplateMatch {
    fn whole(template_id: u16, slots: Vec<String>) -> Self {
        Self {
            template_id,
            slots,
            start: None,
            end: None,
        }
    }
}

/// One compiled template.
struct TemplateRecord {
    id: u16,
    pattern: String,
    /// Anchored, case-insensitive full matcher.
    full: Regex,
    /// Unanchored variant of the same expression, for substring search.
    partial: Regex,
    /// Slot indices in first-seen order, paired with the capture-group name
    /// of each index's first occurrence.
    slot_groups: Vec<(u32, String)>,
}

impl TemplateRecord {
    fn compile(id: u16, pattern: &str) -> Result<Self, EncodeError> {
        let mut body = String::new();
        let mut slot_groups: Vec<(u32, String)> = Vec::new();
        let mut group_counter = 0usize;
        let mut last = 0usize;

        for caps in SLOT_RE.captures_iter(pattern) {
            let whole = caps.get(0).expect("match 0");
            body.push_str(&regex::escape(&pattern[last..whole.start()]));

            let slot_idx: u32 = caps[1]
                .parse()
                .map_err(|_| EncodeError::InvalidPattern(pattern.to_string()))?;
            let group = format!("slot_{slot_idx}_{group_counter}");
            group_counter += 1;
            if !slot_groups.iter().any(|(idx, _)| *idx == slot_idx) {
                slot_groups.push((slot_idx, group.clone()));
            }
            body.push_str(&format!("(?P<{group}>.+?)"));
            last = whole.end();
        }
        body.push_str(&regex::escape(&pattern[last..]));

        let full = Regex::new(&format!("(?is)^{body}$"))
            .map_err(|e| EncodeError::InvalidPattern(e.to_string()))?;
        let partial = Regex::new(&format!("(?is){body}"))
            .map_err(|e| EncodeError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            id,
            pattern: pattern.to_string(),
            full,
            partial,
            slot_groups,
        })
    }

    /// Full-match `text` (trimmed), returning captured slots in slot order.
    fn match_text(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.full.captures(text.trim())?;
        let slots = self
            .slot_groups
            .iter()
            .map(|(_, group)| {
                caps.name(group)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default()
            })
            .collect();
        Some(slots)
    }

    fn slot_count(&self) -> usize {
        self.slot_groups.len()
    }
}

struct Inner {
    /// Id-ordered so iteration order doubles as the tie-break order.
    records: BTreeMap<u16, TemplateRecord>,
    /// Ids registered at construction; never removable.
    static_ids: HashSet<u16>,
    next_dynamic: u16,
    next_client_sync: u16,
}

impl Inner {
    fn advance_counters(&mut self, id: u16) {
        if (DYNAMIC_RANGE_START..DYNAMIC_RANGE_END).contains(&id) && id >= self.next_dynamic {
            self.next_dynamic = id + 1;
        }
        if (CLIENT_SYNC_RANGE_START..CLIENT_SYNC_RANGE_END).contains(&id)
            && id >= self.next_client_sync
        {
            self.next_client_sync = id + 1;
        }
    }
}

/// Registry of compiled templates with whole-message and substring matching.
pub struct TemplateLibrary {
    inner: RwLock<Inner>,
    memo: Mutex<LruCache<String, Option<TemplateMatch>>>,
}

impl TemplateLibrary {
    /// Library preloaded with the static template set.
    pub fn new() -> Self {
        Self::with_templates(&[])
    }

    /// Library preloaded with the static set plus `custom` templates.
    ///
    /// Custom ids registered here count as static (never removable).
    ///
    /// # Panics
    /// Panics when a custom pattern fails to compile; use [`add`](Self::add)
    /// for fallible runtime registration.
    pub fn with_templates(custom: &[(u16, &str)]) -> Self {
        let mut inner = Inner {
            records: BTreeMap::new(),
            static_ids: HashSet::new(),
            next_dynamic: DYNAMIC_RANGE_START,
            next_client_sync: CLIENT_SYNC_RANGE_START,
        };
        for &(id, pattern) in default_templates().iter().chain(custom) {
            let record = TemplateRecord::compile(id, pattern).expect("built-in template compiles");
            inner.records.insert(id, record);
            inner.static_ids.insert(id);
            inner.advance_counters(id);
        }
        Self {
            inner: RwLock::new(inner),
            memo: Mutex::new(LruCache::new(MATCH_MEMO_CAPACITY)),
        }
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.inner.read().expect("template registry lock").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: u16) -> bool {
        self.inner
            .read()
            .expect("template registry lock")
            .records
            .contains_key(&id)
    }

    /// Pattern string for `id`, if registered.
    pub fn pattern(&self, id: u16) -> Option<String> {
        self.inner
            .read()
            .expect("template registry lock")
            .records
            .get(&id)
            .map(|r| r.pattern.clone())
    }

    /// Ids currently registered, ascending.
    pub fn template_ids(&self) -> Vec<u16> {
        self.inner
            .read()
            .expect("template registry lock")
            .records
            .keys()
            .copied()
            .collect()
    }

    /// Register (or replace) a template.
    ///
    /// Ids must fit the 1-byte wire field of the template token.
    pub fn add(&self, id: u16, pattern: &str) -> Result<(), EncodeError> {
        if id >= CLIENT_SYNC_RANGE_END {
            return Err(EncodeError::TemplateIdOutOfRange(id));
        }
        let record = TemplateRecord::compile(id, pattern)?;
        {
            let mut inner = self.inner.write().expect("template registry lock");
            inner.records.insert(id, record);
            inner.advance_counters(id);
        }
        self.invalidate_memo();
        Ok(())
    }

    /// Remove a dynamic template.  Statically-reserved ids are never removed.
    pub fn remove(&self, id: u16) {
        let removed = {
            let mut inner = self.inner.write().expect("template registry lock");
            if inner.static_ids.contains(&id) {
                false
            } else {
                inner.records.remove(&id).is_some()
            }
        };
        if removed {
            self.invalidate_memo();
        }
    }

    /// Replace the whole dynamic population with `templates`: non-static ids
    /// absent from the map are dropped, present ones are (re)registered.
    pub fn sync_dynamic_templates(&self, templates: &[(u16, &str)]) -> Result<(), EncodeError> {
        // Compile outside the write lock so a bad pattern cannot leave the
        // registry half-synced.
        let mut compiled = Vec::with_capacity(templates.len());
        for &(id, pattern) in templates {
            if id >= CLIENT_SYNC_RANGE_END {
                return Err(EncodeError::TemplateIdOutOfRange(id));
            }
            compiled.push(TemplateRecord::compile(id, pattern)?);
        }

        {
            let mut inner = self.inner.write().expect("template registry lock");
            let keep: HashSet<u16> = templates.iter().map(|&(id, _)| id).collect();
            let stale: Vec<u16> = inner
                .records
                .keys()
                .copied()
                .filter(|id| !inner.static_ids.contains(id) && !keep.contains(id))
                .collect();
            for id in stale {
                inner.records.remove(&id);
            }
            for record in compiled {
                let id = record.id;
                inner.records.insert(id, record);
                inner.advance_counters(id);
            }
        }
        self.invalidate_memo();
        Ok(())
    }

    /// Next free id in the platform-discovered range.
    pub fn allocate_dynamic_id(&self) -> Result<u16, EncodeError> {
        let mut inner = self.inner.write().expect("template registry lock");
        while inner.next_dynamic < DYNAMIC_RANGE_END
            && inner.records.contains_key(&inner.next_dynamic)
        {
            inner.next_dynamic += 1;
        }
        if inner.next_dynamic >= DYNAMIC_RANGE_END {
            return Err(EncodeError::RangeExhausted("dynamic"));
        }
        let id = inner.next_dynamic;
        inner.next_dynamic += 1;
        Ok(id)
    }

    /// Next free id in the client-synced range.
    pub fn allocate_client_sync_id(&self) -> Result<u16, EncodeError> {
        let mut inner = self.inner.write().expect("template registry lock");
        while inner.next_client_sync < CLIENT_SYNC_RANGE_END
            && inner.records.contains_key(&inner.next_client_sync)
        {
            inner.next_client_sync += 1;
        }
        if inner.next_client_sync >= CLIENT_SYNC_RANGE_END {
            return Err(EncodeError::RangeExhausted("client-sync"));
        }
        let id = inner.next_client_sync;
        inner.next_client_sync += 1;
        Ok(id)
    }

    /// Best whole-message match for `text`, memoized.
    ///
    /// "Best" minimizes `(total slot length, slot count)`, the template that
    /// explains the most text with the least variable content, with ties
    /// broken by ascending template id.
    pub fn match_text(&self, text: &str) -> Option<TemplateMatch> {
        // The memo is best-effort: a poisoned lock degrades to uncached
        // matching rather than failing the call.
        if let Ok(mut memo) = self.memo.lock() {
            if let Some(hit) = memo.get(&text.to_string()) {
                return hit.clone();
            }
        }

        let result = self.match_uncached(text);
        if let Ok(mut memo) = self.memo.lock() {
            memo.put(text.to_string(), result.clone());
        }
        result
    }

    fn match_uncached(&self, text: &str) -> Option<TemplateMatch> {
        let inner = self.inner.read().expect("template registry lock");
        let mut best: Option<(usize, usize, TemplateMatch)> = None;
        for record in inner.records.values() {
            let Some(slots) = record.match_text(text) else {
                continue;
            };
            let total_len: usize = slots.iter().map(String::len).sum();
            let score = (total_len, slots.len());
            let better = match &best {
                Some((len, count, _)) => score < (*len, *count),
                None => true,
            };
            if better {
                best = Some((score.0, score.1, TemplateMatch::whole(record.id, slots)));
            }
        }
        best.map(|(_, _, m)| m)
    }

    /// All non-overlapping template spans inside `text`.
    ///
    /// For every partial-regex hit the span end is extended byte-by-byte as
    /// long as the substring still fully matches the template, capturing the
    /// longest cleanly-resolving span rather than the regex's natural lazy
    /// boundary.  The final set is greedy: spans sorted by
    /// `(start asc, length desc)`, overlaps dropped.
    pub fn find_substring_matches(&self, text: &str) -> Vec<TemplateMatch> {
        let inner = self.inner.read().expect("template registry lock");
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        let mut candidates: Vec<TemplateMatch> = Vec::new();

        for record in inner.records.values() {
            for found in record.partial.find_iter(text) {
                let start = found.start();
                let mut end = found.end();
                let mut best: Option<(usize, Vec<String>)> = None;

                loop {
                    if let Some(slots) = record.match_text(&text[start..end]) {
                        best = Some((end, slots));
                    } else if best.is_some() {
                        break;
                    }
                    match next_char_boundary(text, end) {
                        Some(next) => end = next,
                        None => break,
                    }
                }

                let Some((end, slots)) = best else { continue };
                if !seen.insert((start, end)) {
                    continue;
                }
                candidates.push(TemplateMatch {
                    template_id: record.id,
                    slots,
                    start: Some(start),
                    end: Some(end),
                });
            }
        }
        drop(inner);

        candidates.sort_by_key(|m| {
            let start = m.start.unwrap_or(0);
            let end = m.end.unwrap_or(start);
            (start, usize::MAX - (end - start))
        });

        let mut selected = Vec::new();
        let mut current_end = 0usize;
        for candidate in candidates {
            let (Some(start), Some(end)) = (candidate.start, candidate.end) else {
                continue;
            };
            if start < current_end {
                continue;
            }
            current_end = end;
            selected.push(candidate);
        }
        selected
    }

    /// Render `id` with positional slot substitution.
    pub fn format_template(&self, id: u16, slots: &[String]) -> Result<String, DecodeError> {
        let inner = self.inner.read().expect("template registry lock");
        let record = inner.records.get(&id).ok_or(DecodeError::UnknownTemplate(id))?;
        let pattern = &record.pattern;

        let mut out = String::with_capacity(pattern.len());
        let mut last = 0usize;
        for caps in SLOT_RE.captures_iter(pattern) {
            let whole = caps.get(0).expect("match 0");
            out.push_str(&pattern[last..whole.start()]);
            let idx: usize = caps[1].parse().unwrap_or(usize::MAX);
            if let Some(slot) = slots.get(idx) {
                out.push_str(slot);
            }
            last = whole.end();
        }
        out.push_str(&pattern[last..]);
        Ok(out)
    }

    /// Capture slots from `text` against a specific template.
    pub fn extract_slots(&self, id: u16, text: &str) -> Option<Vec<String>> {
        let inner = self.inner.read().expect("template registry lock");
        inner.records.get(&id)?.match_text(text)
    }

    /// Declared slot count of `id`, if registered.
    pub fn slot_count(&self, id: u16) -> Option<usize> {
        let inner = self.inner.read().expect("template registry lock");
        inner.records.get(&id).map(|r| r.slot_count())
    }

    fn invalidate_memo(&self) {
        // Poison sticks, so a failed clear also keeps later reads away from
        // the stale entries.
        if let Ok(mut memo) = self.memo.lock() {
            memo.clear();
        }
    }
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of the next char boundary strictly after `pos`, if any.
fn next_char_boundary(text: &str, pos: usize) -> Option<usize> {
    if pos >= text.len() {
        return None;
    }
    let mut next = pos + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_slot_template_matches_exactly() {
        let lib = TemplateLibrary::new();
        let m = lib.match_text("Yes").expect("match");
        assert_eq!(m.template_id, 0);
        assert!(m.slots.is_empty());
    }

    #[test]
    fn capital_of_france() {
        let lib = TemplateLibrary::new();
        let m = lib.match_text("The capital of France is Paris.").expect("match");
        assert_eq!(m.template_id, 44);
        assert_eq!(m.slots, vec!["capital", "France", "Paris"]);
        let rendered = lib.format_template(m.template_id, &m.slots).unwrap();
        assert_eq!(rendered, "The capital of France is Paris.");
    }

    #[test]
    fn best_match_minimizes_slot_content() {
        let lib = TemplateLibrary::new();
        // Both 40 ("{0} is {1}.") and 42 ("The {0} is {1}.") match; 42
        // explains "The" as fixed text, leaving less captured content.
        let m = lib.match_text("The server is down.").expect("match");
        assert_eq!(m.template_id, 42);
        assert_eq!(m.slots, vec!["server", "down"]);
    }

    #[test]
    fn memo_invalidated_on_registration() {
        let lib = TemplateLibrary::new();
        assert!(lib.match_text("deploy finished ok").is_none());
        lib.add(128, "deploy finished {0}").unwrap();
        let m = lib.match_text("deploy finished ok").expect("match after add");
        assert_eq!(m.template_id, 128);
    }

    #[test]
    fn static_ids_survive_remove_and_sync() {
        let lib = TemplateLibrary::new();
        lib.remove(0);
        assert!(lib.contains(0));
        lib.add(130, "custom {0}").unwrap();
        lib.sync_dynamic_templates(&[]).unwrap();
        assert!(lib.contains(0));
        assert!(!lib.contains(130));
    }

    #[test]
    fn dynamic_allocation_skips_occupied() {
        let lib = TemplateLibrary::new();
        lib.add(128, "a {0}").unwrap();
        lib.add(129, "b {0}").unwrap();
        let id = lib.allocate_dynamic_id().unwrap();
        assert_eq!(id, 130);
    }

    #[test]
    fn substring_matches_are_non_overlapping() {
        let lib = TemplateLibrary::new();
        let text = "I recommend caching. The capital of France is Paris.";
        let spans = lib.find_substring_matches(text);
        assert!(!spans.is_empty());
        let mut last_end = 0usize;
        for span in &spans {
            assert!(span.start.unwrap() >= last_end);
            last_end = span.end.unwrap();
        }
    }
}
