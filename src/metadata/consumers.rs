//! Fast-path consumers: classify, screen, and route from metadata alone.
//!
//! All three swallow extraction errors: an unreadable header means "this
//! message needs full processing", never a crash in the consumer.

use std::collections::{HashMap, HashSet};

use super::extract::{ExtractedMetadata, MetadataExtractor};
use crate::template::patterns::STATIC_RANGE_END;

/// Intent classification by template id, without decompression.
///
/// Returns `None` when no template id is present; the caller must fully
/// decompress to classify such messages.
pub struct FastPathClassifier {
    intents: HashMap<u16, String>,
}

impl FastPathClassifier {
    /// Classifier preloaded with intents for the static template ranges.
    pub fn new() -> Self {
        Self {
            intents: default_intents(),
        }
    }

    /// Classifier over a custom `template id → intent` table.
    pub fn with_intents(intents: HashMap<u16, String>) -> Self {
        Self { intents }
    }

    /// Intent of the primary (first) template id in the envelope.
    pub fn classify(&self, envelope: &[u8]) -> Option<&str> {
        let meta = MetadataExtractor::extract(envelope).ok()?;
        self.classify_metadata(&meta)
    }

    /// Same as [`classify`](Self::classify) over already-extracted metadata.
    pub fn classify_metadata(&self, meta: &ExtractedMetadata) -> Option<&str> {
        let primary = *meta.template_ids.first()?;
        Some(
            self.intents
                .get(&primary)
                .map(String::as_str)
                .unwrap_or("unknown"),
        )
    }
}

impl Default for FastPathClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Intent labels for the static id ranges.
fn default_intents() -> HashMap<u16, String> {
    let mut intents = HashMap::new();
    let mut fill = |range: std::ops::RangeInclusive<u16>, label: &str| {
        for id in range {
            intents.insert(id, label.to_string());
        }
    };
    fill(0..=19, "acknowledgement");
    fill(20..=39, "limitation");
    fill(40..=59, "fact");
    fill(60..=69, "question");
    fill(70..=89, "instruction");
    fill(90..=99, "explanation");
    fill(100..=109, "code_example");
    fill(110..=119, "enumeration");
    fill(120..=127, "comparison");
    intents
}

/// Whitelist-based screening: a message is approved without content
/// inspection iff every template id it references is pre-approved.
pub struct SecurityScreener {
    safe_template_ids: HashSet<u16>,
}

impl SecurityScreener {
    /// Screener whitelisting the entire static template range.
    pub fn new() -> Self {
        Self {
            safe_template_ids: (0..=STATIC_RANGE_END).collect(),
        }
    }

    pub fn with_whitelist(safe_template_ids: HashSet<u16>) -> Self {
        Self { safe_template_ids }
    }

    /// `true` iff the envelope references at least one template and every
    /// referenced id is whitelisted.  No templates (or an unreadable
    /// header) means full content inspection is required.
    pub fn is_safe(&self, envelope: &[u8]) -> bool {
        match MetadataExtractor::extract(envelope) {
            Ok(meta) => self.is_safe_metadata(&meta),
            Err(_) => false,
        }
    }

    pub fn is_safe_metadata(&self, meta: &ExtractedMetadata) -> bool {
        !meta.template_ids.is_empty()
            && meta
                .template_ids
                .iter()
                .all(|id| self.safe_template_ids.contains(id))
    }
}

impl Default for SecurityScreener {
    fn default() -> Self {
        Self::new()
    }
}

/// Route messages to handlers by template id, without decompression.
pub struct MetadataRouter {
    routes: HashMap<u16, String>,
}

impl MetadataRouter {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn with_routes(routes: HashMap<u16, String>) -> Self {
        Self { routes }
    }

    /// Register a handler for a template id.
    pub fn add_route(&mut self, template_id: u16, handler: impl Into<String>) {
        self.routes.insert(template_id, handler.into());
    }

    /// Handler for the envelope's primary template id, or `None` when
    /// routing requires decompression.
    pub fn route(&self, envelope: &[u8]) -> Option<&str> {
        let meta = MetadataExtractor::extract(envelope).ok()?;
        self.route_metadata(&meta)
    }

    pub fn route_metadata(&self, meta: &ExtractedMetadata) -> Option<&str> {
        let primary = *meta.template_ids.first()?;
        self.routes.get(&primary).map(String::as_str)
    }
}

impl Default for MetadataRouter {
    fn default() -> Self {
        Self::new()
    }
}
