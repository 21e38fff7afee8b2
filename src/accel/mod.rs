//! Conversation accelerator: structural-signature response cache.
//!
//! The signature is derived from metadata shape (method, template ids,
//! match/literal flags, token count) and deliberately ignores slot
//! *content*, so repeated message shapes (not just byte-identical messages)
//! hit the cache after their first occurrence.  That is what makes a
//! conversation get faster as it goes.
//!
//! Cache operations are best-effort: a poisoned lock is treated as a miss,
//! never propagated to fail message processing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use xxhash_rust::xxh64::xxh64;

use crate::cache::LruCache;
use crate::metadata::ExtractedMetadata;

/// Default capacity of the per-session cache.
pub const SESSION_CACHE_CAPACITY: usize = 1000;
/// Platform cache capacity multiplier in two-tier mode.
const PLATFORM_CAPACITY_FACTOR: usize = 10;

/// One cached response and its bookkeeping.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub response: String,
    pub hit_count: u64,
    pub last_accessed: Instant,
    pub created_at: Instant,
}

impl CachedResponse {
    fn new(response: String) -> Self {
        let now = Instant::now();
        Self {
            response,
            hit_count: 0,
            last_accessed: now,
            created_at: now,
        }
    }

    fn touch(&mut self) {
        self.hit_count += 1;
        self.last_accessed = Instant::now();
    }
}

/// Deterministic structural signature of extracted metadata.
///
/// Two envelopes with the same shape collide even when their slot values
/// differ: the key is `(method, sorted template ids, has_lz77,
/// has_literals, token count)` and nothing else.
pub fn signature(meta: &ExtractedMetadata) -> String {
    let mut ids = meta.template_ids.clone();
    ids.sort_unstable();
    let ids = ids
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join("|");
    format!(
        "{}:{}:{}:{}:{}",
        meta.method.name(),
        ids,
        meta.has_lz77_matches,
        meta.has_literals,
        meta.token_count.unwrap_or(0)
    )
}

fn signature_key(meta: &ExtractedMetadata) -> u64 {
    xxh64(signature(meta).as_bytes(), 0)
}

/// Signature-keyed LRU response cache, optionally two-tiered.
pub struct ConversationAccelerator {
    session: Mutex<LruCache<u64, CachedResponse>>,
    platform: Option<Mutex<LruCache<u64, CachedResponse>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ConversationAccelerator {
    /// Session-only cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(SESSION_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            session: Mutex::new(LruCache::new(capacity)),
            platform: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Two-tier mode: a larger shared cache is consulted on session miss,
    /// and shared hits are promoted into the session cache.
    pub fn with_platform_cache(capacity: usize) -> Self {
        Self {
            session: Mutex::new(LruCache::new(capacity)),
            platform: Some(Mutex::new(LruCache::new(
                capacity * PLATFORM_CAPACITY_FACTOR,
            ))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached response for this metadata shape, without decompressing.
    ///
    /// A hit moves the entry to most-recently-used and bumps its counter.
    pub fn try_fast_path(&self, meta: &ExtractedMetadata) -> Option<String> {
        let key = signature_key(meta);

        if let Some(response) = self.session_lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(response);
        }

        if let Some(response) = self.platform_lookup(key) {
            // Promote the shared hit into the session tier.
            if let Ok(mut session) = self.session.lock() {
                session.put(key, CachedResponse::new(response.clone()));
            }
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(response);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Record `response` under the current metadata shape.  Inserting past
    /// capacity evicts the least-recently-used entry.
    pub fn cache_response(&self, meta: &ExtractedMetadata, response: &str) {
        let key = signature_key(meta);

        if let Ok(mut session) = self.session.lock() {
            match session.get_mut(&key) {
                Some(entry) => {
                    entry.response = response.to_string();
                    entry.touch();
                }
                None => {
                    session.put(key, CachedResponse::new(response.to_string()));
                }
            }
        }

        if let Some(platform) = &self.platform {
            if let Ok(mut platform) = platform.lock() {
                if platform.peek(&key).is_none() {
                    platform.put(key, CachedResponse::new(response.to_string()));
                }
            }
        }
    }

    pub fn cache_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Entries currently held in the session tier.
    pub fn session_len(&self) -> usize {
        self.session.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn session_lookup(&self, key: u64) -> Option<String> {
        let mut session = self.session.lock().ok()?;
        let entry = session.get_mut(&key)?;
        entry.touch();
        Some(entry.response.clone())
    }

    fn platform_lookup(&self, key: u64) -> Option<String> {
        let platform = self.platform.as_ref()?;
        let mut platform = platform.lock().ok()?;
        let entry = platform.get_mut(&key)?;
        entry.touch();
        Some(entry.response.clone())
    }
}

impl Default for ConversationAccelerator {
    fn default() -> Self {
        Self::new()
    }
}
