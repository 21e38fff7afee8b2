//! Static phrase dictionary with O(m) longest-prefix matching.
//!
//! The dictionary is built once at startup and is immutable afterwards, so
//! concurrent readers need no synchronisation.  Phrase ids are dense and fit
//! the 1-byte wire field used by the token serializer.

pub mod entries;
pub mod trie;

pub use entries::{builtin_trie, by_id, entry_count, DictionaryEntry};
pub use trie::DictionaryTrie;

/// Longest built-in dictionary phrase that is a prefix of `data[pos..]`.
///
/// Byte-oriented: invalid UTF-8 in `data` simply fails to match any phrase
/// rather than erroring.
pub fn longest_prefix_match_bytes(data: &[u8], pos: usize) -> Option<&'static DictionaryEntry> {
    builtin_trie().longest_prefix_id(data, pos).and_then(by_id)
}

/// Longest built-in dictionary phrase that is a prefix of `text[pos..]`
/// (`pos` in bytes).
pub fn longest_prefix_match(text: &str, pos: usize) -> Option<&'static DictionaryEntry> {
    longest_prefix_match_bytes(text.as_bytes(), pos)
}
