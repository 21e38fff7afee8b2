//! Byte-level trie for dictionary prefix matching.
//!
//! Replaces a linear scan over the phrase table with a single O(m) walk,
//! where m is the length of the matched phrase.  Nodes store the entry id of
//! any phrase terminating at them; the longest terminal seen during the walk
//! wins, so the best match is unambiguous by construction.

use std::collections::HashMap;

#[derive(Default)]
struct TrieNode {
    children: HashMap<u8, TrieNode>,
    /// Entry id of the phrase ending at this node, if any.
    entry_id: Option<u16>,
}

/// Prefix-matching trie over raw phrase bytes.
pub struct DictionaryTrie {
    root: TrieNode,
    len: usize,
}

impl DictionaryTrie {
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            len: 0,
        }
    }

    /// Number of phrases inserted.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `phrase` with its dictionary entry id.
    pub fn insert(&mut self, phrase: &[u8], entry_id: u16) {
        let mut node = &mut self.root;
        for &byte in phrase {
            node = node.children.entry(byte).or_default();
        }
        if node.entry_id.is_none() {
            self.len += 1;
        }
        node.entry_id = Some(entry_id);
    }

    /// Entry id of the longest phrase that is a prefix of `data[pos..]`.
    ///
    /// Walks the trie byte-by-byte, remembering the deepest terminal node
    /// passed.  Returns `None` when no phrase matches; bytes that are not
    /// valid UTF-8 can never reach a terminal since all phrases are UTF-8.
    pub fn longest_prefix_id(&self, data: &[u8], pos: usize) -> Option<u16> {
        let mut node = &self.root;
        let mut best = None;
        for &byte in &data[pos..] {
            match node.children.get(&byte) {
                Some(child) => node = child,
                None => break,
            }
            if node.entry_id.is_some() {
                best = node.entry_id;
            }
        }
        best
    }

}

impl Default for DictionaryTrie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_terminal_wins() {
        let mut trie = DictionaryTrie::new();
        trie.insert(b"install", 1);
        trie.insert(b"install the package", 2);
        assert_eq!(trie.longest_prefix_id(b"install the package now", 0), Some(2));
        assert_eq!(trie.longest_prefix_id(b"install it", 0), Some(1));
        assert_eq!(trie.longest_prefix_id(b"inst", 0), None);
    }

    #[test]
    fn match_respects_position() {
        let mut trie = DictionaryTrie::new();
        trie.insert(b"error", 7);
        assert_eq!(trie.longest_prefix_id(b"an error", 3), Some(7));
        assert_eq!(trie.longest_prefix_id(b"an error", 0), None);
    }

    #[test]
    fn invalid_utf8_input_matches_nothing() {
        let mut trie = DictionaryTrie::new();
        trie.insert("caf\u{e9}".as_bytes(), 3);
        assert_eq!(trie.longest_prefix_id(&[0xFF, 0xFE, 0xFD], 0), None);
    }
}
