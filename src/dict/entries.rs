//! Built-in phrase table.
//!
//! Phrases are skewed toward AI/chat support responses: opening formulas,
//! hedges, instruction fragments, and technical vocabulary.  Every phrase is
//! at least [`MIN_PHRASE_LEN`](crate::codec::MIN_PHRASE_LEN) bytes; shorter
//! phrases can never be emitted as dictionary tokens and would only fragment
//! the LZ77 chunking.  Ids are dense, assigned by table position, and must
//! stay below 256 to fit the 1-byte wire field.

use once_cell::sync::Lazy;

use super::trie::DictionaryTrie;

/// One immutable dictionary phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Dense id, equal to the phrase's table position.
    pub id: u16,
    pub phrase: &'static str,
}

impl DictionaryEntry {
    /// Raw bytes of the phrase (always valid UTF-8).
    pub fn phrase_bytes(&self) -> &'static [u8] {
        self.phrase.as_bytes()
    }
}

#[rustfmt::skip]
static PHRASES: &[&str] = &[
    // Support-response openers
    "I don't have access to ",
    "Please check ",
    "Yes, I can help with that.",
    "What specific ",
    "I recommend: ",
    "How do I ",
    "What's the ",
    "Please provide ",
    "Error: ",
    "I cannot ",
    "I'm unable to ",
    "You can ",
    "Here's how to ",
    "Here's an example: ",
    "For example: ",
    "In other words, ",
    "Keep in mind that ",
    "Note that ",
    "It depends on ",
    "The main difference ",
    "Let me know if ",
    "would you like to know more about",
    "Could you clarify ",

    // Longer canned support sentences
    "I can walk you through the validation checklist so no step gets missed.",
    "Let me outline the diagnostics flow so you have a concrete sequence to follow.",
    "I'll summarize the likely root causes and the quick checks you can run right away.",
    "Here is a compact troubleshooting matrix so you can triage without waiting on logs.",
    "I'll include the policy reminders so you stay compliant with security guidance.",
    "I'll expand each SLA dimension so the expectations stay crystal clear.",
    "I'll reference the knowledge base article so you can share it with the requester if needed.",
    "Let me spell out the reasoning so you can trace every step without guessing.",
    "I'll include a short checklist you can keep handy for similar requests.",
    "I'll add context and guardrails so anyone picking this up later has everything they need.",
    "I'll provide a concise action plan plus a quick rollback path just in case.",
    "I'll map each configuration lever to the operational impact so you can explain it quickly.",
    "I can list the qualifying criteria for each tier so you choose the right one.",
    "I'll log the context and next actions so observers know the state.",
    "I'll add the alert thresholds we typically use so you can compare them with your targets.",
    "I'll walk through the reset wizard steps so you can prep the user ahead of time.",
    "I'll point out the rollback command in case you need to revert fast.",
    "I can share the changelog summary so you have extra background ready.",
    "I'll highlight the pre-deployment checks so you can confirm cluster health first.",
    "I will call out each security setting so you can confirm it before committing the change.",

    // Instruction fragments
    "install ",
    "configure ",
    "monitor ",
    "optimize ",
    "restart ",
    "upgrade ",
    "validate ",
    "authenticate ",
    "initialize ",
    "double-check ",
    "make sure ",
    "you need to ",
    "you should ",
    "the following ",
    "as follows: ",
    "step by step",
    "command line",
    "environment variable",
    "configuration file",
    "pip install ",
    "cargo build",
    "npm install ",

    // Technical vocabulary
    "performance",
    "deployment",
    "database",
    "function",
    "variable",
    "parameter",
    "argument",
    "response",
    "request",
    "endpoint",
    "interface",
    "implementation",
    "application",
    "authentication",
    "authorization",
    "certificate",
    "connection",
    "container",
    "dependency",
    "directory",
    "documentation",
    "encryption",
    "exception",
    "expression",
    "framework",
    "infrastructure",
    "integration",
    "kubernetes",
    "library",
    "message",
    "middleware",
    "migration",
    "network",
    "operation",
    "package",
    "pipeline",
    "process",
    "production",
    "protocol",
    "repository",
    "resource",
    "server",
    "service",
    "session",
    "storage",
    "timeout",
    "transaction",
    "version",
    "workflow",
    "algorithm",
    "backend",
    "frontend",
    "cluster",
    "compile",
    "debugging",
    "latency",
    "throughput",
    "scalability",
    "reliability",
    "observability",
    "monitoring",
    "logging",
    "metrics",
    "schema",
    "indexing",
    "queries",
    "caching",

    // Frequent English fragments (with surrounding spaces so that runs of
    // prose collapse into single tokens)
    " because ",
    " therefore ",
    " however, ",
    " instead of ",
    " in order to ",
    " as well as ",
    " such as ",
    " for instance ",
    " depending on ",
    " according to ",
    " available ",
    " different ",
    " possible ",
    " recommended ",
    " required ",
    " specific ",
    " typically ",
    " usually ",
    " example ",
    " important ",
    " information ",
    " question ",
    " solution ",
    " problem ",
    " should ",
    " would ",
    " could ",
    " about ",
    " between ",
    " through ",
    " without ",
    " within ",
];

static ENTRIES: Lazy<Vec<DictionaryEntry>> = Lazy::new(|| {
    debug_assert!(PHRASES.len() <= 256, "ids must fit the 1-byte wire field");
    PHRASES
        .iter()
        .enumerate()
        .map(|(id, phrase)| DictionaryEntry {
            id: id as u16,
            phrase,
        })
        .collect()
});

static TRIE: Lazy<DictionaryTrie> = Lazy::new(|| {
    let mut trie = DictionaryTrie::new();
    for entry in ENTRIES.iter() {
        trie.insert(entry.phrase_bytes(), entry.id);
    }
    trie
});

/// Entry for a dense dictionary id, `None` when out of range.
pub fn by_id(id: u16) -> Option<&'static DictionaryEntry> {
    ENTRIES.get(id as usize)
}

/// Number of built-in phrases.
pub fn entry_count() -> usize {
    ENTRIES.len()
}

/// The shared prefix-matching trie over the built-in table.
pub fn builtin_trie() -> &'static DictionaryTrie {
    &TRIE
}
