//! Audit-sink boundary.
//!
//! Compliance logging itself lives outside this crate; what lives here is
//! the interface the codec calls after a successful decode.  The sink is an
//! explicit handle injected into the compressor, never a process-wide
//! global, with init and teardown owned by the caller.

use crate::metadata::ExtractedMetadata;

/// One decoded message presented to the audit sink.
#[derive(Debug)]
pub struct AuditEntry<'a> {
    pub plaintext: &'a str,
    pub compressed: &'a [u8],
    pub metadata: &'a ExtractedMetadata,
    pub session_id: Option<&'a str>,
    pub user_id: Option<&'a str>,
}

/// Sink for post-decode compliance records.
///
/// Implementations return an entry id of their own choosing.  Sinks are
/// called best-effort: the codec ignores the returned id and never lets a
/// sink failure surface as a decode failure.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry<'_>) -> u64;
}
