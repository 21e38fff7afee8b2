//! Parameterized response templates.
//!
//! A template is a pattern with `{0}..{n}` slot placeholders compiled into
//! two matchers: an anchored full-match regex and an unanchored partial
//! variant used for substring search.  The static set covers common AI
//! response shapes; two reserved id ranges accept templates discovered at
//! runtime (platform-wide and per-client).

pub mod library;
pub mod patterns;

pub use library::{TemplateLibrary, TemplateMatch};
pub use patterns::{
    default_templates, CLIENT_SYNC_RANGE_END, CLIENT_SYNC_RANGE_START, DYNAMIC_RANGE_END,
    DYNAMIC_RANGE_START, STATIC_RANGE_END,
};
