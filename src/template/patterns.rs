//! Built-in template set and reserved id ranges.
//!
//! Id layout:
//! - `0..=127`   static templates (this table)
//! - `128..=191` platform-discovered templates, allocated at runtime
//! - `192..=255` client-discovered templates, synced from the client side
//!
//! All ids must stay below 256 to fit the 1-byte wire field of the template
//! token.

/// Last id of the static range (inclusive).
pub const STATIC_RANGE_END: u16 = 127;

/// First id reserved for platform-discovered templates.
pub const DYNAMIC_RANGE_START: u16 = 128;
/// One past the last platform-discovered id.
pub const DYNAMIC_RANGE_END: u16 = 192;

/// First id reserved for client-synced templates.
pub const CLIENT_SYNC_RANGE_START: u16 = 192;
/// One past the last client-synced id.
pub const CLIENT_SYNC_RANGE_END: u16 = 256;

/// The built-in static template table, `(id, pattern)` in ascending id order.
pub fn default_templates() -> &'static [(u16, &'static str)] {
    DEFAULT_TEMPLATES
}

#[rustfmt::skip]
static DEFAULT_TEMPLATES: &[(u16, &str)] = &[
    // Common responses (0-19)
    (0, "Yes"),
    (1, "No"),
    (2, "I don't know"),
    (3, "I'm not sure"),
    (4, "That's correct"),
    (5, "That's incorrect"),
    (6, "Maybe"),
    (7, "Probably"),
    (8, "Definitely"),
    (9, "Absolutely"),

    // Limitations & abilities (20-39)
    (20, "I don't have access to {0}."),
    (21, "I don't have access to {0}. {1}"),
    (22, "I cannot {0}."),
    (23, "I'm unable to {0}."),
    (24, "I can't {0}."),
    (25, "I can help with {0}."),
    (26, "I can help you {0}."),
    (27, "I'm able to {0}."),

    // Facts & definitions (40-59)
    (40, "{0} is {1}."),
    (41, "{0} are {1}."),
    (42, "The {0} is {1}."),
    (43, "The {0} are {1}."),
    (44, "The {0} of {1} is {2}."),
    (45, "{0} means {1}."),
    (46, "{0} refers to {1}."),

    // Questions (60-69)
    (60, "What {0}?"),
    (61, "Why {0}?"),
    (62, "How {0}?"),
    (63, "When {0}?"),
    (64, "Where {0}?"),
    (65, "Can you {0}?"),
    (66, "Could you {0}?"),
    (67, "Would you {0}?"),
    (68, "Could you clarify {0}?"),
    (69, "What specific {0} would you like to know more about?"),

    // Instructions & recommendations (70-89)
    (70, "To {0}, {1}."),
    (71, "To {0}, use {1}."),
    (72, "To {0}, use {1}: `{2}`"),
    (73, "You can {0} by {1}."),
    (74, "Try {0}."),
    (75, "I recommend {0}."),
    (76, "I suggest {0}."),
    (77, "Consider {0}."),
    (78, "To {0}, I recommend: {1}"),

    // Explanations (90-99)
    (90, "{0} works by {1}."),
    (91, "{0} is used for {1}."),
    (92, "The {0} of {1} is {2} because {3}."),
    (93, "{0} because {1}."),
    (94, "This is {0}."),
    (95, "This means {0}."),

    // Code examples (100-109)
    (100, "```{0}\n{1}\n```"),
    (101, "Here's an example: `{0}`"),
    (102, "Here's how to {0}:\n\n```{1}\n{2}\n```"),
    (103, "For example: {0}"),

    // Lists & enumerations (110-119)
    (110, "Common {0} include: {1}."),
    (111, "The main {0} are: {1}."),
    (112, "Examples include: {0}."),
    (113, "{0}, {1}, and {2}."),
    (114, "{0} and {1}."),

    // Comparisons (120-127)
    (120, "The main {0} between {1} are: {2}"),
    (121, "{0} and {1} are different: {0} {2}, {1} {3}."),
    (122, "{0} is better than {1} because {2}."),
    (123, "{0} is similar to {1}."),
    (124, "{0} differs from {1} in {2}."),
    (125, "Unlike {0}, {1} {2}."),
    (126, "Both {0} and {1} {2}."),
    (127, "Neither {0} nor {1} {2}."),
];
