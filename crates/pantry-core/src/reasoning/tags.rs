//! Tag grammar used by the reasoning model.
//!
//! The prompt instructs the model to annotate its reply with:
//! - `[REASONING TYPE: X]` for each reasoning step
//! - `[UNCERTAINTY: X]` for anything it is unsure about
//! - `[ERROR: X]` for missing or invalid information
//! - a `SELF-CHECK` section
//!
//! This grammar is a contract with the remote model's output format. Keep the
//! patterns here in sync with the prompt text in `pantry-runtime`.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    /// Self-check block: from the marker to a blank line, `ERROR HANDLING:` or end of text
    pub static ref SELF_CHECK_PATTERN: Regex = Regex::new(
        r"(?i)SELF-CHECK:?\s*([\s\S]*?)(?:\n\s*\n|ERROR HANDLING:|\z)"
    ).unwrap();

    /// `[REASONING TYPE: LOGICAL]`
    pub static ref REASONING_TYPE_PATTERN: Regex = Regex::new(
        r"(?i)\[REASONING TYPE:\s*([A-Z_]+)\s*\]"
    ).unwrap();

    /// `[UNCERTAINTY: ...]`
    pub static ref UNCERTAINTY_PATTERN: Regex = Regex::new(
        r"(?i)\[UNCERTAINTY:\s*(.*?)\]"
    ).unwrap();

    /// `[ERROR: ...]`
    pub static ref ERROR_PATTERN: Regex = Regex::new(
        r"(?i)\[ERROR:\s*(.*?)\]"
    ).unwrap();
}

/// Keywords that mark a tag as being about the user's preferences.
pub const PREFERENCE_KEYWORDS: [&str; 3] = ["preference", "cuisine", "food type"];

/// Returned when the reply has no self-check section.
pub const NO_SELF_CHECK: &str = "No explicit self-check section found.";

/// Extract the self-check block, or [`NO_SELF_CHECK`].
pub fn self_check(text: &str) -> String {
    SELF_CHECK_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| NO_SELF_CHECK.to_string())
}

/// Reasoning types used, upper-cased and deduplicated.
pub fn reasoning_types(text: &str) -> BTreeSet<String> {
    REASONING_TYPE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
        .collect()
}

/// Uncertainty messages, trimmed and deduplicated.
pub fn uncertainties(text: &str) -> BTreeSet<String> {
    collect_messages(&UNCERTAINTY_PATTERN, text)
}

/// Error messages, trimmed and deduplicated.
pub fn errors(text: &str) -> BTreeSet<String> {
    collect_messages(&ERROR_PATTERN, text)
}

/// Subset of messages that talk about preferences, cuisine or food type.
pub fn preference_related(messages: &BTreeSet<String>) -> BTreeSet<String> {
    messages
        .iter()
        .filter(|m| {
            let lowered = m.to_lowercase();
            PREFERENCE_KEYWORDS.iter().any(|k| lowered.contains(k))
        })
        .cloned()
        .collect()
}

fn collect_messages(pattern: &Regex, text: &str) -> BTreeSet<String> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}
