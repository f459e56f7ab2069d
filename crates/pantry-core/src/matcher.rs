//! Ingredient name normalization and reconciliation.
//!
//! Matching is intentionally loose: "onion" satisfies "red onions" and
//! "chicken breast" satisfies "chicken". False positives are preferred over
//! telling the user to buy something they already have.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::types::IngredientRef;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Canonical form of an ingredient name.
///
/// Lowercases, strips punctuation, collapses whitespace, then drops one
/// trailing "es" or (failing that) one trailing "s".
pub fn normalize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let lowered = name.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, "");
    let collapsed = WHITESPACE.replace_all(&stripped, " ");
    let trimmed = collapsed.trim();

    if let Some(stem) = trimmed.strip_suffix("es") {
        stem.to_string()
    } else if let Some(stem) = trimmed.strip_suffix('s') {
        stem.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Required ingredients the user does not have, in the original order.
///
/// Entries with empty names on either side are ignored.
pub fn find_missing<S: AsRef<str>>(required: &[IngredientRef], owned: &[S]) -> Vec<IngredientRef> {
    let owned_set: BTreeSet<String> = owned
        .iter()
        .map(|name| normalize(name.as_ref()))
        .filter(|name| !name.is_empty())
        .collect();

    let missing: Vec<IngredientRef> = required
        .iter()
        .filter(|ingredient| {
            let candidate = normalize(&ingredient.name);
            !candidate.is_empty() && !is_satisfied(&candidate, &owned_set)
        })
        .cloned()
        .collect();

    tracing::debug!(
        required = required.len(),
        owned = owned.len(),
        missing = missing.len(),
        "Ingredient comparison complete"
    );

    missing
}

fn is_satisfied(candidate: &str, owned: &BTreeSet<String>) -> bool {
    owned.contains(candidate)
        || owned
            .iter()
            .any(|have| have.contains(candidate) || candidate.contains(have.as_str()))
}
