//! English singular/plural inflection.
//!
//! Both directions walk an ordered rule table and apply the first rule whose
//! pattern matches, then stop. Matching is case-sensitive and the input's
//! case is preserved. Uncountable words are returned unchanged.

mod rules;

use rules::{PLURAL_RULES, Rule, SINGULAR_RULES};

/// Words without a distinct plural form.
pub const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "meta",
];

/// Whether `word` has a plural form.
pub fn is_countable(word: &str) -> bool {
    let lower = word.to_lowercase();
    !UNCOUNTABLE.contains(&lower.as_str())
}

/// Take a plural word and make it singular.
///
/// Words no rule recognizes are returned unchanged.
pub fn singularize(word: &str) -> String {
    if !is_countable(word) {
        return word.to_string();
    }

    apply_first(&SINGULAR_RULES, word).unwrap_or_else(|| word.to_string())
}

/// Take a singular word and make it plural.
///
/// Words ending in `s` are treated as already plural.
pub fn pluralize(word: &str) -> String {
    if !is_countable(word) {
        return word.to_string();
    }

    // The table ends with a catch-all, so the fallback only mirrors it.
    apply_first(&PLURAL_RULES, word).unwrap_or_else(|| format!("{word}s"))
}

fn apply_first(rules: &[Rule], word: &str) -> Option<String> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(word))
        .map(|rule| {
            rule.pattern
                .replace_all(word, rule.replacement)
                .into_owned()
        })
}
