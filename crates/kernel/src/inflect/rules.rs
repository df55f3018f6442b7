//! English morphology tables.
//!
//! Order matters: specific and irregular patterns precede general ones, and
//! only the first matching rule is applied.

use std::sync::LazyLock;

use regex::Regex;

/// A compiled `(pattern, replacement)` pair.
///
/// Replacements use `regex` expansion syntax; a group that did not
/// participate in the match expands to the empty string.
pub(super) struct Rule {
    pub pattern: Regex,
    pub replacement: &'static str,
}

const SINGULAR: &[(&str, &str)] = &[
    (r"(matr)ices$", "${1}ix"),
    (r"(vert|ind)ices$", "${1}ex"),
    (r"^(ox)en", "${1}"),
    (r"(alias)es$", "${1}"),
    (r"([octop|vir])i$", "${1}us"),
    (r"(cris|ax|test)es$", "${1}is"),
    (r"(shoe)s$", "${1}"),
    (r"(o)es$", "${1}"),
    (r"(bus|campus)es$", "${1}"),
    (r"([m|l])ice$", "${1}ouse"),
    (r"(x|ch|ss|sh)es$", "${1}"),
    (r"(m)ovies$", "${1}ovie"),
    (r"(s)eries$", "${1}eries"),
    (r"([^aeiouy]|qu)ies$", "${1}y"),
    (r"([lr])ves$", "${1}f"),
    (r"(tive)s$", "${1}"),
    (r"(hive)s$", "${1}"),
    (r"([^f])ves$", "${1}fe"),
    (r"(^analy)ses$", "${1}sis"),
    (
        r"((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)ses$",
        "${1}${2}sis",
    ),
    (r"([ti])a$", "${1}um"),
    (r"(p)eople$", "${1}erson"),
    (r"(m)en$", "${1}an"),
    (r"(s)tatuses$", "${1}tatus"),
    (r"(c)hildren$", "${1}hild"),
    (r"(n)ews$", "${1}ews"),
    (r"([^us])s$", "${1}"),
];

const PLURAL: &[(&str, &str)] = &[
    (r"^(ox)$", "${1}en"),
    (r"([m|l])ouse$", "${1}ice"),
    (r"(matr|vert|ind)ix|ex$", "${1}ices"),
    (r"(x|ch|ss|sh)$", "${1}es"),
    (r"([^aeiouy]|qu)y$", "${1}ies"),
    (r"(hive)$", "${1}s"),
    (r"(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    (r"sis$", "ses"),
    (r"([ti])um$", "${1}a"),
    (r"(p)erson$", "${1}eople"),
    (r"(m)an$", "${1}en"),
    (r"(c)hild$", "${1}hildren"),
    (r"(buffal|tomat)o$", "${1}oes"),
    (r"(bu|campu)s$", "${1}ses"),
    (r"(alias|status|virus)$", "${1}es"),
    (r"(octop)us$", "${1}i"),
    (r"(ax|cris|test)is$", "${1}es"),
    // Already plural: leave as is.
    (r"s$", "s"),
    (r"$", "s"),
];

/// Compile a literal rule table.
///
/// # Panics
///
/// Panics if a hard-coded pattern is invalid (impossible in practice).
#[allow(clippy::expect_used)]
fn compile(table: &[(&str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .map(|&(pattern, replacement)| Rule {
            pattern: Regex::new(pattern).expect("valid inflection pattern"),
            replacement,
        })
        .collect()
}

pub(super) static SINGULAR_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| compile(SINGULAR));

pub(super) static PLURAL_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| compile(PLURAL));
