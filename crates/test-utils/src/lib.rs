//! Custom objects test utilities.
//!
//! Fixture builders for host-side records used across kernel tests.

use std::collections::BTreeMap;

use custom_objects_sdk::types::{LabelSet, Record, TaxonomyRecord, TermRecord};

/// Timestamp every fixture record is created at (2023-11-14T22:13:20Z).
pub const FIXTURE_TIMESTAMP: i64 = 1_700_000_000;

/// A published record of `record_type` titled `title`.
pub fn test_record(id: u64, record_type: &str, title: &str) -> Record {
    Record {
        id,
        record_type: record_type.to_string(),
        title: title.to_string(),
        content: String::new(),
        excerpt: String::new(),
        status: "publish".to_string(),
        slug: slug(title),
        parent: 0,
        created: FIXTURE_TIMESTAMP,
        changed: FIXTURE_TIMESTAMP,
        fields: BTreeMap::new(),
    }
}

/// A public, hierarchical taxonomy named `name` classifying `object_types`.
///
/// Its label is the capitalized name with an `s` appended.
pub fn test_taxonomy(name: &str, object_types: &[&str]) -> TaxonomyRecord {
    let singular = capitalize(name);
    let label = format!("{singular}s");
    TaxonomyRecord {
        name: name.to_string(),
        labels: [("name", label.as_str()), ("singular_name", singular.as_str())]
            .into_iter()
            .collect::<LabelSet>(),
        label,
        public: true,
        show_tagcloud: true,
        hierarchical: true,
        object_types: object_types.iter().map(|t| t.to_string()).collect(),
    }
}

/// A term whose taxonomy-term id equals its term id.
pub fn test_term(id: u64, taxonomy: &str, name: &str, parent: u64) -> TermRecord {
    TermRecord {
        term_id: id,
        term_taxonomy_id: id,
        taxonomy: taxonomy.to_string(),
        name: name.to_string(),
        slug: slug(name),
        parent,
        count: 0,
    }
}

fn slug(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
