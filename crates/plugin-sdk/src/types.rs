//! Core types exchanged with the content host.
//!
//! Configuration objects ([`ResourceConfig`], [`TaxonomyConfig`]) are what the
//! kernel hands to the host at registration time. Records ([`Record`],
//! [`TaxonomyRecord`], [`TermRecord`]) are what the host hands back when REST
//! handlers read its storage.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Endpoint mask for single-record permalinks.
pub const EP_PERMALINK: u32 = 1;

/// Ordered mapping from label key (e.g. `add_new_item`) to display string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(IndexMap<String, String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a label, keeping the key's original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Permalink rewrite setting: a plain switch or explicit rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rewrite {
    Enabled(bool),
    Rules(RewriteRules),
}

/// Explicit rewrite rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRules {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_front: Option<bool>,
}

impl Rewrite {
    /// Rewrite rules using `slug` as the URL segment.
    pub fn slug(slug: impl Into<String>) -> Self {
        Self::Rules(RewriteRules {
            slug: slug.into(),
            with_front: None,
        })
    }
}

/// Query variable setting: a plain switch or a named variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryVar {
    Enabled(bool),
    Name(String),
}

/// Registration arguments for a custom resource type.
///
/// Serializes to the ordered option mapping the host consumes. Every field
/// has a default derived from the others; see the kernel's resource type
/// builder for the derivation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub label: String,
    pub labels: LabelSet,
    pub description: String,
    pub public: bool,
    pub exclude_from_search: bool,
    pub publicly_queryable: bool,
    pub show_ui: bool,
    pub show_in_nav_menus: bool,
    pub show_in_menu: bool,
    pub show_in_admin_bar: bool,
    pub menu_position: Option<u32>,
    pub menu_icon: Option<String>,
    pub capability_type: String,
    pub capabilities: IndexMap<String, String>,
    pub map_meta_cap: Option<bool>,
    pub hierarchical: bool,
    pub supports: Vec<String>,
    pub register_meta_box_cb: Option<String>,
    pub taxonomies: Vec<String>,
    pub has_archive: bool,
    pub permalink_epmask: u32,
    pub rewrite: Rewrite,
    pub query_var: QueryVar,
    pub can_export: bool,
    #[serde(rename = "_builtin")]
    pub builtin: bool,
    #[serde(rename = "_edit_link")]
    pub edit_link: String,
    pub rest_base: String,
}

/// Registration arguments for a custom taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub labels: LabelSet,
    pub public: bool,
    pub show_ui: bool,
    pub show_in_nav_menus: bool,
    pub show_tagcloud: bool,
    pub meta_box_cb: Option<String>,
    pub show_admin_column: bool,
    pub hierarchical: bool,
    pub update_count_callback: String,
    pub query_var: QueryVar,
    pub rewrite: Rewrite,
    pub capabilities: Option<IndexMap<String, String>>,
    pub sort: Option<bool>,
    #[serde(rename = "_builtin")]
    pub builtin: bool,
    pub object_type: Vec<String>,
}

/// A content record stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,

    /// Resource type name (e.g. "movie").
    #[serde(rename = "type")]
    pub record_type: String,

    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub excerpt: String,

    /// Publication status ("publish", "draft", "trash", ...).
    pub status: String,

    pub slug: String,

    /// Parent record id, 0 for none.
    #[serde(default)]
    pub parent: u64,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,

    /// Additional fields as key-value pairs.
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Input for creating or editing a record, as sent in a request body.
///
/// Every field is optional; on edit, absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordInput {
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Listing parameters for records of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    /// Restrict to one status; `None` lists everything except trash.
    pub status: Option<String>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            status: None,
        }
    }
}

/// A taxonomy as the host knows it after registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyRecord {
    pub name: String,
    pub label: String,
    pub labels: LabelSet,
    pub public: bool,
    pub show_tagcloud: bool,
    pub hierarchical: bool,
    pub object_types: Vec<String>,
}

impl TaxonomyRecord {
    /// Build the host-side record from registration arguments.
    pub fn from_config(name: &str, config: &TaxonomyConfig) -> Self {
        Self {
            name: name.to_string(),
            label: config.labels.get("name").unwrap_or(name).to_string(),
            labels: config.labels.clone(),
            public: config.public,
            show_tagcloud: config.show_tagcloud,
            hierarchical: config.hierarchical,
            object_types: config.object_type.clone(),
        }
    }

    /// Whether this taxonomy classifies records of `record_type`.
    pub fn applies_to(&self, record_type: &str) -> bool {
        self.object_types.iter().any(|t| t == record_type)
    }
}

/// One term within a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub term_id: u64,
    pub term_taxonomy_id: u64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    /// Parent term id, 0 for a root term.
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub count: u64,
}
