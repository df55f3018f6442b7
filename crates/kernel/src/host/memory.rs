//! In-memory content host.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use custom_objects_sdk::HostError;
use custom_objects_sdk::host::{ContentHost, ContentStore, Translator};
use custom_objects_sdk::types::{
    Record, RecordInput, RecordQuery, ResourceConfig, TaxonomyConfig, TaxonomyRecord, TermRecord,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use regex::Regex;
use tracing::{debug, info};

#[allow(clippy::expect_used)]
static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex literal"));

/// Lowercase `text` and join its alphanumeric runs with dashes.
pub fn slugify(text: &str) -> String {
    NON_SLUG
        .replace_all(&text.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// (domain, context, text); context is empty when absent.
type CatalogKey = (String, String, String);

/// A content host keeping everything in process memory.
///
/// Registries are concurrent maps; records and terms sit behind
/// `parking_lot` locks so listing sees a consistent snapshot.
pub struct InMemoryHost {
    site_url: String,
    types: DashMap<String, ResourceConfig>,
    taxonomies: DashMap<String, TaxonomyRecord>,
    catalog: DashMap<CatalogKey, String>,
    records: RwLock<BTreeMap<u64, Record>>,
    /// Keyed by (taxonomy, term id).
    terms: RwLock<BTreeMap<(String, u64), TermRecord>>,
    /// Terms attached to each record.
    record_terms: RwLock<BTreeMap<u64, BTreeSet<(String, u64)>>>,
    next_record_id: AtomicU64,
    next_term_id: AtomicU64,
}

impl InMemoryHost {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            types: DashMap::new(),
            taxonomies: DashMap::new(),
            catalog: DashMap::new(),
            records: RwLock::new(BTreeMap::new()),
            terms: RwLock::new(BTreeMap::new()),
            record_terms: RwLock::new(BTreeMap::new()),
            next_record_id: AtomicU64::new(1),
            next_term_id: AtomicU64::new(1),
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn is_type_registered(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Configuration a resource type was registered with.
    pub fn type_config(&self, name: &str) -> Option<ResourceConfig> {
        self.types.get(name).map(|c| c.value().clone())
    }

    /// Registered taxonomy names, sorted.
    pub fn taxonomy_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.taxonomies.iter().map(|t| t.key().clone()).collect();
        names.sort();
        names
    }

    /// Add a catalog entry used by [`Translator::translate`].
    pub fn add_translation(
        &self,
        domain: impl Into<String>,
        text: impl Into<String>,
        translated: impl Into<String>,
    ) {
        self.catalog
            .insert((domain.into(), String::new(), text.into()), translated.into());
    }

    /// Add a catalog entry used by [`Translator::translate_with_context`].
    pub fn add_contextual_translation(
        &self,
        domain: impl Into<String>,
        context: impl Into<String>,
        text: impl Into<String>,
        translated: impl Into<String>,
    ) {
        self.catalog.insert(
            (domain.into(), context.into(), text.into()),
            translated.into(),
        );
    }

    /// Store a taxonomy directly, replacing any previous one.
    pub fn put_taxonomy(&self, taxonomy: TaxonomyRecord) {
        self.taxonomies.insert(taxonomy.name.clone(), taxonomy);
    }

    /// Store a record directly, keeping its id.
    pub fn put_record(&self, record: Record) {
        self.next_record_id
            .fetch_max(record.id + 1, Ordering::Relaxed);
        self.records.write().insert(record.id, record);
    }

    /// Store a term directly, keeping its id.
    pub fn put_term(&self, term: TermRecord) {
        self.next_term_id.fetch_max(term.term_id + 1, Ordering::Relaxed);
        self.terms
            .write()
            .insert((term.taxonomy.clone(), term.term_id), term);
    }

    /// Create a term in a registered taxonomy.
    pub fn insert_term(
        &self,
        taxonomy: &str,
        name: &str,
        parent: u64,
    ) -> Result<TermRecord, HostError> {
        if !self.taxonomies.contains_key(taxonomy) {
            return Err(HostError::not_found("taxonomy", taxonomy));
        }

        let mut terms = self.terms.write();
        if parent != 0 && !terms.contains_key(&(taxonomy.to_string(), parent)) {
            return Err(HostError::not_found("term", parent));
        }
        let slug = slugify(name);
        if terms
            .values()
            .any(|t| t.taxonomy == taxonomy && t.slug == slug)
        {
            return Err(HostError::duplicate("term", slug));
        }

        let id = self.next_term_id.fetch_add(1, Ordering::Relaxed);
        let term = TermRecord {
            term_id: id,
            term_taxonomy_id: id,
            taxonomy: taxonomy.to_string(),
            name: name.to_string(),
            slug,
            parent,
            count: 0,
        };
        terms.insert((taxonomy.to_string(), id), term.clone());
        debug!(taxonomy, term = id, "term created");
        Ok(term)
    }

    /// Attach a term to a record, bumping the term's count.
    pub fn tag_record(&self, record_id: u64, taxonomy: &str, term_id: u64) -> Result<(), HostError> {
        if !self.records.read().contains_key(&record_id) {
            return Err(HostError::not_found("record", record_id));
        }

        let key = (taxonomy.to_string(), term_id);
        let mut terms = self.terms.write();
        let term = terms
            .get_mut(&key)
            .ok_or_else(|| HostError::not_found("term", term_id))?;

        if self
            .record_terms
            .write()
            .entry(record_id)
            .or_default()
            .insert(key)
        {
            term.count += 1;
        }
        Ok(())
    }

    /// Terms attached to a record, in taxonomy then id order.
    pub fn record_terms(&self, record_id: u64) -> Vec<TermRecord> {
        let keys: Vec<_> = self
            .record_terms
            .read()
            .get(&record_id)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default();
        let terms = self.terms.read();
        keys.iter()
            .filter_map(|key| terms.get(key).cloned())
            .collect()
    }

    fn detach_record(&self, record_id: u64) {
        let Some(keys) = self.record_terms.write().remove(&record_id) else {
            return;
        };
        let mut terms = self.terms.write();
        for key in keys {
            if let Some(term) = terms.get_mut(&key) {
                term.count = term.count.saturating_sub(1);
            }
        }
    }

    fn lookup(&self, domain: &str, context: &str, text: &str) -> Option<String> {
        self.catalog
            .get(&(domain.to_string(), context.to_string(), text.to_string()))
            .map(|t| t.value().clone())
    }
}

impl ContentHost for InMemoryHost {
    fn register_type(&self, name: &str, config: &ResourceConfig) -> Result<(), HostError> {
        match self.types.entry(name.to_string()) {
            Entry::Occupied(_) => Err(HostError::duplicate("resource type", name)),
            Entry::Vacant(slot) => {
                slot.insert(config.clone());
                info!(resource = %name, "host registered resource type");
                Ok(())
            }
        }
    }

    fn register_taxonomy(&self, name: &str, config: &TaxonomyConfig) -> Result<(), HostError> {
        match self.taxonomies.entry(name.to_string()) {
            Entry::Occupied(_) => Err(HostError::duplicate("taxonomy", name)),
            Entry::Vacant(slot) => {
                slot.insert(TaxonomyRecord::from_config(name, config));
                info!(taxonomy = %name, "host registered taxonomy");
                Ok(())
            }
        }
    }
}

impl ContentStore for InMemoryHost {
    fn list_records(
        &self,
        record_type: &str,
        query: &RecordQuery,
    ) -> Result<Vec<Record>, HostError> {
        let page = query.page.max(1) as usize;
        let per_page = query.per_page as usize;

        let records = self.records.read();
        Ok(records
            .values()
            .rev()
            .filter(|r| r.record_type == record_type)
            .filter(|r| match &query.status {
                Some(status) => &r.status == status,
                None => r.status != "trash",
            })
            .skip((page - 1) * per_page)
            .take(per_page)
            .cloned()
            .collect())
    }

    fn get_record(&self, id: u64) -> Result<Option<Record>, HostError> {
        Ok(self.records.read().get(&id).cloned())
    }

    fn create_record(&self, record_type: &str, input: RecordInput) -> Result<Record, HostError> {
        if !self.types.contains_key(record_type) {
            return Err(HostError::Invalid(format!(
                "unknown resource type `{record_type}`"
            )));
        }

        let id = self.next_record_id.fetch_add(1, Ordering::Relaxed);
        let now = chrono::Utc::now().timestamp();
        let title = input.title.unwrap_or_default();
        let slug = input
            .slug
            .map(|s| slugify(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| match slugify(&title) {
                s if s.is_empty() => id.to_string(),
                s => s,
            });

        let record = Record {
            id,
            record_type: record_type.to_string(),
            title,
            content: input.content.unwrap_or_default(),
            excerpt: input.excerpt.unwrap_or_default(),
            status: input.status.unwrap_or_else(|| "draft".to_string()),
            slug,
            parent: input.parent.unwrap_or(0),
            created: now,
            changed: now,
            fields: input.fields,
        };
        self.records.write().insert(id, record.clone());
        Ok(record)
    }

    fn update_record(&self, id: u64, input: RecordInput) -> Result<Record, HostError> {
        let mut records = self.records.write();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| HostError::not_found("record", id))?;

        if let Some(title) = input.title {
            record.title = title;
        }
        if let Some(content) = input.content {
            record.content = content;
        }
        if let Some(excerpt) = input.excerpt {
            record.excerpt = excerpt;
        }
        if let Some(status) = input.status {
            record.status = status;
        }
        if let Some(slug) = input.slug {
            record.slug = slugify(&slug);
        }
        if let Some(parent) = input.parent {
            record.parent = parent;
        }
        record.fields.extend(input.fields);
        record.changed = chrono::Utc::now().timestamp();

        Ok(record.clone())
    }

    fn delete_record(&self, id: u64, force: bool) -> Result<(), HostError> {
        if force {
            self.records
                .write()
                .remove(&id)
                .ok_or_else(|| HostError::not_found("record", id))?;
            self.detach_record(id);
        } else {
            let mut records = self.records.write();
            let record = records
                .get_mut(&id)
                .ok_or_else(|| HostError::not_found("record", id))?;
            record.status = "trash".to_string();
            record.changed = chrono::Utc::now().timestamp();
        }
        Ok(())
    }

    fn record_link(&self, record: &Record) -> String {
        format!(
            "{}/{}/{}/",
            self.site_url, record.record_type, record.slug
        )
    }

    fn object_taxonomies(&self, record_type: &str) -> Result<Vec<TaxonomyRecord>, HostError> {
        let mut taxonomies: Vec<_> = self
            .taxonomies
            .iter()
            .filter(|t| t.applies_to(record_type))
            .map(|t| t.value().clone())
            .collect();
        taxonomies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(taxonomies)
    }

    fn get_taxonomy(&self, name: &str) -> Result<Option<TaxonomyRecord>, HostError> {
        Ok(self.taxonomies.get(name).map(|t| t.value().clone()))
    }

    fn list_terms(&self, taxonomy: &str) -> Result<Vec<TermRecord>, HostError> {
        let mut terms: Vec<_> = self
            .terms
            .read()
            .values()
            .filter(|t| t.taxonomy == taxonomy)
            .cloned()
            .collect();
        terms.sort_by(|a, b| a.name.cmp(&b.name).then(a.term_id.cmp(&b.term_id)));
        Ok(terms)
    }

    fn get_term(&self, taxonomy: &str, term_id: u64) -> Result<Option<TermRecord>, HostError> {
        Ok(self
            .terms
            .read()
            .get(&(taxonomy.to_string(), term_id))
            .cloned())
    }

    fn term_link(&self, term: &TermRecord) -> Result<String, HostError> {
        if !self.taxonomies.contains_key(&term.taxonomy) {
            return Err(HostError::not_found("taxonomy", &term.taxonomy));
        }
        Ok(format!(
            "{}/{}/{}/",
            self.site_url, term.taxonomy, term.slug
        ))
    }
}

impl Translator for InMemoryHost {
    fn translate(&self, text: &str, domain: &str) -> String {
        self.lookup(domain, "", text)
            .unwrap_or_else(|| text.to_string())
    }

    fn translate_with_context(&self, text: &str, context: &str, domain: &str) -> String {
        self.lookup(domain, context, text)
            .unwrap_or_else(|| text.to_string())
    }
}
