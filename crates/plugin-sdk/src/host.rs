//! The narrow interfaces a content host provides.
//!
//! The kernel never stores anything itself. It registers definitions through
//! [`ContentHost`], reads and writes records through [`ContentStore`], and
//! localizes labels through [`Translator`]. Hosts are expected to be shared
//! behind `Arc`, hence the `Send + Sync` bounds.

use crate::host_errors::HostError;
use crate::types::{
    Record, RecordInput, RecordQuery, ResourceConfig, TaxonomyConfig, TaxonomyRecord, TermRecord,
};

/// Type and taxonomy registration.
///
/// Registration is not idempotent: callers register each name at most once,
/// and hosts may reject a second registration with [`HostError::Duplicate`].
pub trait ContentHost: Send + Sync {
    /// Register a resource type under `name`.
    fn register_type(&self, name: &str, config: &ResourceConfig) -> Result<(), HostError>;

    /// Register a taxonomy under `name`; its object types are in `config.object_type`.
    fn register_taxonomy(&self, name: &str, config: &TaxonomyConfig) -> Result<(), HostError>;
}

/// Storage reads and writes used by the REST handlers.
///
/// `Ok(None)` means "no such thing"; errors are storage failures and are
/// propagated to the caller unchanged.
pub trait ContentStore: Send + Sync {
    fn list_records(&self, record_type: &str, query: &RecordQuery)
    -> Result<Vec<Record>, HostError>;

    fn get_record(&self, id: u64) -> Result<Option<Record>, HostError>;

    fn create_record(&self, record_type: &str, input: RecordInput) -> Result<Record, HostError>;

    fn update_record(&self, id: u64, input: RecordInput) -> Result<Record, HostError>;

    /// Delete a record. Without `force` the record is moved to trash.
    fn delete_record(&self, id: u64, force: bool) -> Result<(), HostError>;

    /// Public permalink of a record.
    fn record_link(&self, record: &Record) -> String;

    /// Taxonomies attached to `record_type`.
    fn object_taxonomies(&self, record_type: &str) -> Result<Vec<TaxonomyRecord>, HostError>;

    fn get_taxonomy(&self, name: &str) -> Result<Option<TaxonomyRecord>, HostError>;

    fn list_terms(&self, taxonomy: &str) -> Result<Vec<TermRecord>, HostError>;

    fn get_term(&self, taxonomy: &str, term_id: u64) -> Result<Option<TermRecord>, HostError>;

    /// Public archive link of a term.
    fn term_link(&self, term: &TermRecord) -> Result<String, HostError>;
}

/// Localization lookup.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, domain: &str) -> String;

    /// Translate `text` disambiguated by `context`.
    fn translate_with_context(&self, text: &str, context: &str, domain: &str) -> String;
}

/// A translator that returns every string unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Translator for PassThrough {
    fn translate(&self, text: &str, _domain: &str) -> String {
        text.to_string()
    }

    fn translate_with_context(&self, text: &str, _context: &str, _domain: &str) -> String {
        text.to_string()
    }
}
