//! REST endpoints for the taxonomies of one resource type.
//!
//! Routes live under the resource's base:
//!
//! ```text
//! /movies/taxonomies
//! /movies/taxonomies/{taxonomy}
//! /movies/taxonomies/{taxonomy}/terms
//! /movies/taxonomies/{taxonomy}/terms/{term}
//! ```
//!
//! Term writes are accepted and ignored.

use std::fmt;
use std::sync::Arc;

use custom_objects_sdk::host::ContentStore;
use custom_objects_sdk::types::{TaxonomyRecord, TermRecord};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::links::LinkBuilder;
use super::route_table::{Capability, DispatchArgs, DispatchFilter, RouteTable};
use crate::error::{ApiError, ApiResponse, EndpointError, EndpointResult};
use crate::registrar::ResourceType;

/// How deep a term is being serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermContext {
    /// Top level: a non-zero parent is expanded into a nested term.
    View,
    /// Nested parent: its own parent stays a numeric id.
    ViewParent,
}

/// Taxonomy and term routes for one resource type.
pub struct TaxonomyEndpoints {
    resource: String,
    base: String,
    store: Arc<dyn ContentStore>,
    links: LinkBuilder,
}

impl TaxonomyEndpoints {
    pub fn new(
        resource: impl Into<String>,
        base: impl Into<String>,
        store: Arc<dyn ContentStore>,
        links: LinkBuilder,
    ) -> Self {
        Self {
            resource: resource.into(),
            base: base.into(),
            store,
            links,
        }
    }

    pub fn for_resource(
        resource: &ResourceType,
        store: Arc<dyn ContentStore>,
        links: LinkBuilder,
    ) -> Self {
        Self::new(resource.name(), resource.route_base(), store, links)
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn routes(self: &Arc<Self>) -> RouteTable {
        let collection = format!("{}/taxonomies", self.base);
        let taxonomy = format!(r"{collection}/(?P<taxonomy>[\w-]+)");
        let terms = format!("{taxonomy}/terms");
        let term = format!(r"{terms}/(?P<term>\w+)");

        let mut table = RouteTable::new();
        table.add(&collection, Capability::READABLE, self.bind(Self::list_taxonomies));
        table.add(&taxonomy, Capability::READABLE, self.bind(Self::get_taxonomy));
        table.add(&terms, Capability::READABLE, self.bind(Self::list_terms));
        table.add(
            &terms,
            Capability::CREATABLE | Capability::ACCEPT_JSON,
            ignore_write,
        );
        table.add(&term, Capability::READABLE, self.bind(Self::get_term));
        table.add(
            &term,
            Capability::EDITABLE | Capability::ACCEPT_JSON,
            ignore_write,
        );
        table.add(&term, Capability::DELETABLE, ignore_write);
        table
    }

    fn bind(
        self: &Arc<Self>,
        endpoint: fn(&Self, &DispatchArgs) -> EndpointResult,
    ) -> impl Fn(&DispatchArgs) -> EndpointResult + Send + Sync + 'static {
        let this = Arc::clone(self);
        move |args| endpoint(&this, args)
    }

    /// The resource type a request targets.
    fn target_type<'a>(&'a self, args: &'a DispatchArgs) -> &'a str {
        args.record_type.as_deref().unwrap_or(&self.resource)
    }

    /// `GET base/taxonomies`: public taxonomies of the resource type.
    pub fn list_taxonomies(&self, args: &DispatchArgs) -> EndpointResult {
        let taxonomies = self.store.object_taxonomies(self.target_type(args))?;
        let mut body = Vec::with_capacity(taxonomies.len());
        for taxonomy in taxonomies.iter().filter(|t| t.public) {
            body.push(self.prepare_taxonomy(taxonomy, true)?);
        }
        Ok(ApiResponse::ok(Value::Array(body)))
    }

    /// `GET base/taxonomies/{taxonomy}`.
    pub fn get_taxonomy(&self, args: &DispatchArgs) -> EndpointResult {
        let taxonomy = self.taxonomy(args)?;
        Ok(ApiResponse::ok(self.prepare_taxonomy(&taxonomy, false)?))
    }

    /// `GET base/taxonomies/{taxonomy}/terms`.
    pub fn list_terms(&self, args: &DispatchArgs) -> EndpointResult {
        let taxonomy = self.readable_taxonomy(args)?;
        let terms = self.store.list_terms(&taxonomy.name)?;
        let body = terms
            .iter()
            .map(|term| self.prepare_term(term, TermContext::View))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ApiResponse::ok(Value::Array(body)))
    }

    /// `GET base/taxonomies/{taxonomy}/terms/{term}`.
    pub fn get_term(&self, args: &DispatchArgs) -> EndpointResult {
        let taxonomy = self.readable_taxonomy(args)?;
        let term_id = args
            .param("term")
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(invalid_term)?;
        let term = self
            .store
            .get_term(&taxonomy.name, term_id)?
            .ok_or_else(invalid_term)?;
        Ok(ApiResponse::ok(self.prepare_term(&term, TermContext::View)?))
    }

    /// Serialize a taxonomy. Non-public taxonomies yield a 403 error value.
    pub fn prepare_taxonomy(
        &self,
        taxonomy: &TaxonomyRecord,
        in_collection: bool,
    ) -> Result<Value, ApiError> {
        if !taxonomy.public {
            return Err(cannot_read());
        }

        let base_url = format!("{}/taxonomies/{}", self.base, taxonomy.name);
        let mut links = Map::new();
        links.insert(
            "archives".to_string(),
            Value::String(self.links.url(&format!("{base_url}/terms"))),
        );
        let rel = if in_collection { "self" } else { "collection" };
        links.insert(rel.to_string(), Value::String(self.links.url(&base_url)));

        Ok(json!({
            "name": taxonomy.label,
            "slug": taxonomy.name,
            "labels": taxonomy.labels,
            "types": taxonomy.object_types,
            "show_cloud": taxonomy.show_tagcloud,
            "hierarchical": taxonomy.hierarchical,
            "meta": { "links": links },
        }))
    }

    /// Serialize a term, resolving its parent one level deep.
    pub fn prepare_term(
        &self,
        term: &TermRecord,
        context: TermContext,
    ) -> Result<Value, EndpointError> {
        let base_url = format!("{}/taxonomies/{}/terms", self.base, term.taxonomy);

        let parent = match (term.parent, context) {
            (0, _) => Value::Null,
            (id, TermContext::ViewParent) => Value::from(id),
            (id, TermContext::View) => match self.store.get_term(&term.taxonomy, id)? {
                Some(parent) => self.prepare_term(&parent, TermContext::ViewParent)?,
                None => {
                    warn!(
                        taxonomy = %term.taxonomy,
                        term = term.term_id,
                        parent = id,
                        "term parent not found"
                    );
                    Value::from(id)
                }
            },
        };

        Ok(json!({
            "ID": term.term_taxonomy_id,
            "name": term.name,
            "slug": term.slug,
            "parent": parent,
            "count": term.count,
            "link": self.store.term_link(term)?,
            "meta": {
                "links": {
                    "collection": self.links.url(&base_url),
                    "self": self.links.url(&format!("{base_url}/{}", term.term_id)),
                }
            },
        }))
    }

    /// The named taxonomy, if it classifies the target type.
    fn taxonomy(&self, args: &DispatchArgs) -> Result<TaxonomyRecord, EndpointError> {
        let name = args.param("taxonomy").ok_or_else(invalid_taxonomy)?;
        let record_type = self.target_type(args);
        let taxonomy = self
            .store
            .get_taxonomy(name)?
            .filter(|t| t.applies_to(record_type))
            .ok_or_else(invalid_taxonomy)?;
        Ok(taxonomy)
    }

    fn readable_taxonomy(&self, args: &DispatchArgs) -> Result<TaxonomyRecord, EndpointError> {
        let taxonomy = self.taxonomy(args)?;
        if !taxonomy.public {
            return Err(cannot_read().into());
        }
        Ok(taxonomy)
    }
}

impl DispatchFilter for TaxonomyEndpoints {
    /// Supply the record type for taxonomy routes under this base.
    fn filter(&self, args: &mut DispatchArgs) {
        if args.record_type.is_some()
            || !args.route_starts_with(&format!("{}/taxonomies/", self.base))
        {
            return;
        }
        debug!(resource = %self.resource, route = %args.route, "injecting record type");
        args.record_type = Some(self.resource.clone());
    }
}

impl fmt::Debug for TaxonomyEndpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaxonomyEndpoints")
            .field("resource", &self.resource)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

fn ignore_write(_: &DispatchArgs) -> EndpointResult {
    Ok(ApiResponse::ok(Value::Null))
}

fn invalid_taxonomy() -> ApiError {
    ApiError::not_found("json_taxonomy_invalid_id", "Invalid taxonomy ID.")
}

fn invalid_term() -> ApiError {
    ApiError::not_found("json_taxonomy_invalid_term", "Invalid term ID.")
}

fn cannot_read() -> ApiError {
    ApiError::forbidden("json_cannot_read_taxonomy", "Cannot view taxonomy")
}
