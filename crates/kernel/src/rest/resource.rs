//! REST endpoints for the records of one resource type.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat};
use custom_objects_sdk::host::ContentStore;
use custom_objects_sdk::types::{Record, RecordInput, RecordQuery};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::links::LinkBuilder;
use super::route_table::{Capability, DispatchArgs, DispatchFilter, RouteTable};
use crate::error::{ApiError, ApiResponse, EndpointError, EndpointResult};
use crate::registrar::ResourceType;

const MAX_PER_PAGE: u32 = 100;

/// CRUD routes for one resource type, mounted at its route base.
pub struct ResourceEndpoints {
    resource: String,
    base: String,
    store: Arc<dyn ContentStore>,
    links: LinkBuilder,
}

impl ResourceEndpoints {
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

    pub fn base(&self) -> &str {
        &self.base
    }

    /// The route table: collection at the base, single records below it.
    pub fn routes(self: &Arc<Self>) -> RouteTable {
        let mut table = RouteTable::new();
        let item = format!(r"{}/(?P<id>\d+)", self.base);

        table.add(&self.base, Capability::READABLE, self.bind(Self::list));
        table.add(
            &self.base,
            Capability::CREATABLE | Capability::ACCEPT_JSON,
            self.bind(Self::create),
        );
        table.add(&item, Capability::READABLE, self.bind(Self::get));
        table.add(
            &item,
            Capability::EDITABLE | Capability::ACCEPT_JSON,
            self.bind(Self::edit),
        );
        table.add(&item, Capability::DELETABLE, self.bind(Self::delete));

        table
    }

    fn bind(
        self: &Arc<Self>,
        endpoint: fn(&Self, &DispatchArgs) -> EndpointResult,
    ) -> impl Fn(&DispatchArgs) -> EndpointResult + Send + Sync + 'static {
        let this = Arc::clone(self);
        move |args| endpoint(&this, args)
    }

    /// `GET base`: one page of records, trash excluded unless asked for.
    pub fn list(&self, args: &DispatchArgs) -> EndpointResult {
        let query = RecordQuery {
            page: parse_number(args.query_param("page")).unwrap_or(1).max(1),
            per_page: parse_number(args.query_param("per_page"))
                .unwrap_or(10)
                .clamp(1, MAX_PER_PAGE),
            status: args.query_param("status").map(str::to_string),
        };

        let records = self.store.list_records(&self.resource, &query)?;
        let body = records.iter().map(|r| self.prepare_record(r)).collect();
        Ok(ApiResponse::ok(Value::Array(body)))
    }

    /// `POST base`: create a record of this type.
    pub fn create(&self, args: &DispatchArgs) -> EndpointResult {
        let input = self.record_input(args)?;
        let record = self.store.create_record(&self.resource, input)?;
        info!(resource = %self.resource, id = record.id, "record created");
        Ok(ApiResponse::created(self.prepare_record(&record)))
    }

    /// `GET base/{id}`.
    pub fn get(&self, args: &DispatchArgs) -> EndpointResult {
        let record = self.fetch(args)?;
        Ok(ApiResponse::ok(self.prepare_record(&record)))
    }

    /// `PUT|PATCH|POST base/{id}`: absent fields keep their value.
    pub fn edit(&self, args: &DispatchArgs) -> EndpointResult {
        let record = self.fetch(args)?;
        let input = self.record_input(args)?;
        let record = self.store.update_record(record.id, input)?;
        info!(resource = %self.resource, id = record.id, "record updated");
        Ok(ApiResponse::ok(self.prepare_record(&record)))
    }

    /// `DELETE base/{id}`: trash, or delete outright with `force`.
    pub fn delete(&self, args: &DispatchArgs) -> EndpointResult {
        let record = self.fetch(args)?;
        let force = args
            .query_param("force")
            .is_some_and(|v| matches!(v, "1" | "true"));

        self.store.delete_record(record.id, force)?;
        info!(resource = %self.resource, id = record.id, force, "record deleted");

        let message = if force {
            "Permanently deleted post"
        } else {
            "Deleted post"
        };
        Ok(ApiResponse::ok(json!({ "message": message })))
    }

    /// Serialize a record for responses.
    ///
    /// Custom fields are merged last and never replace a core key.
    pub fn prepare_record(&self, record: &Record) -> Value {
        let item = format!("{}/{}", self.base, record.id);
        let mut data = json!({
            "ID": record.id,
            "title": record.title,
            "status": record.status,
            "type": record.record_type,
            "slug": record.slug,
            "content": record.content,
            "excerpt": record.excerpt,
            "parent": record.parent,
            "date": timestamp(record.created),
            "modified": timestamp(record.changed),
            "link": self.store.record_link(record),
            "meta": {
                "links": {
                    "self": self.links.url(&item),
                    "collection": self.links.url(&self.base),
                }
            },
        });

        if let Value::Object(map) = &mut data {
            for (key, value) in &record.fields {
                map.entry(key.as_str()).or_insert_with(|| value.clone());
            }
        }
        data
    }

    fn fetch(&self, args: &DispatchArgs) -> Result<Record, EndpointError> {
        let id = parse_number::<u64>(args.param("id")).ok_or_else(invalid_id)?;
        let record = self.store.get_record(id)?.ok_or_else(invalid_id)?;
        if record.record_type != self.resource {
            return Err(invalid_type().into());
        }
        Ok(record)
    }

    fn record_input(&self, args: &DispatchArgs) -> Result<RecordInput, EndpointError> {
        let input: RecordInput = serde_json::from_value(Value::Object(args.data.clone()))
            .map_err(|e| ApiError::bad_request("json_invalid_data", e.to_string()))?;

        match input.record_type.as_deref() {
            Some(t) if t != self.resource => Err(invalid_type().into()),
            _ => Ok(input),
        }
    }
}

impl DispatchFilter for ResourceEndpoints {
    /// Supply `data.type` for requests under this base that lack one.
    fn filter(&self, args: &mut DispatchArgs) {
        if args.data.contains_key("type") || !args.route_starts_with(&format!("{}/", self.base)) {
            return;
        }
        debug!(resource = %self.resource, route = %args.route, "injecting record type");
        args.data
            .insert("type".to_string(), Value::String(self.resource.clone()));
    }
}

impl fmt::Debug for ResourceEndpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEndpoints")
            .field("resource", &self.resource)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

fn invalid_id() -> ApiError {
    ApiError::not_found("json_post_invalid_id", "Invalid post ID.")
}

fn invalid_type() -> ApiError {
    ApiError::bad_request("json_post_invalid_type", "Invalid post type")
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// RFC 3339 in UTC; `null` when out of range.
fn timestamp(secs: i64) -> Value {
    DateTime::from_timestamp(secs, 0)
        .map(|dt| Value::String(dt.to_rfc3339_opts(SecondsFormat::Secs, true)))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use custom_objects_sdk::HostError;
    use custom_objects_sdk::types::{TaxonomyRecord, TermRecord};
    use custom_objects_test_utils::test_record;
    use parking_lot::Mutex;
    use serde_json::Map;

    /// Minimal store holding a fixed set of records.
    #[derive(Default)]
    struct Records {
        records: Mutex<Vec<Record>>,
        deleted: Mutex<Vec<(u64, bool)>>,
    }

    impl ContentStore for Records {
        fn list_records(&self, record_type: &str, _: &RecordQuery) -> Result<Vec<Record>, HostError> {
            Ok(self
                .records
                .lock()
                .iter()
                .filter(|r| r.record_type == record_type)
                .cloned()
                .collect())
        }

        fn get_record(&self, id: u64) -> Result<Option<Record>, HostError> {
            Ok(self.records.lock().iter().find(|r| r.id == id).cloned())
        }

        fn create_record(&self, record_type: &str, input: RecordInput) -> Result<Record, HostError> {
            let mut records = self.records.lock();
            let mut record = test_record(records.len() as u64 + 1, record_type, "");
            record.title = input.title.unwrap_or_default();
            records.push(record.clone());
            Ok(record)
        }

        fn update_record(&self, id: u64, input: RecordInput) -> Result<Record, HostError> {
            let mut records = self.records.lock();
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| HostError::not_found("record", id))?;
            if let Some(title) = input.title {
                record.title = title;
            }
            Ok(record.clone())
        }

        fn delete_record(&self, id: u64, force: bool) -> Result<(), HostError> {
            self.deleted.lock().push((id, force));
            Ok(())
        }

        fn record_link(&self, record: &Record) -> String {
            format!("http://example.com/?p={}", record.id)
        }

        fn object_taxonomies(&self, _: &str) -> Result<Vec<TaxonomyRecord>, HostError> {
            Ok(Vec::new())
        }

        fn get_taxonomy(&self, _: &str) -> Result<Option<TaxonomyRecord>, HostError> {
            Ok(None)
        }

        fn list_terms(&self, _: &str) -> Result<Vec<TermRecord>, HostError> {
            Ok(Vec::new())
        }

        fn get_term(&self, _: &str, _: u64) -> Result<Option<TermRecord>, HostError> {
            Ok(None)
        }

        fn term_link(&self, _: &TermRecord) -> Result<String, HostError> {
            Ok(String::new())
        }
    }

    fn endpoints() -> (Arc<ResourceEndpoints>, Arc<Records>) {
        let store = Arc::new(Records::default());
        store.records.lock().extend([
            test_record(5, "movie", "Alien"),
            test_record(6, "book", "Dune"),
        ]);
        let endpoints = Arc::new(ResourceEndpoints::new(
            "movie",
            "/movies",
            store.clone(),
            LinkBuilder::new("http://example.com", "/wp-json"),
        ));
        (endpoints, store)
    }

    fn item(id: &str, method: Method) -> DispatchArgs {
        DispatchArgs::new(r"/movies/(?P<id>\d+)", method)
            .with_path(format!("/movies/{id}"))
            .with_param("id", id)
    }

    #[test]
    fn routes_table() {
        let (endpoints, _) = endpoints();
        let table = endpoints.routes();
        let patterns: Vec<_> = table.patterns().collect();
        assert_eq!(patterns, vec!["/movies", r"/movies/(?P<id>\d+)"]);

        let collection = table.get("/movies").unwrap();
        assert_eq!(collection[0].capability, Capability::READABLE);
        assert_eq!(
            collection[1].capability,
            Capability::CREATABLE | Capability::ACCEPT_JSON
        );
        let single = table.get(r"/movies/(?P<id>\d+)").unwrap();
        assert_eq!(single.len(), 3);
        assert_eq!(single[2].capability, Capability::DELETABLE);
    }

    #[test]
    fn prepare_record_shape() {
        let (endpoints, _) = endpoints();
        let mut record = test_record(5, "movie", "Alien");
        record.fields.insert("rating".into(), json!(5));
        record.fields.insert("title".into(), json!("ignored"));

        let value = endpoints.prepare_record(&record);
        assert_eq!(value["ID"], 5);
        assert_eq!(value["type"], "movie");
        assert_eq!(value["title"], "Alien");
        assert_eq!(value["rating"], 5);
        assert_eq!(value["date"], "2023-11-14T22:13:20Z");
        assert_eq!(value["link"], "http://example.com/?p=5");
        assert_eq!(
            value["meta"]["links"]["self"],
            "http://example.com/wp-json/movies/5"
        );
        assert_eq!(
            value["meta"]["links"]["collection"],
            "http://example.com/wp-json/movies"
        );
    }

    #[test]
    fn get_checks_id_and_type() {
        let (endpoints, _) = endpoints();
        let response = endpoints.get(&item("5", Method::GET)).unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["title"], "Alien");

        let err = endpoints.get(&item("99", Method::GET)).unwrap_err();
        assert_eq!(err.into_api_error().code, "json_post_invalid_id");

        let err = endpoints.get(&item("6", Method::GET)).unwrap_err();
        let err = err.into_api_error();
        assert_eq!(err.code, "json_post_invalid_type");
        assert_eq!(err.data.status, 400);
    }

    #[test]
    fn list_only_returns_this_type() {
        let (endpoints, _) = endpoints();
        let response = endpoints
            .list(&DispatchArgs::new("/movies", Method::GET))
            .unwrap();
        let body = response.body.as_array().unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["ID"], 5);
    }

    #[test]
    fn create_answers_created() {
        let (endpoints, store) = endpoints();
        let mut data = Map::new();
        data.insert("title".into(), json!("Heat"));
        let args = DispatchArgs::new("/movies", Method::POST).with_data(data);

        let response = endpoints.create(&args).unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["title"], "Heat");
        assert_eq!(response.body["type"], "movie");
        assert_eq!(store.records.lock().len(), 3);
    }

    #[test]
    fn create_rejects_foreign_type() {
        let (endpoints, _) = endpoints();
        let mut data = Map::new();
        data.insert("type".into(), json!("book"));
        let args = DispatchArgs::new("/movies", Method::POST).with_data(data);
        let err = endpoints.create(&args).unwrap_err();
        assert_eq!(err.into_api_error().code, "json_post_invalid_type");
    }

    #[test]
    fn edit_updates_title() {
        let (endpoints, _) = endpoints();
        let mut data = Map::new();
        data.insert("title".into(), json!("Aliens"));
        let args = item("5", Method::PUT).with_data(data);
        let response = endpoints.edit(&args).unwrap();
        assert_eq!(response.body["title"], "Aliens");
    }

    #[test]
    fn delete_passes_force_through() {
        let (endpoints, store) = endpoints();
        let response = endpoints.delete(&item("5", Method::DELETE)).unwrap();
        assert_eq!(response.body["message"], "Deleted post");

        let args = item("5", Method::DELETE).with_query("force", "true");
        let response = endpoints.delete(&args).unwrap();
        assert_eq!(response.body["message"], "Permanently deleted post");
        assert_eq!(*store.deleted.lock(), vec![(5, false), (5, true)]);
    }

    #[test]
    fn filter_injects_type_on_segment_boundary() {
        let (endpoints, _) = endpoints();

        let mut args = DispatchArgs::new(r"/movies/(?P<id>\d+)", Method::GET);
        endpoints.filter(&mut args);
        assert_eq!(args.data.get("type"), Some(&json!("movie")));

        let mut args = DispatchArgs::new(r"/movies-extra/(?P<id>\d+)", Method::GET);
        endpoints.filter(&mut args);
        assert!(args.data.get("type").is_none());
    }

    #[test]
    fn filter_keeps_explicit_type() {
        let (endpoints, _) = endpoints();
        let mut data = Map::new();
        data.insert("type".into(), json!("book"));
        let mut args = DispatchArgs::new("/movies", Method::POST).with_data(data);
        endpoints.filter(&mut args);
        assert_eq!(args.data.get("type"), Some(&json!("book")));
    }
}
