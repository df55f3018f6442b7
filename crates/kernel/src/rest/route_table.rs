//! Route tables and the dispatch-argument model.
//!
//! A route table maps a URL pattern (a regex with named groups such as
//! `(?P<id>\d+)`) to an ordered list of handlers, each guarded by a
//! capability bitmask. The dispatcher that consumes the table is external;
//! [`RestServer`] is the narrow interface exposers talk to.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use bitflags::bitflags;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::EndpointResult;

bitflags! {
    /// What a route handler accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capability: u32 {
        /// GET.
        const READABLE = 1;
        /// POST.
        const CREATABLE = 2;
        /// POST, PUT or PATCH.
        const EDITABLE = 4;
        /// DELETE.
        const DELETABLE = 8;
        const ALLMETHODS = Self::READABLE.bits()
            | Self::CREATABLE.bits()
            | Self::EDITABLE.bits()
            | Self::DELETABLE.bits();

        /// Accept a raw request body.
        const ACCEPT_RAW = 64;
        /// Accept a JSON request body.
        const ACCEPT_JSON = 128;
        /// Keep the route out of the index.
        const HIDDEN_ENDPOINT = 256;
    }
}

impl Capability {
    /// Whether a handler with this capability may serve `method`.
    pub fn admits(self, method: &Method) -> bool {
        let required = match *method {
            Method::GET | Method::HEAD => Self::READABLE,
            Method::POST => Self::CREATABLE | Self::EDITABLE,
            Method::PUT | Method::PATCH => Self::EDITABLE,
            Method::DELETE => Self::DELETABLE,
            _ => return false,
        };
        self.intersects(required)
    }

    pub fn accepts_json(self) -> bool {
        self.contains(Self::ACCEPT_JSON)
    }

    /// Method names this capability admits, for the route index.
    pub fn methods(self) -> Vec<&'static str> {
        let mut methods = Vec::new();
        if self.contains(Self::READABLE) {
            methods.push("GET");
        }
        if self.intersects(Self::CREATABLE | Self::EDITABLE) {
            methods.push("POST");
        }
        if self.contains(Self::EDITABLE) {
            methods.extend(["PUT", "PATCH"]);
        }
        if self.contains(Self::DELETABLE) {
            methods.push("DELETE");
        }
        methods
    }
}

/// Everything a handler sees about one request.
///
/// Dispatch filters receive this mutably before the handler runs and may
/// fill in missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchArgs {
    /// The matched route pattern, e.g. `/movies/(?P<id>\d+)`.
    pub route: String,
    /// The request path relative to the API root, e.g. `/movies/5`.
    pub path: String,
    pub method: Method,
    /// Named groups captured from the path.
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    /// The decoded request body; empty when there is none.
    pub data: Map<String, Value>,
    /// Resource type the request targets, when known.
    pub record_type: Option<String>,
}

impl DispatchArgs {
    pub fn new(route: impl Into<String>, method: Method) -> Self {
        let route = route.into();
        Self {
            path: route.clone(),
            route,
            method,
            params: HashMap::new(),
            query: HashMap::new(),
            data: Map::new(),
            record_type: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Whether `route` lies under `prefix`, compared on a `/` boundary.
    ///
    /// `/movies/5` lies under `/movies/`; `/movies-extra/5` does not.
    pub fn route_starts_with(&self, prefix: &str) -> bool {
        let mut route = String::with_capacity(self.route.len() + 1);
        route.push_str(&self.route);
        route.push('/');
        route.starts_with(prefix)
    }
}

/// A route handler.
pub type Handler = Arc<dyn Fn(&DispatchArgs) -> EndpointResult + Send + Sync>;

/// One handler on a route with the capability guarding it.
#[derive(Clone)]
pub struct RouteHandler {
    pub handler: Handler,
    pub capability: Capability,
}

impl RouteHandler {
    pub fn call(&self, args: &DispatchArgs) -> EndpointResult {
        (self.handler)(args)
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHandler")
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

/// Ordered mapping from URL pattern to handlers.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: IndexMap<String, Vec<RouteHandler>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to `pattern`, creating the route if needed.
    pub fn add<F>(&mut self, pattern: impl Into<String>, capability: Capability, handler: F)
    where
        F: Fn(&DispatchArgs) -> EndpointResult + Send + Sync + 'static,
    {
        self.add_handler(
            pattern,
            RouteHandler {
                handler: Arc::new(handler),
                capability,
            },
        );
    }

    pub fn add_handler(&mut self, pattern: impl Into<String>, handler: RouteHandler) {
        self.routes.entry(pattern.into()).or_default().push(handler);
    }

    /// Merge `other` in; handlers for an existing pattern are appended.
    pub fn extend(&mut self, other: RouteTable) {
        for (pattern, handlers) in other.routes {
            self.routes.entry(pattern).or_default().extend(handlers);
        }
    }

    pub fn get(&self, pattern: &str) -> Option<&[RouteHandler]> {
        self.routes.get(pattern).map(Vec::as_slice)
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RouteHandler])> {
        self.routes.iter().map(|(p, h)| (p.as_str(), h.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl IntoIterator for RouteTable {
    type Item = (String, Vec<RouteHandler>);
    type IntoIter = indexmap::map::IntoIter<String, Vec<RouteHandler>>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.into_iter()
    }
}

/// Rewrites dispatch arguments before the handler runs.
pub trait DispatchFilter: Send + Sync {
    fn filter(&self, args: &mut DispatchArgs);
}

/// The REST dispatcher, as seen by exposers.
pub trait RestServer {
    /// Merge `routes` into the server's table.
    fn register_routes(&mut self, routes: RouteTable);

    /// Run `filter` on the arguments of every dispatched request.
    fn add_dispatch_filter(&mut self, filter: Arc<dyn DispatchFilter>);
}
