//! Reference REST dispatcher.
//!
//! Route patterns are matched in registration order against the request
//! path. The first route whose pattern matches and which has a handler
//! admitting the request method wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::route_table::{
    Capability, DispatchArgs, DispatchFilter, RestServer, RouteHandler, RouteTable,
};
use crate::error::{ApiError, ApiResponse, EndpointResult};

struct CompiledRoute {
    pattern: String,
    regex: Regex,
    handlers: Vec<RouteHandler>,
}

/// Holds registered route tables and dispatch filters.
#[derive(Default)]
pub struct Dispatcher {
    routes: Vec<CompiledRoute>,
    filters: Vec<Arc<dyn DispatchFilter>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct route patterns.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Route to the handler for `method` on `path`.
    ///
    /// `body` is the decoded JSON request body, if any. A request whose path
    /// and method match no handler answers `json_no_route`.
    pub fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: HashMap<String, String>,
        body: Option<Value>,
    ) -> EndpointResult {
        let path = if path.is_empty() { "/" } else { path };
        if path == "/" && method == Method::GET {
            return Ok(ApiResponse::ok(self.index()));
        }

        for route in &self.routes {
            let Some(captures) = route.regex.captures(path) else {
                continue;
            };
            let Some(handler) = route.handlers.iter().find(|h| h.capability.admits(&method))
            else {
                continue;
            };

            let params = route
                .regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect();

            let data = if handler.capability.accepts_json() {
                request_data(body)?
            } else {
                Map::new()
            };

            let mut args = DispatchArgs {
                route: route.pattern.clone(),
                path: path.to_string(),
                method,
                params,
                record_type: query.get("type").cloned(),
                query,
                data,
            };
            for filter in &self.filters {
                filter.filter(&mut args);
            }

            debug!(route = %args.route, method = %args.method, "dispatching");
            let result = handler.call(&args);
            if let Err(e) = &result {
                warn!(route = %args.route, path = %args.path, error = %e, "endpoint failed");
            }
            return result;
        }

        Err(ApiError::not_found(
            "json_no_route",
            "No route was found matching the URL and request method",
        )
        .into())
    }

    /// Route patterns and the methods each supports, hidden routes omitted.
    pub fn index(&self) -> Value {
        let mut routes = Map::new();
        for route in &self.routes {
            let capability = route
                .handlers
                .iter()
                .fold(Capability::empty(), |acc, h| acc | h.capability);
            if capability.contains(Capability::HIDDEN_ENDPOINT) {
                continue;
            }
            let accepts_json = route.handlers.iter().any(|h| h.capability.accepts_json());
            routes.insert(
                route.pattern.clone(),
                json!({ "supports": capability.methods(), "accepts_json": accepts_json }),
            );
        }
        json!({ "routes": routes })
    }
}

impl RestServer for Dispatcher {
    fn register_routes(&mut self, table: RouteTable) {
        for (pattern, handlers) in table {
            if let Some(existing) = self.routes.iter_mut().find(|r| r.pattern == pattern) {
                existing.handlers.extend(handlers);
                continue;
            }

            match Regex::new(&format!("(?i)^{pattern}$")) {
                Ok(regex) => {
                    debug!(route = %pattern, handlers = handlers.len(), "route registered");
                    self.routes.push(CompiledRoute {
                        pattern,
                        regex,
                        handlers,
                    });
                }
                Err(e) => {
                    warn!(route = %pattern, error = %e, "skipping route with invalid pattern");
                }
            }
        }
    }

    fn add_dispatch_filter(&mut self, filter: Arc<dyn DispatchFilter>) {
        self.filters.push(filter);
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "routes",
                &self.routes.iter().map(|r| &r.pattern).collect::<Vec<_>>(),
            )
            .field("filters", &self.filters.len())
            .finish()
    }
}

fn request_data(body: Option<Value>) -> Result<Map<String, Value>, ApiError> {
    match body {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(ApiError::bad_request(
            "json_invalid_body",
            "Request body must be a JSON object",
        )),
    }
}
