//! Bridges axum requests under the API prefix to the REST dispatcher.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Fallback handler: every path not claimed by another router lands here.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let Some(path) = strip_prefix(uri.path(), &state.config().api_prefix) else {
        return no_route().into_response();
    };

    let body = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                return ApiError::bad_request("json_invalid_body", e.to_string()).into_response();
            }
        }
    };

    match state.dispatcher().dispatch(method, path, query, body) {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    }
}

/// The part of `path` below `prefix`, or `None` when `path` is elsewhere.
fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    match path.strip_prefix(prefix)? {
        "" => Some("/"),
        rest if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

fn no_route() -> ApiError {
    ApiError::not_found(
        "json_no_route",
        "No route was found matching the URL and request method",
    )
}
