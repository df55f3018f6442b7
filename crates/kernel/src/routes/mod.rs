//! HTTP route handlers.

pub mod api;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// The application router: `/health` plus the REST dispatcher as fallback.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .fallback(api::dispatch)
        .with_state(state)
}
