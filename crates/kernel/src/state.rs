//! Application state shared across all handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::rest::Dispatcher;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Route tables registered during startup; read-only afterwards.
    dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, dispatcher }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}
