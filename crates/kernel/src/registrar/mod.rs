//! Resource type and taxonomy registrars.
//!
//! A definition is built once, validated up front, and handed to the host
//! exactly once. Every configuration key has a default derived from the
//! others; builders record explicit overrides and the derivation chain runs
//! when the configuration is assembled.

/// Builder setters that record an explicit override in `self.options`.
macro_rules! override_setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                self.options.$field = Some(value.into());
                self
            }
        )*
    };
}

mod resource_type;
mod taxonomy;

use std::fmt;
use std::sync::Arc;

pub use resource_type::{ResourceOptions, ResourceType, ResourceTypeBuilder};
pub use taxonomy::{Taxonomy, TaxonomyBuilder, TaxonomyOptions};

/// Where a definition is in its registration lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationState {
    #[default]
    Unregistered,
    Registering,
    Registered,
}

/// Callback run around registration with the definition name and its
/// assembled configuration.
pub type Hook<C> = Arc<dyn Fn(&str, &C) + Send + Sync>;

/// Optional before/after registration callbacks.
pub struct Hooks<C> {
    before: Option<Hook<C>>,
    after: Option<Hook<C>>,
}

impl<C> Hooks<C> {
    pub(crate) fn set_before(&mut self, hook: Hook<C>) {
        self.before = Some(hook);
    }

    pub(crate) fn set_after(&mut self, hook: Hook<C>) {
        self.after = Some(hook);
    }

    pub(crate) fn run_before(&self, name: &str, config: &C) {
        if let Some(hook) = &self.before {
            hook(name, config);
        }
    }

    pub(crate) fn run_after(&self, name: &str, config: &C) {
        if let Some(hook) = &self.after {
            hook(name, config);
        }
    }
}

impl<C> Default for Hooks<C> {
    fn default() -> Self {
        Self {
            before: None,
            after: None,
        }
    }
}

impl<C> Clone for Hooks<C> {
    fn clone(&self) -> Self {
        Self {
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

impl<C> fmt::Debug for Hooks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}
