//! Custom Objects Kernel
//!
//! Declarative custom resource types and taxonomies for a content host:
//! an English inflection engine, name validation and derivation,
//! registrars that turn definitions into host configuration, and REST
//! endpoints exposing the registered objects.
//!
//! The `custom-objects` binary serves a demo content model on top of
//! [`host::InMemoryHost`].

pub mod app;
pub mod config;
pub mod error;
pub mod host;
pub mod inflect;
pub mod lifecycle;
pub mod naming;
pub mod registrar;
pub mod rest;
pub mod routes;
pub mod state;

pub use error::{
    ApiError, ApiResponse, DefinitionError, EndpointError, LifecycleError, RegistrationError,
};
pub use lifecycle::{Lifecycle, Phase};
pub use registrar::{ResourceType, Taxonomy};
