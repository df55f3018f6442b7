//! Custom Objects SDK
//!
//! Types and traits shared between definitions and the content host.
//! Definitions describe custom resource types and taxonomies; the kernel
//! turns them into the configuration objects in [`types`] and hands those
//! to a host implementing the traits in [`host`].

pub mod host;
pub mod host_errors;
pub mod types;

pub use host_errors::HostError;
