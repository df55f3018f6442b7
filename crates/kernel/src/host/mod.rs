//! Reference content host.
//!
//! Real deployments plug their own storage in through the SDK traits; this
//! implementation backs the demo binary and the tests.

mod memory;

pub use memory::{InMemoryHost, slugify};
