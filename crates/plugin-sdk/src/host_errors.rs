//! Errors returned by content hosts.
//!
//! Host errors cross the kernel untouched: REST handlers propagate them as-is
//! and only the HTTP edge decides which status code they become.

use thiserror::Error;

/// A failure reported by the content host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// A type, taxonomy, or term with this name already exists.
    #[error("{kind} `{name}` is already registered")]
    Duplicate { kind: &'static str, name: String },

    /// A referenced entity does not exist.
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    /// The host refused the input.
    #[error("invalid input: {0}")]
    Invalid(String),

    /// The storage backend failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl HostError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Duplicate { .. } => "host_duplicate",
            Self::NotFound { .. } => "host_not_found",
            Self::Invalid(_) => "host_invalid",
            Self::Storage(_) => "host_storage",
        }
    }
}
