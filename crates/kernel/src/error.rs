//! Error types.
//!
//! Construction and lifecycle failures are `thiserror` enums returned to the
//! embedding application. REST failures are values: an [`ApiError`] is
//! serialized into the response body rather than raised.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use custom_objects_sdk::HostError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::naming::NameKind;

/// A definition could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("{kind} name must not be empty (got {name:?})")]
    EmptyName { kind: NameKind, name: String },

    #[error("localization domain must not be empty (got {0:?})")]
    EmptyDomain(String),

    #[error("plural of `{name}` must not be blank (got {plural:?})")]
    InvalidPlural { name: String, plural: String },

    #[error("taxonomy `{0}` must be associated with at least one resource type")]
    EmptyObjectList(String),

    #[error("{kind} name `{name}` is reserved by the host")]
    ReservedName { kind: NameKind, name: String },

    #[error(
        "{kind} `{name}` must be {}; expected `{expected}`",
        .kind.convention()
    )]
    NamingConvention {
        kind: NameKind,
        name: String,
        expected: String,
    },

    #[error("route base {0:?} has no path segment")]
    InvalidRouteBase(String),
}

/// Registering one definition with the host failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    #[error("{kind} `{name}` is already registered")]
    AlreadyRegistered { kind: NameKind, name: String },

    #[error(transparent)]
    Host(#[from] HostError),
}

/// The two-phase startup was driven out of order or failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LifecycleError {
    #[error("definitions have already been registered with the host")]
    AlreadyInitialized,

    #[error("routes cannot be registered before initialize()")]
    NotInitialized,

    #[error("routes have already been registered")]
    RoutesAlreadyRegistered,

    #[error("{kind} `{name}` was already registered")]
    AlreadyRegistered { kind: NameKind, name: String },

    #[error(transparent)]
    Host(#[from] HostError),
}

impl From<RegistrationError> for LifecycleError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::AlreadyRegistered { kind, name } => {
                Self::AlreadyRegistered { kind, name }
            }
            RegistrationError::Host(e) => Self::Host(e),
        }
    }
}

/// Status attached to an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub status: u16,
}

/// A structured REST error, returned as data.
///
/// Serializes as `{"code": .., "message": .., "data": {"status": ..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub data: ApiErrorData,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: ApiErrorData {
                status: status.as_u16(),
            },
        }
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusCode::BAD_REQUEST)
    }

    pub fn forbidden(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusCode::FORBIDDEN)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, message, StatusCode::NOT_FOUND)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.data.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Why an endpoint did not produce a response body.
///
/// Host failures pass through unchanged; only the HTTP edge maps them to a
/// status code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EndpointError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl EndpointError {
    /// The HTTP status this error answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Api(e) => e.status(),
            Self::Host(HostError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Host(HostError::Invalid(_)) => StatusCode::BAD_REQUEST,
            Self::Host(HostError::Duplicate { .. }) => StatusCode::CONFLICT,
            Self::Host(HostError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Collapse into the error value sent to clients.
    pub fn into_api_error(self) -> ApiError {
        let status = self.status();
        match self {
            Self::Api(e) => e,
            Self::Host(e @ HostError::Storage(_)) => {
                tracing::error!(error = %e, "host storage error");
                ApiError::new(e.code(), "internal server error", status)
            }
            Self::Host(e) => ApiError::new(e.code(), e.to_string(), status),
        }
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        self.into_api_error().into_response()
    }
}

/// A successful endpoint result: a status and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn created(body: Value) -> Self {
        Self {
            status: StatusCode::CREATED,
            body,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Result type returned by every endpoint handler.
pub type EndpointResult = Result<ApiResponse, EndpointError>;
