//! Error types for the lakeFS SDK.
//!
//! Model-boundary failures (`Validation`, `TypeMismatch`, `Decode`) are raised
//! before anything is sent. Service answers are mapped to `NotFound` and
//! `Conflict` where the status has a dedicated meaning, everything else is
//! passed through as a [`TransportError`].

use thiserror::Error;

/// Main error type for the lakeFS SDK.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is missing, a field has the wrong type, or a
    /// request tries to change something the API does not allow.
    #[error("{model}: invalid field `{field}`: {reason}")]
    Validation {
        model: &'static str,
        field: String,
        reason: String,
    },

    /// Input was not structurally a JSON object.
    #[error("{model}: expected {expected}, found {found}")]
    TypeMismatch {
        model: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Wire text is not valid JSON.
    #[error("{model}: malformed JSON: {source}")]
    Decode {
        model: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The service reported 404 for the addressed resource.
    #[error("{resource} `{id}` not found: {message}")]
    NotFound {
        resource: &'static str,
        id: String,
        message: String,
    },

    /// The service reported 409 (for example an equivalent open pull request).
    #[error("{resource} conflict: {message}")]
    Conflict {
        resource: &'static str,
        message: String,
    },

    /// A create went through but the new pull request could not be read
    /// back. `id` is the identifier the server assigned.
    #[error("pull request `{id}` was created but reading it back failed: {source}")]
    ReadBack {
        id: String,
        #[source]
        source: Box<Error>,
    },

    /// Failure reported by the transport collaborator.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Build a validation error for `field` of `model`.
    pub(crate) fn validation(
        model: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            model,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status associated with this error, if the service answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Transport(TransportError::Status { status, .. }) => Some(*status),
            Self::ReadBack { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Identifier of a pull request that was created even though the call
    /// as a whole failed.
    #[must_use]
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Self::ReadBack { id, .. } => Some(id.as_str()),
            _ => None,
        }
    }

    /// Name of the offending field for validation errors.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Errors surfaced by a [`Transport`](crate::transport::Transport).
///
/// These pass through the resource clients unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The service answered with a status the client has no dedicated
    /// mapping for. `body` holds the raw response text.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request was cancelled before a response arrived.
    ///
    /// Only transports with their own cancellation signal return this.
    /// [`HttpTransport`](crate::transport::HttpTransport) never does: its
    /// requests are cancelled by dropping the future, which yields no error.
    #[error("request cancelled: {0}")]
    Cancelled(String),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure while building or sending the request.
    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Whether the failure came from a deadline rather than the service.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
