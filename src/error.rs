//! Error types for `alexandria`.
//!
//! Every failure maps onto one of four caller-facing kinds (see
//! [`ErrorCode`]): validation problems, missing tickets, connection or
//! startup failures, and failed writes. Anything else is internal.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TicketError>;

/// Errors produced by the ticket store and its backends.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no ticket found for {reference} in project '{project}'")]
    NotFound { project: String, reference: String },

    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),

    #[error("{backend} backend is missing {what}")]
    ConfigMissing { backend: String, what: String },

    #[error("failed to connect to {backend} backend: {reason}")]
    Connection { backend: String, reason: String },

    #[error("database connection is closed")]
    ConnectionClosed,

    #[error("schema initialization failed ({step}): {source}")]
    Schema {
        step: String,
        #[source]
        source: Box<TicketError>,
    },

    #[error("failed to {op} ticket {ticket}: {source}")]
    Write {
        op: String,
        ticket: String,
        #[source]
        source: Box<TicketError>,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("remote database error: {message}")]
    Remote {
        message: String,
        code: Option<String>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot decode column {column}: {reason}")]
    Decode { column: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Caller-facing error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    NotFound,
    Connection,
    Write,
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Connection => "CONNECTION_ERROR",
            Self::Write => "WRITE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Process exit code used by the CLI.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Internal => 1,
            Self::Validation => 2,
            Self::NotFound => 3,
            Self::Connection => 4,
            Self::Write => 5,
        }
    }
}

impl TicketError {
    /// Build a validation error for a named field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(project: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::NotFound {
            project: project.into(),
            reference: reference.into(),
        }
    }

    pub fn connection(backend: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connection {
            backend: backend.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify this error into one of the caller-facing kinds.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::Validation,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::UnsupportedBackend(_)
            | Self::ConfigMissing { .. }
            | Self::Connection { .. }
            | Self::ConnectionClosed
            | Self::Schema { .. } => ErrorCode::Connection,
            Self::Write { .. } => ErrorCode::Write,
            Self::Database(_)
            | Self::Remote { .. }
            | Self::Http(_)
            | Self::Decode { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_) => ErrorCode::Internal,
        }
    }

    /// True for failures raised by the underlying store rather than by
    /// the engine's own checks.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Remote { .. } | Self::Http(_) | Self::Decode { .. }
        )
    }

    /// Wrap storage-level failures of a write operation with its context.
    ///
    /// Validation and not-found errors pass through untouched so callers
    /// can still match on them.
    #[must_use]
    pub fn into_write(self, op: &str, ticket: &str) -> Self {
        if self.is_storage() {
            Self::Write {
                op: op.to_string(),
                ticket: ticket.to_string(),
                source: Box::new(self),
            }
        } else {
            self
        }
    }
}
