//! Errors produced by the adapter and its backends.

use crate::sql::Operation;
use serde::Deserialize;
use std::fmt;

/// A `Result` whose error type defaults to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any failure surfaced to a caller of the adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The method cannot be used with the statement's kind, e.g. `get()` on an `INSERT`.
    #[error("{method}() not supported for operation: {operation}")]
    Unsupported {
        /// The method that was called.
        method: &'static str,
        /// The kind of the statement it was called on.
        operation: Operation,
    },
    /// The operation exists in the interface but has no translation.
    #[error(transparent)]
    NotImplemented(#[from] NotImplemented),
    /// The positional parameters do not fit the statement.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The backend rejected the request or could not be reached.
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// The connectivity probe performed while constructing an adapter failed.
    #[error("failed to connect to backend: {0}")]
    Connect(#[source] RemoteError),
}

/// Operations that are part of the prepared-statement interface but are not translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotImplemented {
    /// `UPDATE` statements.
    #[error("UPDATE is not implemented for remote table backends")]
    Update,
    /// `DELETE` statements.
    #[error("DELETE is not implemented for remote table backends")]
    Delete,
    /// Row-by-row iteration.
    #[error("iterate() is not implemented for remote table backends")]
    Iterate,
    /// A synchronous call shape.
    #[error("synchronous {0}() is not supported by remote table backends; use the async form")]
    Sync(&'static str),
}

/// A failure reported by, or while talking to, a table backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The backend answered with an error.
    #[error("{0}")]
    Api(ApiError),
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The response could not be understood.
    #[error("malformed response: {0}")]
    Decode(String),
    /// The backend cannot be opened at the given location.
    #[error("unsupported location: {0}")]
    Location(String),
}

impl RemoteError {
    /// Whether the error reports that the requested table does not exist.
    pub fn is_undefined_table(&self, table: &str) -> bool {
        let Self::Api(err) = self else {
            return false;
        };
        matches!(err.code.as_deref(), Some("42P01" | "PGRST205"))
            || err
                .message
                .contains(&format!("relation \"{table}\" does not exist"))
    }
}

/// The error body returned by PostgREST, along with the HTTP status it came with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// The HTTP status code, if the error came over HTTP.
    #[serde(skip)]
    pub status: Option<u16>,
    /// A PostgreSQL SQLSTATE or PostgREST `PGRST` code.
    #[serde(default)]
    pub code: Option<String>,
    /// A human-readable message.
    #[serde(default)]
    pub message: String,
    /// Further detail, if any.
    #[serde(default)]
    pub details: Option<String>,
    /// A suggestion for fixing the error, if any.
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiError {
    /// An error with the given code and message and no HTTP status.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = &self.code {
            write!(f, "[{code}] ")?;
        }
        f.write_str(&self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        Ok(())
    }
}

impl From<ApiError> for RemoteError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}
