//! Error taxonomy for connection resolution
//!
//! Cursor and argument problems are reported immediately; failures raised by
//! the injected fetch/count capabilities pass through untouched.

use async_graphql::ErrorExtensions;

/// Errors produced while resolving a connection field.
#[derive(Debug, thiserror::Error)]
pub enum PaginationError {
    /// A `before`/`after` cursor could not be decoded.
    #[error("malformed cursor {cursor:?}: {reason}")]
    MalformedCursor { cursor: String, reason: &'static str },

    /// An `orderBy` key that the configured order enum does not define.
    #[error("unknown order {key:?} for {enum_name}")]
    UnknownOrder { key: String, enum_name: String },

    /// Connection arguments that cannot be combined or are out of range.
    #[error("invalid connection arguments: {0}")]
    InvalidArguments(String),

    /// Raised by the injected window fetch.
    #[error(transparent)]
    Fetch(anyhow::Error),

    /// Raised by the injected count query.
    #[error(transparent)]
    Count(anyhow::Error),

    /// Raised by a `before_fetch`/`after_resolve` hook.
    #[error(transparent)]
    Hook(anyhow::Error),
}

impl PaginationError {
    pub(crate) fn malformed(cursor: &str, reason: &'static str) -> Self {
        Self::MalformedCursor {
            cursor: cursor.to_string(),
            reason,
        }
    }

    /// Machine readable code attached to GraphQL errors.
    pub fn code(&self) -> &'static str {
        match self {
            PaginationError::MalformedCursor { .. } => "MALFORMED_CURSOR",
            PaginationError::UnknownOrder { .. } => "UNKNOWN_ORDER",
            PaginationError::InvalidArguments(_) => "INVALID_ARGUMENTS",
            PaginationError::Fetch(_) => "FETCH_FAILED",
            PaginationError::Count(_) => "COUNT_FAILED",
            PaginationError::Hook(_) => "HOOK_FAILED",
        }
    }
}

impl ErrorExtensions for PaginationError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

pub type Result<T, E = PaginationError> = std::result::Result<T, E>;
