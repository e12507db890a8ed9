//! Error types for resolution collaborators

use thiserror::Error;

/// Failure of one collaborator call. Never escapes a resolution pass; it is
/// rendered as a diagnostic in place of the affected content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for ResolveError {
    fn from(e: serde_json::Error) -> Self {
        ResolveError::InvalidResponse(e.to_string())
    }
}
