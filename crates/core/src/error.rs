//! Domain error model.

use thiserror::Error;

/// Result type used across the report and wizard layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only user-facing, deterministic failures live here (bad selection,
/// malformed identifiers). Attachment merge failures never become a
/// `DomainError`: the pipeline degrades instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The user's input or selection is not acceptable.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced record does not exist on the host.
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}
