//! Errors produced while loading an API description.

use serde::Serialize;
use thiserror::Error;

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Load-level failures that make the whole tool surface unavailable.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The description could not be fetched or read.
    #[error("api description unavailable from {location}: {reason}")]
    Unavailable {
        /// URL or path that was attempted.
        location: String,
        /// Human-readable cause.
        reason: String,
    },

    /// The document as a whole is malformed.
    #[error("invalid api description: {reason}")]
    Invalid {
        /// Human-readable cause.
        reason: String,
    },
}

impl CatalogError {
    /// Creates an [`CatalogError::Unavailable`] for the supplied location.
    #[must_use]
    pub fn unavailable(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`CatalogError::Invalid`] error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// An operation that was excluded during load, with the reason it was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RejectedOperation {
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template as declared.
    pub path: String,
    /// Declared `operationId`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Why the operation was excluded.
    pub reason: String,
}
