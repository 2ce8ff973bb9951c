//! Shared error definitions for toolgate primitives.

use thiserror::Error;

/// Result alias used throughout the primitives crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation identifier failed validation.
    #[error("invalid operation id `{id}`: {reason}")]
    InvalidOperationId {
        /// The offending identifier string.
        id: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Session identifier failed validation.
    #[error("invalid session id: {reason}")]
    InvalidSessionId {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Credential was empty or malformed.
    #[error("invalid credential: {reason}")]
    InvalidCredential {
        /// Human-readable reason for rejection.
        reason: &'static str,
    },

    /// HTTP method is not one an API description may declare.
    #[error("unsupported http method `{method}`")]
    UnknownMethod {
        /// The method string as supplied.
        method: String,
    },

    /// Access mode string could not be parsed.
    #[error("unknown access mode `{value}` (expected safe or unsafe)")]
    UnknownMode {
        /// The supplied value.
        value: String,
    },
}
