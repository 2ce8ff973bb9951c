//! Errors produced while forwarding a call.

use thiserror::Error;

use crate::traits::TransportError;

/// Result alias for forwarding.
pub type ForwardResult<T> = Result<T, ForwardError>;

/// Reasons a call did not produce an upstream response.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Neither the call nor the process carries a credential.
    #[error("no credential available for the upstream api")]
    CredentialRejectedLocally,

    /// Arguments failed validation or could not be encoded.
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArguments {
        /// Offending argument name.
        argument: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Network failure or timeout.
    #[error("upstream api unreachable: {0}")]
    UpstreamUnreachable(#[source] TransportError),

    /// Forwarder misconfigured (bad base URL).
    #[error("invalid forwarder configuration: {reason}")]
    Configuration {
        /// Human-readable cause.
        reason: String,
    },
}

impl ForwardError {
    /// Creates an [`ForwardError::InvalidArguments`] error.
    #[must_use]
    pub fn invalid_arguments(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            argument: argument.into(),
            reason: reason.into(),
        }
    }
}

impl From<TransportError> for ForwardError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidRequest { reason } => Self::invalid_arguments("request", reason),
            other => Self::UpstreamUnreachable(other),
        }
    }
}
