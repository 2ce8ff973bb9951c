//! Structured failures returned to agents.

use std::fmt;

use serde::Serialize;
use toolgate_catalog::CatalogError;
use toolgate_forwarder::ForwardError;

/// Closed set of failure kinds an agent can reason about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The API description could not be fetched or read.
    SpecUnavailable,
    /// The API description is malformed.
    SpecInvalid,
    /// Navigation into a category that does not exist or is fully hidden.
    CategoryNotFound,
    /// The tool is unknown or hidden by the active mode.
    OperationNotVisible,
    /// Arguments are missing, mistyped, or not an object.
    InvalidArguments,
    /// The upstream API could not be reached.
    UpstreamUnreachable,
    /// No usable credential was present.
    CredentialRejectedLocally,
}

impl ErrorKind {
    /// Stable `snake_case` name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SpecUnavailable => "spec_unavailable",
            Self::SpecInvalid => "spec_invalid",
            Self::CategoryNotFound => "category_not_found",
            Self::OperationNotVisible => "operation_not_visible",
            Self::InvalidArguments => "invalid_arguments",
            Self::UpstreamUnreachable => "upstream_unreachable",
            Self::CredentialRejectedLocally => "credential_rejected_locally",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure payload: a kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ToolFailure {
    kind: ErrorKind,
    message: String,
}

impl ToolFailure {
    /// Creates a failure of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Unknown or hidden tool. Both render identically.
    #[must_use]
    pub fn not_available(name: &str) -> Self {
        Self::new(
            ErrorKind::OperationNotVisible,
            format!("tool `{name}` is not available"),
        )
    }

    /// Invalid navigation or call arguments.
    #[must_use]
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArguments, message)
    }

    /// Failure kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ForwardError> for ToolFailure {
    fn from(err: ForwardError) -> Self {
        let kind = match &err {
            ForwardError::CredentialRejectedLocally => ErrorKind::CredentialRejectedLocally,
            ForwardError::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            ForwardError::UpstreamUnreachable(_) | ForwardError::Configuration { .. } => {
                ErrorKind::UpstreamUnreachable
            }
        };
        Self::new(kind, err.to_string())
    }
}

impl From<CatalogError> for ToolFailure {
    fn from(err: CatalogError) -> Self {
        let kind = match &err {
            CatalogError::Unavailable { .. } => ErrorKind::SpecUnavailable,
            CatalogError::Invalid { .. } => ErrorKind::SpecInvalid,
        };
        Self::new(kind, err.to_string())
    }
}
