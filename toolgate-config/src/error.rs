//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures while assembling or validating a [`crate::GatewayConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file `{}` not found", path.display())]
    MissingFile {
        /// Requested path.
        path: PathBuf,
    },

    /// A provider produced values that could not be extracted.
    #[error("failed to read configuration: {source}")]
    Extract {
        /// Underlying figment error.
        #[source]
        source: Box<figment::Error>,
    },

    /// A field holds an unusable value.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(source: figment::Error) -> Self {
        Self::Extract {
            source: Box::new(source),
        }
    }
}
