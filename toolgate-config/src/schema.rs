//! Strongly typed gateway settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use toolgate_primitives::{Credential, DiscoveryStrategy, Mode};
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Upstream request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Log directive used when neither configuration nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Complete gateway configuration.
///
/// Values straight out of a provider are unchecked; [`GatewayConfig::validate`]
/// normalizes them and is applied by [`crate::ConfigLoader::load`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Upstream API root, without trailing slash once validated.
    pub base_url: String,
    /// Process-level bearer token. Per-call credentials take precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Access mode for the whole process.
    pub mode: Mode,
    /// Tool presentation strategy.
    pub discovery: DiscoveryStrategy,
    /// URL or file path of the API description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_source: Option<String>,
    /// Upstream request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Default tracing directive.
    pub log_filter: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_token: None,
            mode: Mode::default(),
            discovery: DiscoveryStrategy::default(),
            spec_source: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl GatewayConfig {
    /// Checks and normalizes every field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `base_url` is missing or not an
    /// `http(s)` URL, or when the timeout is zero.
    pub fn validate(mut self) -> ConfigResult<Self> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(ConfigError::invalid(
                "base_url",
                "an upstream base URL is required",
            ));
        }
        let parsed = Url::parse(&base_url)
            .map_err(|err| ConfigError::invalid("base_url", format!("`{base_url}`: {err}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ConfigError::invalid(
                "base_url",
                format!("`{base_url}` must be an absolute http:// or https:// URL"),
            ));
        }
        self.base_url = base_url;

        self.auth_token = self
            .auth_token
            .map(|token| token.trim().to_owned())
            .filter(|token| !token.is_empty());

        self.spec_source = self
            .spec_source
            .map(|source| source.trim().to_owned())
            .filter(|source| !source.is_empty())
            .or_else(|| Some(format!("{}/openapi.json", self.base_url)));

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "request_timeout_secs",
                "must be at least one second",
            ));
        }
        if self.log_filter.trim().is_empty() {
            DEFAULT_LOG_FILTER.clone_into(&mut self.log_filter);
        }
        Ok(self)
    }

    /// Location of the API description.
    #[must_use]
    pub fn spec_source(&self) -> String {
        self.spec_source
            .clone()
            .unwrap_or_else(|| format!("{}/openapi.json", self.base_url))
    }

    /// Upstream request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Process-level credential, if a token is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the token is malformed.
    pub fn credential(&self) -> ConfigResult<Option<Credential>> {
        self.auth_token
            .as_deref()
            .map(Credential::bearer)
            .transpose()
            .map_err(|err| ConfigError::invalid("auth_token", err.to_string()))
    }
}

/// Values supplied explicitly, usually from command-line flags.
///
/// Unset fields leave the lower layers untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    /// Upstream API root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Process-level bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    /// Access mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    /// Tool presentation strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryStrategy>,
    /// API description location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_source: Option<String>,
    /// Default tracing directive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_base(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            base_url: base_url.into(),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn base_url_is_required() {
        let err = GatewayConfig::default().validate().expect_err("missing base url");
        assert!(matches!(err, ConfigError::Invalid { field: "base_url", .. }));
    }

    #[test]
    fn base_url_must_be_http() {
        let err = with_base("ftp://example.com").validate().expect_err("scheme");
        assert!(err.to_string().contains("http://"));

        let err = with_base("localhost:8080").validate().expect_err("no scheme");
        assert!(matches!(err, ConfigError::Invalid { field: "base_url", .. }));

        let err = with_base("http://").validate().expect_err("no host");
        assert!(matches!(err, ConfigError::Invalid { field: "base_url", .. }));
    }

    #[test]
    fn trailing_slash_and_spec_source_default() {
        let config = with_base("http://localhost:8080/api/v1/").validate().unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/api/v1");
        assert_eq!(
            config.spec_source(),
            "http://localhost:8080/api/v1/openapi.json"
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn empty_token_means_no_credential() {
        let config = GatewayConfig {
            auth_token: Some("  ".into()),
            ..with_base("https://airflow.example.com")
        }
        .validate()
        .unwrap();
        assert_eq!(config.auth_token, None);
        assert!(config.credential().unwrap().is_none());
    }

    #[test]
    fn token_becomes_bearer_credential() {
        let config = GatewayConfig {
            auth_token: Some("secret".into()),
            ..with_base("https://airflow.example.com")
        };
        let credential = config.credential().unwrap().unwrap();
        assert_eq!(credential.header_value(), "Bearer secret");
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = GatewayConfig {
            request_timeout_secs: 0,
            ..with_base("http://localhost")
        };
        assert!(config.validate().is_err());
    }
}
