//! Layered configuration loading.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{ConfigOverrides, GatewayConfig};

/// Prefix for environment variables read by the loader.
pub const ENV_PREFIX: &str = "TOOLGATE_";

const PROJECT_FILE: &str = "toolgate.toml";

/// Environment variables honoured for compatibility with existing
/// deployments, mapped onto their configuration keys.
const LEGACY_ENV: [(&str, &str); 2] = [
    ("AIRFLOW_BASE_URL", "base_url"),
    ("AUTH_TOKEN", "auth_token"),
];

/// Builds a [`GatewayConfig`] from every configured source.
///
/// Later layers win: defaults, TOML file, `TOOLGATE_*` variables, legacy
/// variables, explicit overrides.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    /// Loader reading `./toolgate.toml` when it exists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the given file instead of `./toolgate.toml`. The file must exist.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Applies explicit values on top of every other layer.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Assembles the provider stack without extracting it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] if an explicit file is absent.
    pub fn figment(&self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(GatewayConfig::default()));

        match &self.file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile { path: path.clone() });
            }
            Some(path) => figment = merge_file(figment, path),
            None if Path::new(PROJECT_FILE).exists() => {
                figment = merge_file(figment, Path::new(PROJECT_FILE));
            }
            None => {}
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX));
        for (variable, key) in LEGACY_ENV {
            figment = figment.merge(Env::raw().only(&[variable]).map(move |_| key.into()));
        }

        Ok(figment.merge(Serialized::defaults(&self.overrides)))
    }

    /// Extracts and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Extract`] when a layer holds values of the
    /// wrong shape, and the errors of [`GatewayConfig::validate`].
    pub fn load(&self) -> ConfigResult<GatewayConfig> {
        let config: GatewayConfig = self.figment()?.extract()?;
        let config = config.validate()?;
        debug!(
            base_url = %config.base_url,
            mode = %config.mode,
            discovery = ?config.discovery,
            "configuration loaded"
        );
        Ok(config)
    }
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    debug!(path = %path.display(), "reading configuration file");
    figment.merge(Toml::file(path))
}
