//! Configuration management for toolgate.
//!
//! Settings are layered with [`figment`]: built-in defaults, an optional
//! TOML file, `TOOLGATE_*` environment variables, the legacy
//! `AIRFLOW_BASE_URL` / `AUTH_TOKEN` variables, and finally explicit
//! overrides (typically command-line flags). The merged result is
//! validated once and handed to the runtime as a [`GatewayConfig`].

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod loader;
mod schema;

/// Configuration errors.
pub use error::{ConfigError, ConfigResult};
/// Layered loader.
pub use loader::{ConfigLoader, ENV_PREFIX};
/// Configuration schema and command-line overrides.
pub use schema::{ConfigOverrides, DEFAULT_LOG_FILTER, DEFAULT_TIMEOUT_SECS, GatewayConfig};
