//! Observability setup for toolgate processes.
//!
//! Logs go to stderr so stdout stays free for tool output and protocol
//! data. `RUST_LOG` takes precedence over the configured directive.

#![warn(missing_docs, clippy::pedantic)]

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Directive for a `-v` count, falling back to `configured` when zero.
#[must_use]
pub fn verbosity_directive(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

/// Builds the filter: `RUST_LOG` when set, else `default_directive`.
///
/// # Errors
///
/// Fails when `default_directive` is not a valid filter.
pub fn env_filter(default_directive: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive)
            .with_context(|| format!("invalid log filter `{default_directive}`")),
    }
}

/// Installs the global fmt subscriber.
///
/// # Errors
///
/// Fails on an invalid directive or if a global subscriber is already set.
pub fn init(default_directive: &str) -> Result<()> {
    let filter = env_filter(default_directive)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;
    tracing::debug!(directive = default_directive, "tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_overrides_configured_level() {
        assert_eq!(verbosity_directive(0, "warn"), "warn");
        assert_eq!(verbosity_directive(1, "warn"), "debug");
        assert_eq!(verbosity_directive(3, "warn"), "trace");
    }

    #[test]
    fn accepts_module_directives() {
        assert!(env_filter("info,toolgate_forwarder=debug").is_ok());
    }
}
