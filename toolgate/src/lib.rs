//! OpenAPI-to-agent-tool gateway facade.
//!
//! Bundles the toolgate crates behind feature flags so downstream users
//! can pull in only the pieces they embed, for example the catalog and
//! policy without the HTTP forwarder.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use toolgate_primitives as primitives;

/// API description loading and categorization (enabled by `catalog` feature).
#[cfg(feature = "catalog")]
pub use toolgate_catalog as catalog;

/// Mode-based access policy (enabled by `policy` feature).
#[cfg(feature = "policy")]
pub use toolgate_policy as policy;

/// Upstream request forwarding (enabled by `forwarder` feature).
#[cfg(feature = "forwarder")]
pub use toolgate_forwarder as forwarder;

/// Tool listing, navigation and dispatch (enabled by `navigator` feature).
#[cfg(feature = "navigator")]
pub use toolgate_navigator as navigator;

/// Layered configuration (enabled by `config` feature).
#[cfg(feature = "config")]
pub use toolgate_config as config;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use toolgate_telemetry as telemetry;
