//! Gateway scoped to a single inbound request.

use std::sync::Arc;

use serde_json::Value;
use toolgate_catalog::OperationCatalog;
use toolgate_forwarder::RequestForwarder;
use toolgate_primitives::{Credential, DiscoveryStrategy, Mode};
use tracing::warn;
use url::form_urlencoded;

use crate::dispatch::{CallOutcome, Gateway};
use crate::error::ToolFailure;
use crate::navigation::NavigationState;
use crate::tools::ToolDescriptor;

/// Everything one request needs, derived fresh from its query string.
///
/// Only the parsed catalog is shared between requests.
#[derive(Debug)]
pub struct RequestScope {
    gateway: Gateway,
    state: NavigationState,
    credential: Option<Credential>,
}

impl RequestScope {
    /// Builds a scope from the request's raw query string.
    ///
    /// The `mode` parameter selects the mode; when absent or unrecognized
    /// the scope runs in [`Mode::Restricted`].
    #[must_use]
    pub fn from_query(
        catalog: Arc<OperationCatalog>,
        forwarder: RequestForwarder,
        query: &str,
        credential: Option<Credential>,
    ) -> Self {
        let mode = mode_from_query(query);
        Self {
            gateway: Gateway::new(catalog, forwarder, mode),
            state: NavigationState::default(),
            credential,
        }
    }

    /// Selects hierarchical or flat discovery for this request.
    #[must_use]
    pub fn with_strategy(mut self, strategy: DiscoveryStrategy) -> Self {
        self.gateway = self.gateway.with_strategy(strategy);
        self
    }

    /// Mode derived for this request.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.gateway.mode()
    }

    /// Gateway serving this request.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Tools offered at the request's current position.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.gateway.list_tools(&self.state)
    }

    /// Calls a tool with the request's credential.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::call`].
    pub async fn call(&mut self, name: &str, arguments: &Value) -> Result<CallOutcome, ToolFailure> {
        self.gateway
            .call(&mut self.state, name, arguments, self.credential.as_ref())
            .await
    }
}

fn mode_from_query(query: &str) -> Mode {
    let raw = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find_map(|(key, value)| (key == "mode").then_some(value));

    match raw.as_deref() {
        None | Some("") => Mode::Restricted,
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(value, "unrecognized mode parameter, using safe mode");
            Mode::Restricted
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parameter_parsing() {
        assert_eq!(mode_from_query(""), Mode::Restricted);
        assert_eq!(mode_from_query("mode=unsafe"), Mode::Full);
        assert_eq!(mode_from_query("?foo=1&mode=safe"), Mode::Restricted);
        assert_eq!(mode_from_query("mode=sideways"), Mode::Restricted);
        assert_eq!(mode_from_query("mode"), Mode::Restricted);
    }

    #[test]
    fn mode_parameter_is_percent_decoded() {
        assert_eq!(mode_from_query("mode=%75nsafe"), Mode::Full);
        assert_eq!(mode_from_query("m%6Fde=unsafe"), Mode::Full);
        assert_eq!(mode_from_query("mode=un+safe"), Mode::Restricted);
        assert_eq!(mode_from_query("other=1&mode=%20"), Mode::Restricted);
    }
}
