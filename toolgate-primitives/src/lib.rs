//! Core shared types for toolgate.

#![warn(missing_docs, clippy::pedantic)]

mod credential;
mod error;
mod ids;
mod method;
mod mode;

/// Bearer credential attached to forwarded calls.
pub use credential::Credential;
/// Error type and result alias shared across the SDK.
pub use error::{Error, Result};
/// Operation and session identifiers.
pub use ids::{OperationId, SessionId};
/// HTTP methods and safety classes.
pub use method::{HttpMethod, SafetyClass};
/// Access mode and discovery strategy.
pub use mode::{DiscoveryStrategy, Mode};
