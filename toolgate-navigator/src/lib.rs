//! Agent-facing tool surface over a loaded operation catalog.
//!
//! A [`Gateway`] lists tools and dispatches calls for one catalog under one
//! [`toolgate_primitives::Mode`]. In hierarchical discovery an agent browses
//! categories, selects one, and then sees that category's operations; the
//! position is a [`NavigationState`] owned per caller, either directly, by a
//! [`SessionStore`], or by a single-request [`RequestScope`]. Flat discovery
//! lists every visible operation at once.
//!
//! Listing and invocation consult the same access policy, so a hidden
//! operation fails exactly like an unknown tool.

#![warn(missing_docs, clippy::pedantic)]

pub mod dispatch;
pub mod error;
pub mod flat;
pub mod hierarchical;
pub mod navigation;
pub mod sessions;
pub mod stateless;
pub mod tools;

mod render;

pub use dispatch::{CallOutcome, Gateway, Target, ToolOutput};
pub use error::{ErrorKind, ToolFailure};
pub use navigation::{NavigationError, NavigationEvent, NavigationResult, NavigationState};
pub use sessions::SessionStore;
pub use stateless::RequestScope;
pub use tools::{NavigationTool, ToolBinding, ToolDescriptor};
