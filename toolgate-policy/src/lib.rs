//! Access policy deciding which operations are reachable in a given mode.
//!
//! Discovery and invocation share one [`AccessPolicy`] so an operation an
//! agent cannot see is also one it cannot call.

#![warn(missing_docs, clippy::pedantic)]

pub mod contracts;
pub mod decision;
pub mod engine;
pub mod observer;

pub use contracts::{PolicyAction, PolicyRequest};
pub use decision::PolicyDecision;
pub use engine::{AccessPolicy, ModePolicy, is_visible};
pub use observer::{PolicyObserver, TracingPolicyObserver};
