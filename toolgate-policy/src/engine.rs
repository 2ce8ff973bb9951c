//! Policy engine trait and the mode-based implementation.

use toolgate_catalog::OperationDescriptor;
use toolgate_primitives::{Mode, SafetyClass};
use tracing::debug;

use crate::contracts::{PolicyAction, PolicyRequest};
use crate::decision::PolicyDecision;

/// Trait implemented by policy engines.
///
/// Evaluation is pure: the same request always yields the same decision.
pub trait AccessPolicy: Send + Sync {
    /// Evaluates the supplied policy request.
    fn evaluate(&self, request: &PolicyRequest) -> PolicyDecision;
}

/// Admits safe operations always and unsafe ones only in [`Mode::Full`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ModePolicy;

impl AccessPolicy for ModePolicy {
    fn evaluate(&self, request: &PolicyRequest) -> PolicyDecision {
        match (request.mode(), request.safety()) {
            (Mode::Full, _) | (_, SafetyClass::Safe) => PolicyDecision::Visible,
            (mode @ Mode::Restricted, safety @ SafetyClass::Unsafe) => {
                debug!(
                    operation = %request.operation(),
                    action = request.action().verb(),
                    "mutating operation blocked in safe mode"
                );
                PolicyDecision::Hidden { safety, mode }
            }
        }
    }
}

/// Returns whether `operation` may be listed under `mode`.
#[must_use]
pub fn is_visible(operation: &OperationDescriptor, mode: Mode) -> bool {
    ModePolicy
        .evaluate(&PolicyRequest::for_operation(
            operation,
            PolicyAction::Discover,
            mode,
        ))
        .is_allow()
}
