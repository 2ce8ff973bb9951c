//! Hooks notified whenever an invocation is checked against the policy.

use tracing::{debug, warn};

use crate::contracts::PolicyRequest;
use crate::decision::PolicyDecision;

/// Observer invoked whenever a policy decision is produced.
pub trait PolicyObserver: Send + Sync {
    /// Records the decision emitted for the supplied request.
    fn on_decision(&self, request: &PolicyRequest, decision: PolicyDecision);
}

/// Observer that emits decisions to the tracing system.
#[derive(Debug, Default)]
pub struct TracingPolicyObserver;

impl PolicyObserver for TracingPolicyObserver {
    fn on_decision(&self, request: &PolicyRequest, decision: PolicyDecision) {
        let subject = request.label();
        match decision {
            PolicyDecision::Visible => {
                debug!(mode = %request.mode(), subject = %subject, "policy allow");
            }
            PolicyDecision::Hidden { .. } => {
                warn!(
                    mode = %request.mode(),
                    subject = %subject,
                    reason = %decision,
                    "policy deny"
                );
            }
        }
    }
}
