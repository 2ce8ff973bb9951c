//! Policy request and action contracts.

use serde::Serialize;
use toolgate_catalog::OperationDescriptor;
use toolgate_primitives::{Mode, OperationId, SafetyClass};

/// What the caller wants to do with an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    /// List the operation as a tool.
    Discover,
    /// Forward a call to the operation.
    Invoke,
}

impl PolicyAction {
    /// Returns a short verb for logs.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::Invoke => "invoke",
        }
    }
}

/// Full request sent to an [`crate::AccessPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRequest {
    operation: OperationId,
    safety: SafetyClass,
    action: PolicyAction,
    mode: Mode,
}

impl PolicyRequest {
    /// Creates a request from its parts.
    #[must_use]
    pub fn new(operation: OperationId, safety: SafetyClass, action: PolicyAction, mode: Mode) -> Self {
        Self {
            operation,
            safety,
            action,
            mode,
        }
    }

    /// Creates a request for a catalog operation.
    #[must_use]
    pub fn for_operation(operation: &OperationDescriptor, action: PolicyAction, mode: Mode) -> Self {
        Self::new(operation.id().clone(), operation.safety(), action, mode)
    }

    /// Targeted operation.
    #[must_use]
    pub fn operation(&self) -> &OperationId {
        &self.operation
    }

    /// Safety class of the targeted operation.
    #[must_use]
    pub const fn safety(&self) -> SafetyClass {
        self.safety
    }

    /// Requested action.
    #[must_use]
    pub const fn action(&self) -> PolicyAction {
        self.action
    }

    /// Mode in force for the request.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Concise label such as ``invoke `delete_dag` ``.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} `{}`", self.action.verb(), self.operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_names_action_and_operation() {
        let request = PolicyRequest::new(
            OperationId::new("delete_dag").unwrap(),
            SafetyClass::Unsafe,
            PolicyAction::Invoke,
            Mode::Restricted,
        );
        assert_eq!(request.label(), "invoke `delete_dag`");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["action"], "invoke");
        assert_eq!(json["mode"], "safe");
    }
}
