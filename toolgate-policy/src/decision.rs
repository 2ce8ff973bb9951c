//! Visibility verdicts returned by access policies.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use toolgate_primitives::{Mode, SafetyClass};

/// Whether an operation is reachable, and why not when it is hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum PolicyDecision {
    /// The operation may be listed and called.
    Visible,
    /// The operation's safety class is not admitted in the active mode.
    Hidden {
        /// Safety class of the hidden operation.
        safety: SafetyClass,
        /// Mode that hides it.
        mode: Mode,
    },
}

impl PolicyDecision {
    /// Returns true when the operation may be listed and called.
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Visible)
    }

    /// Returns true when the operation is hidden.
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        !self.is_allow()
    }
}

impl Display for PolicyDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => f.write_str("visible"),
            Self::Hidden { safety, mode } => {
                write!(f, "{safety} operations are unavailable in {}", mode.label())
            }
        }
    }
}
