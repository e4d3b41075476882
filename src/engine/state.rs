use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a managed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Constructed,
    ParamsDeclared,
    Configured,
    /// At least one process call has been made
    Ready,
    /// A stage failed fatally; the node must not be used again
    Failed,
}

impl NodeState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &NodeState) -> bool {
        use NodeState::*;

        matches!(
            (self, target),
            (Constructed, ParamsDeclared)
                | (ParamsDeclared, Configured)
                | (Configured, Ready)
                | (Ready, Ready)
                // Any live stage can fail
                | (Constructed, Failed)
                | (ParamsDeclared, Failed)
                | (Configured, Failed)
                | (Ready, Failed)
        )
    }

    /// Parameter values may only be supplied between declaration and configure.
    pub fn accepts_params(&self) -> bool {
        *self == NodeState::ParamsDeclared
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, NodeState::Configured | NodeState::Ready)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Constructed => "Constructed",
            Self::ParamsDeclared => "ParamsDeclared",
            Self::Configured => "Configured",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        }
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::Constructed
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
