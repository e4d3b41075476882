//! Error types raised by slot containers, the lifecycle manager and nodes.
//!
//! Node stages return `anyhow::Result`, so hosts recover these with
//! `err.downcast_ref::<NodeError>()` and branch on [`NodeError::kind`].

use super::CaptureTarget;
use thiserror::Error;

/// Coarse classification used by hosts to decide what to do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Programmer error: wrong stage order, unknown slot, wrong type.
    ContractViolation,
    /// A slot was read with no value and no default.
    UninitializedSlot,
    /// A capture source could not be opened. Retrying is host policy.
    DeviceOpenFailure,
    /// A sink received an empty frame.
    EmptyInput,
    /// A backend produced data the node cannot interpret.
    InvalidData,
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("slot '{name}' already declared as {existing}, cannot redeclare as {requested}")]
    DuplicateSlot {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },

    #[error("unknown slot '{name}'")]
    UnknownSlot { name: String },

    #[error("type mismatch on slot '{name}': declared {expected}, requested {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("slot '{name}' has no value and no default")]
    UninitializedSlot { name: String },

    #[error("invalid value for slot '{name}' ({expected}): {source}")]
    InvalidValue {
        name: String,
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot {operation} node in state {state}")]
    ContractViolation {
        operation: &'static str,
        state: String,
    },

    #[error("could not open {target}: {reason}")]
    DeviceOpenFailure { target: CaptureTarget, reason: String },

    #[error("empty frame on input '{slot}'")]
    EmptyInput { slot: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateSlot { .. }
            | Self::UnknownSlot { .. }
            | Self::TypeMismatch { .. }
            | Self::InvalidValue { .. }
            | Self::ContractViolation { .. } => ErrorKind::ContractViolation,
            Self::UninitializedSlot { .. } => ErrorKind::UninitializedSlot,
            Self::DeviceOpenFailure { .. } => ErrorKind::DeviceOpenFailure,
            Self::EmptyInput { .. } => ErrorKind::EmptyInput,
            Self::InvalidData(_) => ErrorKind::InvalidData,
        }
    }

    /// Fatal errors end the node's use; the rest may be retried by the host.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ContractViolation | ErrorKind::UninitializedSlot
        )
    }
}

/// Classify an error coming out of a node stage, if it is one of ours.
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.downcast_ref::<NodeError>().map(NodeError::kind)
}

pub type SlotResult<T> = std::result::Result<T, NodeError>;
