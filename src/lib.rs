//! Typed-slot dataflow node runtime.
//!
//! Nodes declare typed parameters, inputs and outputs in [`core::Tendrils`]
//! containers and are driven through a fixed lifecycle (declare parameters,
//! configure, process repeatedly) by [`engine::ManagedNode`].

pub mod core;
pub mod engine;
pub mod hal;
pub mod nodes;
pub mod observability;
pub mod registry;

pub use crate::core::{ErrorKind, Frame, NodeError, ProcessingNode, Tendrils};
pub use engine::{ManagedNode, NodeState};
