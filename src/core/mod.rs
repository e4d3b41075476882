pub mod error;
pub mod frame;
pub mod node;
pub mod slot;
pub mod target;
pub mod tendrils;

pub use error::{error_kind, ErrorKind, NodeError, SlotResult};
pub use frame::Frame;
pub use node::ProcessingNode;
pub use slot::{SlotInfo, SlotValue};
pub use target::CaptureTarget;
pub use tendrils::Tendrils;
