pub mod managed;
pub mod state;

pub use managed::ManagedNode;
pub use state::NodeState;
