//! Registry of node types declared with `#[derive(RegisterNode)]`.

pub mod metadata;

pub use metadata::{
    NodeDescription, NodeFactory, NodeMetadata, NodeMetadataFactory, NodeMetadataFactoryWrapper,
};

/// Every registered node type, sorted by id.
pub fn all() -> Vec<NodeMetadata> {
    let mut nodes: Vec<NodeMetadata> = inventory::iter::<NodeMetadataFactoryWrapper>
        .into_iter()
        .map(|wrapper| (wrapper.0)())
        .collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    nodes
}

/// Look up a node type by id or display name, ignoring case.
pub fn find(name: &str) -> Option<NodeMetadata> {
    inventory::iter::<NodeMetadataFactoryWrapper>
        .into_iter()
        .map(|wrapper| (wrapper.0)())
        .find(|meta| meta.matches(name))
}
