use crate::core::{ProcessingNode, SlotInfo, Tendrils};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Factory function type for creating node instances
pub type NodeFactory = fn() -> Box<dyn ProcessingNode>;

/// Registration record for a node type
#[derive(Clone)]
pub struct NodeMetadata {
    /// Lower-cased type name, unique across the registry
    pub id: String,
    pub name: String,
    pub doc: String,
    pub factory: NodeFactory,
}

/// Serializable description of a node type and its parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescription {
    pub id: String,
    pub name: String,
    pub doc: String,
    pub parameters: Vec<SlotInfo>,
}

impl NodeMetadata {
    /// Create a new instance of this node type
    pub fn create_instance(&self) -> Box<dyn ProcessingNode> {
        (self.factory)()
    }

    /// Run the declare-parameters stage on a throwaway instance to list the
    /// parameters this node type accepts.
    pub fn describe(&self) -> Result<NodeDescription> {
        let mut params = Tendrils::new();
        self.create_instance().declare_params(&mut params)?;
        Ok(NodeDescription {
            id: self.id.clone(),
            name: self.name.clone(),
            doc: self.doc.clone(),
            parameters: params.iter().collect(),
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name) || self.name.eq_ignore_ascii_case(name)
    }
}

// Factory type for creating node metadata at runtime
pub type NodeMetadataFactory = fn() -> NodeMetadata;

// Wrapper for inventory collection
pub struct NodeMetadataFactoryWrapper(pub NodeMetadataFactory);

inventory::collect!(NodeMetadataFactoryWrapper);
