use crate::error::{DocumentError, StoreError};
use crate::graph::{ConfigStore, TreeIndex};
use crate::node::{Node, NodeConfig};
use serde::{Deserialize, Serialize};
use std::fs;

/// A workflow graph as stored: `{ "nodes": [...] }`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FlowDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl FlowDocument {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Parses a document and checks that node ids are unique.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let document: FlowDocument = serde_json::from_str(json)
            .map_err(|e| DocumentError::JsonParseError(e.to_string()))?;
        document.index()?;
        Ok(document)
    }

    /// Load a document from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn index(&self) -> Result<TreeIndex<'_>, DocumentError> {
        Ok(TreeIndex::new(&self.nodes)?)
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find_map(|node| node.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find_map(|node| node.find_mut(id))
    }
}

impl ConfigStore for FlowDocument {
    fn config(&self, node_id: &str) -> Option<&NodeConfig> {
        self.find(node_id)?.data.config.as_ref()
    }

    fn set_config(&mut self, node_id: &str, config: NodeConfig) -> Result<(), StoreError> {
        let node = self
            .find_mut(node_id)
            .ok_or_else(|| StoreError::NodeNotFound(node_id.to_string()))?;
        node.data.config = Some(config);
        Ok(())
    }
}
