use super::{CERTIFICATE_CONFIG_KEY, CertificateRef, EXPRESSION_CONFIG_KEY, NodeType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Type-specific node configuration, kept as raw JSON.
pub type NodeConfig = Map<String, JsonValue>;

/// One element of the workflow tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<Node>>,
}

/// The stored payload of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    /// Data fields this crate does not interpret, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            data: NodeData {
                name: name.into(),
                ..NodeData::default()
            },
            blocks: None,
        }
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.data.config = Some(config);
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<Node>) -> Self {
        self.blocks = Some(blocks);
        self
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn is_disabled(&self) -> bool {
        self.data.disabled.unwrap_or(false)
    }

    pub fn children(&self) -> &[Node] {
        self.blocks.as_deref().unwrap_or(&[])
    }

    /// Looks up a node by id in this subtree, including the node itself.
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.blocks
            .as_mut()?
            .iter_mut()
            .find_map(|child| child.find_mut(id))
    }

    /// Every node id in this subtree, pre-order.
    pub fn subtree_ids(&self) -> Vec<&str> {
        let mut ids = vec![self.id.as_str()];
        for child in self.children() {
            ids.extend(child.subtree_ids());
        }
        ids
    }

    pub fn config_value(&self, key: &str) -> Option<&JsonValue> {
        self.data.config.as_ref()?.get(key)
    }

    /// The certificate reference of a deploy node, if present and well-formed.
    pub fn certificate_ref(&self) -> Option<CertificateRef> {
        if !self.kind.carries_certificate_reference() {
            return None;
        }
        self.config_value(CERTIFICATE_CONFIG_KEY)?
            .as_str()?
            .parse()
            .ok()
    }

    /// The raw stored branch condition, if this node carries one.
    pub fn raw_expression(&self) -> Option<&JsonValue> {
        if !self.kind.carries_expression() {
            return None;
        }
        self.config_value(EXPRESSION_CONFIG_KEY)
            .filter(|value| !value.is_null())
    }
}
