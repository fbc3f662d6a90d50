use super::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of node types that can appear in a workflow tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    // Flow boundaries
    Start,
    End,

    // Branch constructs and their branches
    Condition,
    BranchBlock,
    TryCatch,
    TryBlock,
    CatchBlock,

    // Business leaves
    BizApply,
    BizUpload,
    BizMonitor,
    BizDeploy,
    BizNotify,
    Delay,

    // Structural markers owned by the rendering engine
    BlockIcon,
    BlockOrderIcon,
    InlineBlocks,
    TrySlot,
}

/// A typed variable a node publishes for use in branch conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeVariable {
    pub name: &'static str,
    pub value_type: ValueType,
}

const CERTIFICATE_VARIABLES: &[NodeVariable] = &[
    NodeVariable {
        name: "certificate.validity",
        value_type: ValueType::Boolean,
    },
    NodeVariable {
        name: "certificate.daysLeft",
        value_type: ValueType::Number,
    },
];

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Start => "start",
            NodeType::End => "end",
            NodeType::Condition => "condition",
            NodeType::BranchBlock => "branchBlock",
            NodeType::TryCatch => "tryCatch",
            NodeType::TryBlock => "tryBlock",
            NodeType::CatchBlock => "catchBlock",
            NodeType::BizApply => "bizApply",
            NodeType::BizUpload => "bizUpload",
            NodeType::BizMonitor => "bizMonitor",
            NodeType::BizDeploy => "bizDeploy",
            NodeType::BizNotify => "bizNotify",
            NodeType::Delay => "delay",
            NodeType::BlockIcon => "blockIcon",
            NodeType::BlockOrderIcon => "blockOrderIcon",
            NodeType::InlineBlocks => "inlineBlocks",
            NodeType::TrySlot => "trySlot",
        }
    }

    /// Rendering-only nodes that never appear in variable pickers.
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            NodeType::BlockIcon | NodeType::BlockOrderIcon | NodeType::InlineBlocks | NodeType::TrySlot
        )
    }

    /// Nodes that own several conditionally executed branches.
    pub fn is_branch_construct(&self) -> bool {
        matches!(self, NodeType::Condition | NodeType::TryCatch)
    }

    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            NodeType::BranchBlock | NodeType::TryBlock | NodeType::CatchBlock
        )
    }

    /// Nodes whose `config.expression` holds a branch condition.
    pub fn carries_expression(&self) -> bool {
        matches!(self, NodeType::Condition | NodeType::BranchBlock)
    }

    /// Nodes whose `config.certificate` points at an upstream certificate output.
    pub fn carries_certificate_reference(&self) -> bool {
        matches!(self, NodeType::BizDeploy)
    }

    /// Nodes whose certificate output can be consumed by a deploy node.
    pub fn provides_certificate(&self) -> bool {
        matches!(self, NodeType::BizApply | NodeType::BizUpload)
    }

    /// Variables this node type exposes to branch conditions downstream.
    pub fn variables(&self) -> &'static [NodeVariable] {
        match self {
            NodeType::BizApply | NodeType::BizUpload | NodeType::BizMonitor => {
                CERTIFICATE_VARIABLES
            }
            _ => &[],
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
