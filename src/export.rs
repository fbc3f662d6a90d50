//! Read-only export of a workflow graph to JSON or YAML.
//!
//! Every node is written with a fixed key order: `id`, `type`, `name`,
//! `disabled` (if set), `config` (if set), `blocks` (if present), then any
//! remaining data fields in their stored order. Users diff these exports, so the order must not
//! change.

use crate::error::ExportError;
use crate::node::Node;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Output syntax of the export view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => f.write_str("json"),
            ExportFormat::Yaml => f.write_str("yaml"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Serializes a node with the export key order.
pub struct ExportedNode<'a>(pub &'a Node);

impl Serialize for ExportedNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.0;
        let data = &node.data;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &node.id)?;
        map.serialize_entry("type", &node.kind)?;
        map.serialize_entry("name", &data.name)?;
        if let Some(disabled) = data.disabled {
            map.serialize_entry("disabled", &disabled)?;
        }
        if let Some(config) = &data.config {
            map.serialize_entry("config", config)?;
        }
        if let Some(blocks) = &node.blocks {
            let blocks: Vec<ExportedNode<'_>> = blocks.iter().map(ExportedNode).collect();
            map.serialize_entry("blocks", &blocks)?;
        }
        for (key, value) in &data.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Serializes a whole graph as `{ "nodes": [...] }`.
pub struct ExportedGraph<'a>(pub &'a [Node]);

impl Serialize for ExportedGraph<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let nodes: Vec<ExportedNode<'_>> = self.0.iter().map(ExportedNode).collect();
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("nodes", &nodes)?;
        map.end()
    }
}

pub fn to_json(nodes: &[Node]) -> Result<String, ExportError> {
    serde_json::to_string_pretty(&ExportedGraph(nodes))
        .map_err(|e| ExportError::Json(e.to_string()))
}

pub fn to_yaml(nodes: &[Node]) -> Result<String, ExportError> {
    serde_yaml::to_string(&ExportedGraph(nodes)).map_err(|e| ExportError::Yaml(e.to_string()))
}

pub fn export(nodes: &[Node], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => to_json(nodes),
        ExportFormat::Yaml => to_yaml(nodes),
    }
}
