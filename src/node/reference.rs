//! Cross-reference conventions shared by every node configuration.
//!
//! Two forms exist. Deploy nodes point at an upstream certificate with a
//! `"<nodeId>#certificate"` string, and branch conditions embed [`Selector`]s
//! (`{ id, name, type }`) inside their expressions. Editors carry selectors
//! around as flat `"<id>#<name>#<type>"` keys.

use crate::error::SelectorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Config key holding a deploy node's certificate reference.
pub const CERTIFICATE_CONFIG_KEY: &str = "certificate";
/// Config key holding a branch condition.
pub const EXPRESSION_CONFIG_KEY: &str = "expression";
/// Output field name used in certificate references.
pub const CERTIFICATE_FIELD: &str = "certificate";

/// The type of a value flowing between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    String,
    Boolean,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(ValueType::Number),
            "string" => Ok(ValueType::String),
            "boolean" => Ok(ValueType::Boolean),
            other => Err(SelectorError::UnknownValueType(other.to_string())),
        }
    }
}

/// Identifies one typed output of another node.
///
/// `Selector::default()` is the empty selector editors treat as incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
}

impl Selector {
    pub fn new(id: impl Into<String>, name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value_type: Some(value_type),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty() && self.value_type.is_some()
    }

    /// The flat `"<id>#<name>#<type>"` key used by form widgets.
    pub fn to_key(&self) -> String {
        format!(
            "{}#{}#{}",
            self.id,
            self.name,
            self.value_type.map(|t| t.as_str()).unwrap_or("")
        )
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('#').collect();
        match parts.as_slice() {
            [id, name, value_type] if !id.is_empty() && !name.is_empty() => Ok(Selector {
                id: id.to_string(),
                name: name.to_string(),
                value_type: Some(value_type.parse()?),
            }),
            _ => Err(SelectorError::MalformedSelector(s.to_string())),
        }
    }
}

/// A deploy node's pointer at an upstream node's output, `"<nodeId>#<field>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificateRef {
    pub node_id: String,
    pub field: String,
}

impl CertificateRef {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            field: CERTIFICATE_FIELD.to_string(),
        }
    }

    /// Returns the same reference pointing at a different node.
    pub fn retarget(&self, node_id: &str) -> Self {
        Self {
            node_id: node_id.to_string(),
            field: self.field.clone(),
        }
    }
}

impl fmt::Display for CertificateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.node_id, self.field)
    }
}

impl FromStr for CertificateRef {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('#') {
            Some((node_id, field)) if !node_id.is_empty() && !field.is_empty() => {
                Ok(CertificateRef {
                    node_id: node_id.to_string(),
                    field: field.to_string(),
                })
            }
            _ => Err(SelectorError::MalformedReference(s.to_string())),
        }
    }
}
