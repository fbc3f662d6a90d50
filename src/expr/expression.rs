use super::{ComparisonOperator, LogicalOperator};
use crate::node::{Selector, ValueType};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// A branch condition, stored in a node's `config.expression`.
///
/// Only `Comparison(Variant, Constant)` leaves joined by `Logical` nodes are
/// produced by the editor, but any shape deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    #[serde(rename = "comparison")]
    Comparison {
        operator: ComparisonOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "logical")]
    Logical {
        operator: LogicalOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "var")]
    Variant { selector: Selector },
    #[serde(rename = "const")]
    Constant {
        value: Value,
        #[serde(rename = "valueType")]
        value_type: ValueType,
    },
}

/// A constant operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    /// A stored constant no editor produces (`null`, arrays, objects), kept as is.
    Invalid(JsonValue),
}

impl Value {
    /// Reads editor text as a value of the given type.
    ///
    /// Text that does not parse as the requested type is kept as a string.
    pub fn parse(raw: &str, value_type: ValueType) -> Self {
        match value_type {
            ValueType::Number => raw
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            ValueType::Boolean => match raw.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
            ValueType::String => Value::String(raw.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
            Value::Invalid(raw) => write!(f, "{}", raw),
        }
    }
}

impl Expr {
    pub fn variant(selector: Selector) -> Self {
        Expr::Variant { selector }
    }

    pub fn constant(value: Value, value_type: ValueType) -> Self {
        Expr::Constant { value, value_type }
    }

    pub fn comparison(operator: ComparisonOperator, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn logical(operator: LogicalOperator, left: Expr, right: Expr) -> Self {
        Expr::Logical {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Collects every variable selector in the expression, left to right.
    pub fn selectors(&self) -> Vec<&Selector> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Comparison { left, right, .. } | Expr::Logical { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
                Expr::Variant { selector } => found.push(selector),
                Expr::Constant { .. } => {}
            }
        }
        found
    }

    /// Rewrites every variable selector in place, without recursion.
    pub fn for_each_selector_mut(&mut self, mut visit: impl FnMut(&mut Selector)) {
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                Expr::Comparison { left, right, .. } | Expr::Logical { left, right, .. } => {
                    stack.push(right.as_mut());
                    stack.push(left.as_mut());
                }
                Expr::Variant { selector } => visit(selector),
                Expr::Constant { .. } => {}
            }
        }
    }
}
