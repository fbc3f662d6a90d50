use crate::node::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary comparison between a variable and a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Combines two sub-expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

const NUMBER_OPERATORS: &[ComparisonOperator] = &[
    ComparisonOperator::Eq,
    ComparisonOperator::Neq,
    ComparisonOperator::Gt,
    ComparisonOperator::Gte,
    ComparisonOperator::Lt,
    ComparisonOperator::Lte,
];

const EQUALITY_OPERATORS: &[ComparisonOperator] =
    &[ComparisonOperator::Eq, ComparisonOperator::Neq];

impl ComparisonOperator {
    /// The operators an editor may offer for a variable of the given type.
    pub fn supported_by(value_type: ValueType) -> &'static [ComparisonOperator] {
        match value_type {
            ValueType::Number => NUMBER_OPERATORS,
            ValueType::String | ValueType::Boolean => EQUALITY_OPERATORS,
        }
    }

    pub fn accepts(&self, value_type: ValueType) -> bool {
        Self::supported_by(value_type).contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Neq => "neq",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Gte => "gte",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Lte => "lte",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "==",
            ComparisonOperator::Neq => "!=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Gte => ">=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Lte => "<=",
        }
    }
}

/// Keeps `current` if it is still valid for `value_type`, otherwise clears it.
///
/// Editors call this when the selected variable changes type.
pub fn reconcile_operator(
    value_type: Option<ValueType>,
    current: Option<ComparisonOperator>,
) -> Option<ComparisonOperator> {
    match (value_type, current) {
        (Some(value_type), Some(op)) if op.accepts(value_type) => Some(op),
        _ => None,
    }
}

impl LogicalOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("and"),
            LogicalOperator::Or => f.write_str("or"),
        }
    }
}
