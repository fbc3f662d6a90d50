//! Conversion between [`Expr`] trees and the flat, form-editable condition list.
//!
//! Form widgets cannot edit a recursive AST, so the editor works on a
//! [`FlatForm`]: a list of `variable <op> constant` rows joined by a single
//! logical operator. The conversion assumes that uniform operator. A tree that
//! mixes `and` and `or` flattens with the last operator seen and will not
//! round-trip.

use super::{ComparisonOperator, Expr, LogicalOperator, Value};
use crate::error::StoreError;
use crate::graph::ConfigStore;
use crate::node::{EXPRESSION_CONFIG_KEY, Selector, ValueType};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One editable row: `left_selector <operator> right_value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatCondition {
    /// Flat selector key, `"<id>#<name>#<type>"`.
    pub left_selector: String,
    pub operator: Option<ComparisonOperator>,
    pub right_value: String,
}

/// The editor-facing form of a branch condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatForm {
    pub conditions: Vec<FlatCondition>,
    pub logical_operator: LogicalOperator,
}

impl FlatCondition {
    pub fn new(
        selector: &Selector,
        operator: ComparisonOperator,
        right_value: impl Into<String>,
    ) -> Self {
        Self {
            left_selector: selector.to_key(),
            operator: Some(operator),
            right_value: right_value.into(),
        }
    }

    pub fn is_incomplete(&self) -> bool {
        self.left_selector.is_empty() || self.operator.is_none() || self.right_value.is_empty()
    }

    /// The selector this row points at, empty when the key is malformed.
    pub fn selector(&self) -> Selector {
        self.left_selector.parse().unwrap_or_default()
    }

    /// Value type of the selected variable, used to pick valid operators.
    pub fn value_type(&self) -> Option<ValueType> {
        self.selector().value_type
    }
}

/// Flattens a stored condition into editable rows.
///
/// Malformed comparisons (operands other than variable/constant) are dropped
/// with a warning. A constant the editor cannot show (`null`, arrays, objects)
/// keeps its row with an empty value.
pub fn to_flat_form(expr: Option<&Expr>) -> FlatForm {
    let mut form = FlatForm::default();
    if let Some(expr) = expr {
        flatten_into(expr, &mut form);
    }
    form
}

fn flatten_into(expr: &Expr, form: &mut FlatForm) {
    match expr {
        Expr::Logical {
            operator,
            left,
            right,
        } => {
            form.logical_operator = *operator;
            flatten_into(left, form);
            flatten_into(right, form);
        }
        Expr::Comparison {
            operator,
            left,
            right,
        } => match (left.as_ref(), right.as_ref()) {
            (Expr::Variant { selector }, Expr::Constant { value, .. }) => {
                let right_value = match value {
                    Value::Invalid(raw) => {
                        warn!(
                            selector = %selector.to_key(),
                            value = %raw,
                            "clearing a constant the editor cannot represent"
                        );
                        String::new()
                    }
                    other => other.to_string(),
                };
                form.conditions.push(FlatCondition {
                    left_selector: selector.to_key(),
                    operator: Some(*operator),
                    right_value,
                });
            }
            _ => warn!(
                operator = %operator,
                "dropping comparison whose operands are not variable and constant"
            ),
        },
        Expr::Variant { .. } | Expr::Constant { .. } => {
            warn!("dropping bare operand found outside of a comparison");
        }
    }
}

/// Rebuilds a stored condition from editable rows.
///
/// Returns `None` when there is nothing to store, which means the branch is
/// always taken. Several rows fold into a left-deep chain using the form's
/// logical operator.
pub fn from_flat_form(form: &FlatForm) -> Option<Expr> {
    match form.conditions.as_slice() {
        [] => None,
        [single] => {
            if single.is_incomplete() {
                return None;
            }
            build_comparison(single)
        }
        conditions => {
            let mut comparisons = conditions.iter().filter_map(build_comparison);
            let head = comparisons.next()?;
            Some(comparisons.fold(head, |acc, next| {
                Expr::logical(form.logical_operator, acc, next)
            }))
        }
    }
}

fn build_comparison(condition: &FlatCondition) -> Option<Expr> {
    let Some(operator) = condition.operator else {
        warn!(
            selector = %condition.left_selector,
            "skipping condition without an operator"
        );
        return None;
    };

    let selector = condition.selector();
    let value_type = selector.value_type.unwrap_or(ValueType::String);
    let value = Value::parse(&condition.right_value, value_type);

    Some(Expr::comparison(
        operator,
        Expr::variant(selector),
        Expr::constant(value, value_type),
    ))
}

/// Reads a node's stored condition into its flat form.
///
/// A missing or undecodable expression yields the empty form.
pub fn load_flat_form<S: ConfigStore + ?Sized>(store: &S, node_id: &str) -> FlatForm {
    let expr = store
        .config(node_id)
        .and_then(|config| config.get(EXPRESSION_CONFIG_KEY))
        .filter(|raw| !raw.is_null())
        .and_then(|raw| match serde_json::from_value::<Expr>(raw.clone()) {
            Ok(expr) => Some(expr),
            Err(e) => {
                warn!(node_id, error = %e, "stored expression could not be decoded");
                None
            }
        });
    to_flat_form(expr.as_ref())
}

/// Writes the condition described by `form` into a node's config.
///
/// An empty form removes the stored expression.
pub fn store_flat_form<S: ConfigStore + ?Sized>(
    store: &mut S,
    node_id: &str,
    form: &FlatForm,
) -> Result<Option<Expr>, StoreError> {
    let mut config = store.config(node_id).cloned().unwrap_or_default();

    let expr = from_flat_form(form);
    match &expr {
        Some(expr) => {
            let encoded = serde_json::to_value(expr).map_err(|e| StoreError::Encode {
                node_id: node_id.to_string(),
                message: e.to_string(),
            })?;
            config.insert(EXPRESSION_CONFIG_KEY.to_string(), encoded);
        }
        None => {
            config.remove(EXPRESSION_CONFIG_KEY);
        }
    }

    store.set_config(node_id, config)?;
    Ok(expr)
}
