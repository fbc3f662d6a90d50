use super::{Expr, LogicalOperator, Value};
use std::fmt;

/// Formats expressions as infix text, adding parentheses only when necessary.
pub struct ExprFormatter;

impl ExprFormatter {
    pub fn format(expr: &Expr) -> String {
        // Start with the lowest possible parent precedence.
        Self::format_recursive(expr, 0)
    }

    fn precedence(expr: &Expr) -> u8 {
        match expr {
            Expr::Logical { operator, .. } => match operator {
                LogicalOperator::Or => 1,
                LogicalOperator::And => 2,
            },
            Expr::Comparison { .. } => 3,
            Expr::Variant { .. } | Expr::Constant { .. } => 4,
        }
    }

    fn format_recursive(expr: &Expr, parent_precedence: u8) -> String {
        let current_precedence = Self::precedence(expr);
        let body = match expr {
            Expr::Logical {
                operator,
                left,
                right,
            } => format!(
                "{} {} {}",
                Self::format_recursive(left, current_precedence),
                operator.symbol(),
                // Left-deep chains read without parentheses; a nested right side keeps them.
                Self::format_recursive(right, current_precedence + 1)
            ),
            Expr::Comparison {
                operator,
                left,
                right,
            } => format!(
                "{} {} {}",
                Self::format_recursive(left, current_precedence),
                operator.symbol(),
                Self::format_recursive(right, current_precedence)
            ),
            Expr::Variant { selector } => {
                if selector.is_complete() {
                    format!("${}.{}", selector.id, selector.name)
                } else {
                    "$<unset>".to_string()
                }
            }
            Expr::Constant { value, .. } => Self::format_value(value),
        };

        if current_precedence < parent_precedence {
            format!("({})", body)
        } else {
            body
        }
    }

    fn format_value(value: &Value) -> String {
        match value {
            Value::String(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ExprFormatter::format(self))
    }
}
