//! Common test utilities for building workflow trees and conditions.
use certflow::node::{CERTIFICATE_CONFIG_KEY, EXPRESSION_CONFIG_KEY};
use certflow::prelude::*;
use serde_json::json;

#[allow(dead_code)]
pub fn leaf(id: &str, kind: NodeType) -> Node {
    Node::new(id, kind, format!("{} node", id))
}

/// A deploy node whose certificate reference points at `source`.
#[allow(dead_code)]
pub fn deploy(id: &str, source: &str) -> Node {
    let mut config = NodeConfig::new();
    config.insert(
        CERTIFICATE_CONFIG_KEY.to_string(),
        json!(format!("{}#certificate", source)),
    );
    config.insert("provider".to_string(), json!("ssh"));
    leaf(id, NodeType::BizDeploy).with_config(config)
}

/// A branch block with an optional stored condition.
#[allow(dead_code)]
pub fn branch(id: &str, expr: Option<Expr>, blocks: Vec<Node>) -> Node {
    let node = leaf(id, NodeType::BranchBlock).with_blocks(blocks);
    match expr {
        Some(expr) => {
            let mut config = NodeConfig::new();
            config.insert(
                EXPRESSION_CONFIG_KEY.to_string(),
                serde_json::to_value(&expr).expect("expression serializes"),
            );
            node.with_config(config)
        }
        None => node,
    }
}

#[allow(dead_code)]
pub fn days_left(node_id: &str) -> Selector {
    Selector::new(node_id, "certificate.daysLeft", ValueType::Number)
}

#[allow(dead_code)]
pub fn validity(node_id: &str) -> Selector {
    Selector::new(node_id, "certificate.validity", ValueType::Boolean)
}

/// `$selector <op> value` with the constant typed after the selector.
#[allow(dead_code)]
pub fn compare(selector: Selector, operator: ComparisonOperator, value: Value) -> Expr {
    let value_type = selector.value_type.unwrap_or(ValueType::String);
    Expr::comparison(
        operator,
        Expr::variant(selector),
        Expr::constant(value, value_type),
    )
}

/// Reads the stored expression of a node back into the typed AST.
#[allow(dead_code)]
pub fn stored_expression(node: &Node) -> Option<Expr> {
    node.raw_expression()
        .map(|raw| serde_json::from_value(raw.clone()).expect("stored expression decodes"))
}

/// Logic: start -> a (apply) -> b (deploy a) -> c (notify) -> end
#[allow(dead_code)]
pub fn create_linear_flow() -> Vec<Node> {
    vec![
        leaf("start", NodeType::Start),
        leaf("a", NodeType::BizApply),
        deploy("b", "a"),
        leaf("c", NodeType::BizNotify),
        leaf("end", NodeType::End),
    ]
}

/// Creates a flow with one condition and two branches.
///
/// ```text
/// start
/// apply-1
/// cond-1
///   branch-x  [apply-1.daysLeft <= 30]
///     x-deploy (deploy apply-1)
///     x-notify
///   branch-y
///     y-upload
///     y-delay
/// notify-1
/// end
/// ```
#[allow(dead_code)]
pub fn create_branching_flow() -> Vec<Node> {
    vec![
        leaf("start", NodeType::Start),
        leaf("apply-1", NodeType::BizApply),
        leaf("cond-1", NodeType::Condition).with_blocks(vec![
            branch(
                "branch-x",
                Some(compare(
                    days_left("apply-1"),
                    ComparisonOperator::Lte,
                    Value::Number(30.0),
                )),
                vec![
                    deploy("x-deploy", "apply-1"),
                    leaf("x-notify", NodeType::BizNotify),
                ],
            ),
            branch(
                "branch-y",
                None,
                vec![
                    leaf("y-upload", NodeType::BizUpload),
                    leaf("y-delay", NodeType::Delay),
                ],
            ),
        ]),
        leaf("notify-1", NodeType::BizNotify),
        leaf("end", NodeType::End),
    ]
}

/// Creates a flow with a try/catch block.
///
/// ```text
/// start
/// apply
/// tc
///   try       -> try-apply
///   catch     -> catch-notify
/// after
/// ```
#[allow(dead_code)]
pub fn create_try_catch_flow() -> Vec<Node> {
    vec![
        leaf("start", NodeType::Start),
        leaf("apply", NodeType::BizApply),
        leaf("tc", NodeType::TryCatch).with_blocks(vec![
            leaf("try", NodeType::TryBlock).with_blocks(vec![leaf("try-apply", NodeType::BizApply)]),
            leaf("catch", NodeType::CatchBlock)
                .with_blocks(vec![leaf("catch-notify", NodeType::BizNotify)]),
        ]),
        leaf("after", NodeType::BizNotify),
    ]
}

/// Creates a flow shaped like the rendering engine's tree, with marker nodes
/// between the condition and its branches.
#[allow(dead_code)]
pub fn create_marker_flow() -> Vec<Node> {
    vec![
        leaf("start", NodeType::Start),
        leaf("a", NodeType::BizApply),
        leaf("cond", NodeType::Condition).with_blocks(vec![
            leaf("icon", NodeType::BlockIcon),
            leaf("inline", NodeType::InlineBlocks).with_blocks(vec![
                branch("bx", None, vec![leaf("bx-1", NodeType::BizMonitor)]),
                branch("by", None, vec![leaf("by-1", NodeType::Delay)]),
            ]),
        ]),
        leaf("after", NodeType::BizNotify),
    ]
}

#[allow(dead_code)]
pub fn ids<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<&'a str> {
    nodes.into_iter().map(|node| node.id.as_str()).collect()
}
