//! Tests for subtree duplication and reference rewriting.
mod common;
use certflow::node::CERTIFICATE_CONFIG_KEY;
use certflow::prelude::*;
use common::*;
use serde_json::{Value as JsonValue, json};
use std::collections::HashSet;

fn sequential(strategy: RemapStrategy) -> Duplicator {
    Duplicator::builder()
        .with_allocator(SequentialIdAllocator::new("copy-"))
        .with_strategy(strategy)
        .build()
}

fn certificate_of(node: &Node) -> &str {
    node.config_value(CERTIFICATE_CONFIG_KEY)
        .and_then(|value| value.as_str())
        .expect("deploy node has a certificate reference")
}

/// A condition whose second branch refers back to a node in the first.
///
/// ```text
/// cond
///   b1              -> inner-apply
///   b2 [inner-apply.validity == true]
///                   -> inner-deploy (deploy inner-apply)
/// ```
fn condition_with_back_reference() -> Node {
    leaf("cond", NodeType::Condition).with_blocks(vec![
        branch("b1", None, vec![leaf("inner-apply", NodeType::BizApply)]),
        branch(
            "b2",
            Some(compare(
                validity("inner-apply"),
                ComparisonOperator::Eq,
                Value::Bool(true),
            )),
            vec![deploy("inner-deploy", "inner-apply")],
        ),
    ])
}

/// A condition whose first branch refers forward to a node in the second.
fn condition_with_forward_reference() -> Node {
    leaf("cond", NodeType::Condition).with_blocks(vec![
        branch(
            "b1",
            Some(compare(
                days_left("later-apply"),
                ComparisonOperator::Gt,
                Value::Number(7.0),
            )),
            vec![leaf("b1-notify", NodeType::BizNotify)],
        ),
        branch("b2", None, vec![leaf("later-apply", NodeType::BizApply)]),
    ])
}

/// A condition whose second branch stores `expression` verbatim and refers
/// back to `inner` in the first branch.
fn condition_with_stored_expression(expression: JsonValue) -> Node {
    let mut config = NodeConfig::new();
    config.insert("expression".to_string(), expression);
    leaf("cond", NodeType::Condition).with_blocks(vec![
        branch("b1", None, vec![leaf("inner", NodeType::BizApply)]),
        leaf("b2", NodeType::BranchBlock).with_config(config),
    ])
}

fn var(id: &str, name: &str, value_type: &str) -> JsonValue {
    json!({ "type": "var", "selector": { "id": id, "name": name, "type": value_type } })
}

#[test]
fn test_every_id_is_fresh() {
    let nodes = create_branching_flow();
    let source = &nodes[2];

    let copy = duplicate(source, false);

    let original_ids: HashSet<&str> = source.subtree_ids().into_iter().collect();
    let copied_ids: Vec<&str> = copy.subtree_ids();
    assert_eq!(copied_ids.len(), original_ids.len());
    assert!(copied_ids.iter().all(|id| !original_ids.contains(id)));
    let unique: HashSet<&str> = copied_ids.iter().copied().collect();
    assert_eq!(unique.len(), copied_ids.len());
}

#[test]
fn test_identity_map_is_pre_order() {
    let source = condition_with_back_reference();

    let duplication = sequential(RemapStrategy::SinglePass).duplicate(&source);

    let pairs: Vec<(&str, &str)> = duplication.identities.iter().collect();
    assert_eq!(
        pairs,
        vec![
            ("cond", "copy-1"),
            ("b1", "copy-2"),
            ("inner-apply", "copy-3"),
            ("b2", "copy-4"),
            ("inner-deploy", "copy-5"),
        ]
    );
    assert_eq!(duplication.node.id, "copy-1");
    assert_eq!(duplication.identities.get("b2"), Some("copy-4"));
    assert!(!duplication.identities.contains("outside"));
}

#[test]
fn test_back_references_are_remapped() {
    let source = condition_with_back_reference();

    let copy = sequential(RemapStrategy::SinglePass).duplicate(&source).node;

    let b2 = copy.find("copy-4").unwrap();
    let expr = stored_expression(b2).unwrap();
    assert_eq!(
        expr,
        compare(validity("copy-3"), ComparisonOperator::Eq, Value::Bool(true))
    );

    let deploy = copy.find("copy-5").unwrap();
    assert_eq!(certificate_of(deploy), "copy-3#certificate");
}

#[test]
fn test_forward_references_are_left_in_single_pass() {
    let source = condition_with_forward_reference();

    let copy = sequential(RemapStrategy::SinglePass).duplicate(&source).node;

    let b1 = copy.find("copy-2").unwrap();
    let selectors: Vec<String> = stored_expression(b1)
        .unwrap()
        .selectors()
        .into_iter()
        .map(|selector| selector.id.clone())
        .collect();
    assert_eq!(selectors, vec!["later-apply"]);
}

#[test]
fn test_forward_references_are_remapped_in_two_pass() {
    let source = condition_with_forward_reference();

    let duplication = sequential(RemapStrategy::TwoPass).duplicate(&source);
    let later_apply = duplication.identities.get("later-apply").unwrap().to_string();

    let b1 = duplication.node.find("copy-2").unwrap();
    let selectors: Vec<String> = stored_expression(b1)
        .unwrap()
        .selectors()
        .into_iter()
        .map(|selector| selector.id.clone())
        .collect();
    assert_eq!(selectors, vec![later_apply]);
    assert_eq!(duplication.node.find("copy-5").unwrap().kind, NodeType::BizApply);
}

#[test]
fn test_references_outside_the_subtree_are_kept() {
    let nodes = create_branching_flow();
    let cond = &nodes[2];

    let copy = duplicate(cond, false);

    let branch_x = &copy.children()[0];
    let expr = stored_expression(branch_x).unwrap();
    assert_eq!(expr.selectors()[0].id, "apply-1");
    assert_eq!(certificate_of(&branch_x.children()[0]), "apply-1#certificate");
}

#[test]
fn test_unparseable_reference_is_untouched() {
    let mut node = deploy("d", "ignored");
    node.data
        .config
        .as_mut()
        .unwrap()
        .insert(CERTIFICATE_CONFIG_KEY.to_string(), serde_json::json!("no-separator"));

    let copy = duplicate(&node, false);
    assert_eq!(certificate_of(&copy), "no-separator");
    assert_eq!(copy.config_value("provider"), node.config_value("provider"));
}

#[test]
fn test_copy_suffix_only_on_the_root() {
    let source = condition_with_back_reference();

    let copy = duplicate(&source, true);
    assert_eq!(copy.name(), "cond node-copy");
    assert_eq!(copy.children()[0].name(), "b1 node");
    assert_eq!(copy.children()[0].children()[0].name(), "inner-apply node");

    let plain = duplicate(&source, false);
    assert_eq!(plain.name(), "cond node");
}

#[test]
fn test_source_is_not_mutated() {
    let source = condition_with_back_reference();
    let snapshot = source.clone();

    let _ = sequential(RemapStrategy::SinglePass).duplicate(&source);
    let _ = sequential(RemapStrategy::TwoPass).duplicate(&source);

    assert_eq!(source, snapshot);
}

#[test]
fn test_structure_and_data_are_preserved() {
    let mut source = condition_with_back_reference();
    source.data.disabled = Some(true);
    source
        .data
        .extra
        .insert("note".to_string(), serde_json::json!("keep me"));

    let copy = duplicate(&source, false);
    assert_eq!(copy.kind, NodeType::Condition);
    assert!(copy.is_disabled());
    assert_eq!(copy.data.extra.get("note"), Some(&serde_json::json!("keep me")));
    let kinds: Vec<NodeType> = copy.children().iter().map(|child| child.kind).collect();
    assert_eq!(kinds, vec![NodeType::BranchBlock, NodeType::BranchBlock]);
}

#[test]
fn test_random_ids_are_alphanumeric() {
    let mut allocator = RandomIdAllocator::default();
    let first = allocator.allocate();
    let second = allocator.allocate();
    assert_eq!(first.len(), 21);
    assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(first, second);
}

#[test]
fn test_selectors_are_remapped_around_undecodable_constants() {
    let stored = |id: &str| {
        json!({
            "type": "logical",
            "operator": "and",
            "left": {
                "type": "comparison",
                "operator": "eq",
                "left": var(id, "certificate.validity", "boolean"),
                "right": { "type": "const", "value": true, "valueType": "boolean" }
            },
            "right": {
                "type": "comparison",
                "operator": "gt",
                "left": var(id, "certificate.daysLeft", "number"),
                "right": { "type": "const", "value": null, "valueType": "number" }
            }
        })
    };
    let source = condition_with_stored_expression(stored("inner"));

    let copy = sequential(RemapStrategy::SinglePass).duplicate(&source).node;

    let b2 = copy.find("copy-4").unwrap();
    assert_eq!(b2.config_value("expression"), Some(&stored("copy-3")));
}

#[test]
fn test_stored_expression_is_otherwise_untouched() {
    let stored = |id: &str| {
        json!({
            "type": "comparison",
            "operator": "gte",
            "label": "renewal window",
            "left": var(id, "certificate.daysLeft", "number"),
            "right": { "type": "const", "value": 7, "valueType": "number" }
        })
    };
    let source = condition_with_stored_expression(stored("inner"));

    let copy = sequential(RemapStrategy::SinglePass).duplicate(&source).node;

    let expression = copy.find("copy-4").unwrap().config_value("expression").unwrap();
    assert_eq!(expression, &stored("copy-3"));
    assert!(expression["right"]["value"].is_u64());
    assert_eq!(expression["label"], "renewal window");
}

#[test]
fn test_unknown_operator_does_not_block_remapping() {
    let stored = |id: &str| {
        json!({
            "type": "comparison",
            "operator": "contains",
            "left": var(id, "certificate.daysLeft", "duration"),
            "right": { "type": "const", "value": "7d", "valueType": "string" }
        })
    };
    let source = condition_with_stored_expression(stored("inner"));

    let copy = sequential(RemapStrategy::SinglePass).duplicate(&source).node;

    let expression = copy.find("copy-4").unwrap().config_value("expression");
    assert_eq!(expression, Some(&stored("copy-3")));
}
