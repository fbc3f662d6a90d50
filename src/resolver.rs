//! Ancestor visibility: which prior nodes' outputs a node may reference.
//!
//! The walk steps backwards through execution order (previous sibling, else
//! parent). When it passes a branch construct it pulls in every branch of that
//! construct, including branches that cannot have run before the node. Editors
//! rely on this wider list today, so it is kept as is.

use crate::error::GraphError;
use crate::expr::Expr;
use crate::graph::Navigator;
use crate::node::{CertificateRef, Node, NodeType, Selector};
use ahash::AHashSet;
use tracing::{debug, warn};

/// One entry of a "pick a variable" menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableOption {
    pub selector: Selector,
    pub node_name: String,
    pub label: String,
}

impl VariableOption {
    /// The flat selector key stored in the editor form.
    pub fn key(&self) -> String {
        self.selector.to_key()
    }
}

/// Returns the nodes visible from `node_id`, nearest first.
///
/// The node itself, the `start` node and structural markers are never part of
/// the result.
pub fn visible_prior_nodes<'n, N: Navigator + ?Sized>(
    nav: &'n N,
    node_id: &str,
) -> Result<Vec<&'n Node>, GraphError> {
    let origin = nav
        .node(node_id)
        .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;

    let mut visited: AHashSet<&'n str> = AHashSet::new();
    let mut found: Vec<&'n Node> = Vec::new();

    let mut current = step_back(nav, origin);
    while let Some(node) = current {
        if node.kind == NodeType::Start {
            break;
        }
        record(node, &mut visited, &mut found);

        // TODO: restrict to the branch that actually contains `origin` once
        // editors stop depending on sibling-branch outputs.
        if node.kind.is_branch_construct() {
            for branch in nav.children(&node.id) {
                for descendant in nav.descendants(&branch.id) {
                    record(descendant, &mut visited, &mut found);
                }
            }
        }

        current = step_back(nav, node);
    }

    found.retain(|node| node.id != origin.id && !node.kind.is_marker());
    debug!(node_id, visible = found.len(), "resolved prior nodes");
    Ok(found)
}

fn step_back<'n, N: Navigator + ?Sized>(nav: &'n N, node: &Node) -> Option<&'n Node> {
    nav.previous_sibling(&node.id).or_else(|| nav.parent(&node.id))
}

fn record<'n>(node: &'n Node, visited: &mut AHashSet<&'n str>, found: &mut Vec<&'n Node>) {
    if visited.insert(node.id.as_str()) {
        found.push(node);
    }
}

/// Variables a branch condition at `node_id` may compare against.
pub fn selectable_variables<N: Navigator + ?Sized>(
    nav: &N,
    node_id: &str,
) -> Result<Vec<VariableOption>, GraphError> {
    let options = visible_prior_nodes(nav, node_id)?
        .into_iter()
        .flat_map(|node| {
            node.kind.variables().iter().map(move |variable| VariableOption {
                selector: Selector::new(node.id.clone(), variable.name, variable.value_type),
                node_name: node.name().to_string(),
                label: format!("{} - {}", node.name(), variable.name),
            })
        })
        .collect();
    Ok(options)
}

/// Upstream certificate outputs a deploy node at `node_id` may consume.
pub fn certificate_sources<N: Navigator + ?Sized>(
    nav: &N,
    node_id: &str,
) -> Result<Vec<CertificateRef>, GraphError> {
    let sources = visible_prior_nodes(nav, node_id)?
        .into_iter()
        .filter(|node| node.kind.provides_certificate())
        .map(|node| CertificateRef::new(node.id.clone()))
        .collect();
    Ok(sources)
}

/// Ids referenced by `node_id`'s config that are not visible from it.
///
/// An empty result means every reference satisfies ancestor visibility.
pub fn invisible_references<N: Navigator + ?Sized>(
    nav: &N,
    node_id: &str,
) -> Result<Vec<String>, GraphError> {
    let node = nav
        .node(node_id)
        .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;

    let mut referenced: Vec<String> = Vec::new();
    if let Some(reference) = node.certificate_ref() {
        referenced.push(reference.node_id);
    }
    if let Some(raw) = node.raw_expression() {
        match serde_json::from_value::<Expr>(raw.clone()) {
            Ok(expr) => referenced.extend(
                expr.selectors()
                    .into_iter()
                    .filter(|selector| !selector.id.is_empty())
                    .map(|selector| selector.id.clone()),
            ),
            Err(e) => warn!(node_id, error = %e, "stored expression could not be decoded"),
        }
    }

    let visible: AHashSet<&str> = visible_prior_nodes(nav, node_id)?
        .into_iter()
        .map(|node| node.id.as_str())
        .collect();

    let mut seen = AHashSet::new();
    referenced.retain(|id| !visible.contains(id.as_str()) && seen.insert(id.clone()));
    Ok(referenced)
}
