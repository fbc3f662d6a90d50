//! Read-only navigation over a workflow tree, and the per-node config store.
//!
//! The rendering engine owns the live tree in the editor. The engine here only
//! needs the capabilities below, so it runs the same against the engine's
//! adapter or the in-memory [`TreeIndex`] used by tools and tests.

mod index;

pub use index::TreeIndex;

use crate::error::StoreError;
use crate::node::{Node, NodeConfig};

/// Navigation capability a workflow tree must provide.
pub trait Navigator {
    fn node(&self, id: &str) -> Option<&Node>;

    fn parent(&self, id: &str) -> Option<&Node>;

    /// The sibling that runs immediately before `id`, if any.
    fn previous_sibling(&self, id: &str) -> Option<&Node>;

    fn children(&self, id: &str) -> Vec<&Node>;

    fn last_child(&self, id: &str) -> Option<&Node> {
        self.children(id).last().copied()
    }

    /// Every node below `id`, pre-order, excluding `id` itself.
    fn descendants(&self, id: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        let mut stack: Vec<&Node> = self.children(id).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            found.push(node);
            stack.extend(self.children(&node.id).into_iter().rev());
        }
        found
    }
}

/// Get/set access to node configuration, keyed by node id.
pub trait ConfigStore {
    fn config(&self, node_id: &str) -> Option<&NodeConfig>;

    fn set_config(&mut self, node_id: &str, config: NodeConfig) -> Result<(), StoreError>;
}
