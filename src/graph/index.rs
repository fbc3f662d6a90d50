use super::Navigator;
use crate::error::GraphError;
use crate::node::Node;
use ahash::AHashMap;
use tracing::debug;

struct Entry<'a> {
    node: &'a Node,
    parent: Option<&'a Node>,
    previous: Option<&'a Node>,
}

/// An id-keyed index over a borrowed node tree.
///
/// Top-level nodes have no parent. Ids must be unique across the whole tree.
pub struct TreeIndex<'a> {
    roots: &'a [Node],
    entries: AHashMap<&'a str, Entry<'a>>,
}

impl<'a> TreeIndex<'a> {
    pub fn new(roots: &'a [Node]) -> Result<Self, GraphError> {
        let mut entries = AHashMap::new();
        Self::index_level(&mut entries, roots, None)?;
        debug!(nodes = entries.len(), "indexed workflow tree");
        Ok(Self { roots, entries })
    }

    fn index_level(
        entries: &mut AHashMap<&'a str, Entry<'a>>,
        nodes: &'a [Node],
        parent: Option<&'a Node>,
    ) -> Result<(), GraphError> {
        let mut previous = None;
        for node in nodes {
            let entry = Entry {
                node,
                parent,
                previous,
            };
            if entries.insert(node.id.as_str(), entry).is_some() {
                return Err(GraphError::DuplicateNodeId(node.id.clone()));
            }
            Self::index_level(entries, node.children(), Some(node))?;
            previous = Some(node);
        }
        Ok(())
    }

    pub fn roots(&self) -> &'a [Node] {
        self.roots
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Looks up a node, failing with [`GraphError::NodeNotFound`].
    pub fn require(&self, id: &str) -> Result<&'a Node, GraphError> {
        self.entries
            .get(id)
            .map(|entry| entry.node)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }
}

impl Navigator for TreeIndex<'_> {
    fn node(&self, id: &str) -> Option<&Node> {
        self.entries.get(id).map(|entry| entry.node)
    }

    fn parent(&self, id: &str) -> Option<&Node> {
        self.entries.get(id).and_then(|entry| entry.parent)
    }

    fn previous_sibling(&self, id: &str) -> Option<&Node> {
        self.entries.get(id).and_then(|entry| entry.previous)
    }

    fn children(&self, id: &str) -> Vec<&Node> {
        self.entries
            .get(id)
            .map(|entry| entry.node.children().iter().collect())
            .unwrap_or_default()
    }
}
