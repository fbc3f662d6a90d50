//! Deep-cloning of workflow subtrees.
//!
//! Every node of the copy gets a fresh id. Cross-references inside the copied
//! configs (deploy certificate references, branch condition selectors) are
//! rewritten through the [`IdentityMap`] built while cloning, so the copy stays
//! internally consistent. References to nodes outside the subtree keep
//! pointing at the originals.

use crate::node::{
    CERTIFICATE_CONFIG_KEY, CertificateRef, EXPRESSION_CONFIG_KEY, Node, NodeConfig, NodeType,
};
use ahash::AHashMap;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::Value as JsonValue;
use tracing::debug;

/// Appended to the top-level name when a copy suffix is requested.
pub const COPY_SUFFIX: &str = "-copy";

const DEFAULT_ID_LENGTH: usize = 21;

/// Source of fresh node ids.
pub trait IdAllocator {
    fn allocate(&mut self) -> String;
}

/// Random alphanumeric ids, the editor's default.
#[derive(Debug, Clone)]
pub struct RandomIdAllocator {
    length: usize,
}

impl RandomIdAllocator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomIdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

impl IdAllocator for RandomIdAllocator {
    fn allocate(&mut self) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}

/// Deterministic `<prefix><n>` ids.
#[derive(Debug, Clone)]
pub struct SequentialIdAllocator {
    prefix: String,
    next: u64,
}

impl SequentialIdAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdAllocator for SequentialIdAllocator {
    fn allocate(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// When the identity map is consulted relative to id assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemapStrategy {
    /// Ids are assigned pre-order and each node's references are rewritten
    /// once its own subtree is done. References to later siblings are not
    /// remapped yet and keep pointing at the originals.
    #[default]
    SinglePass,
    /// Every id is assigned before any reference is rewritten, so forward
    /// references inside the subtree are remapped too.
    TwoPass,
}

/// The old-id to new-id table produced by a duplication, in allocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityMap {
    pairs: Vec<(String, String)>,
    index: AHashMap<String, usize>,
}

impl IdentityMap {
    pub fn insert(&mut self, old_id: String, new_id: String) {
        match self.index.get(&old_id) {
            Some(&position) => self.pairs[position].1 = new_id,
            None => {
                self.index.insert(old_id.clone(), self.pairs.len());
                self.pairs.push((old_id, new_id));
            }
        }
    }

    pub fn get(&self, old_id: &str) -> Option<&str> {
        self.index
            .get(old_id)
            .map(|&position| self.pairs[position].1.as_str())
    }

    pub fn contains(&self, old_id: &str) -> bool {
        self.index.contains_key(old_id)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(old_id, new_id)| (old_id.as_str(), new_id.as_str()))
    }
}

/// The result of duplicating a subtree.
#[derive(Debug, Clone)]
pub struct Duplication {
    pub node: Node,
    pub identities: IdentityMap,
}

pub struct Duplicator {
    allocator: Box<dyn IdAllocator>,
    strategy: RemapStrategy,
    copy_suffix: bool,
}

pub struct DuplicatorBuilder {
    allocator: Box<dyn IdAllocator>,
    strategy: RemapStrategy,
    copy_suffix: bool,
}

impl Default for DuplicatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DuplicatorBuilder {
    pub fn new() -> Self {
        Self {
            allocator: Box::new(RandomIdAllocator::default()),
            strategy: RemapStrategy::default(),
            copy_suffix: false,
        }
    }

    /// Appends [`COPY_SUFFIX`] to the name of the duplicated root only.
    pub fn with_copy_suffix(mut self, copy_suffix: bool) -> Self {
        self.copy_suffix = copy_suffix;
        self
    }

    pub fn with_strategy(mut self, strategy: RemapStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_allocator(mut self, allocator: impl IdAllocator + 'static) -> Self {
        self.allocator = Box::new(allocator);
        self
    }

    pub fn build(self) -> Duplicator {
        Duplicator {
            allocator: self.allocator,
            strategy: self.strategy,
            copy_suffix: self.copy_suffix,
        }
    }
}

impl Duplicator {
    pub fn builder() -> DuplicatorBuilder {
        DuplicatorBuilder::new()
    }

    /// Clones `node` and its subtree. The input is left untouched.
    pub fn duplicate(&mut self, node: &Node) -> Duplication {
        let mut identities = IdentityMap::default();
        if self.strategy == RemapStrategy::TwoPass {
            self.reserve_ids(node, &mut identities);
        }
        let copy = self.clone_subtree(node, self.copy_suffix, &mut identities);
        debug!(
            source = %node.id,
            copy = %copy.id,
            nodes = identities.len(),
            "duplicated subtree"
        );
        Duplication {
            node: copy,
            identities,
        }
    }

    fn assign_id(&mut self, old_id: &str, identities: &mut IdentityMap) -> String {
        let new_id = self.allocator.allocate();
        identities.insert(old_id.to_string(), new_id.clone());
        new_id
    }

    fn reserve_ids(&mut self, node: &Node, identities: &mut IdentityMap) {
        self.assign_id(&node.id, identities);
        for child in node.children() {
            self.reserve_ids(child, identities);
        }
    }

    fn clone_subtree(
        &mut self,
        node: &Node,
        with_suffix: bool,
        identities: &mut IdentityMap,
    ) -> Node {
        let reserved = match self.strategy {
            RemapStrategy::TwoPass => identities.get(&node.id).map(str::to_string),
            RemapStrategy::SinglePass => None,
        };
        let id = match reserved {
            Some(id) => id,
            None => self.assign_id(&node.id, identities),
        };

        let mut data = node.data.clone();
        if with_suffix {
            data.name.push_str(COPY_SUFFIX);
        }

        let blocks = node.blocks.as_ref().map(|blocks| {
            blocks
                .iter()
                .map(|child| self.clone_subtree(child, false, identities))
                .collect()
        });

        if let Some(config) = data.config.as_mut() {
            rewrite_references(node.kind, config, identities);
        }

        Node {
            id,
            kind: node.kind,
            data,
            blocks,
        }
    }
}

/// Duplicates `node` with random ids and the single-pass remap.
pub fn duplicate(node: &Node, with_copy_suffix: bool) -> Node {
    Duplicator::builder()
        .with_copy_suffix(with_copy_suffix)
        .build()
        .duplicate(node)
        .node
}

/// Rewrites the cross-references a node type is known to carry.
fn rewrite_references(kind: NodeType, config: &mut NodeConfig, identities: &IdentityMap) {
    if kind.carries_certificate_reference() {
        if let Some(JsonValue::String(raw)) = config.get_mut(CERTIFICATE_CONFIG_KEY) {
            rewrite_certificate_ref(raw, identities);
        }
    }
    if kind.carries_expression() {
        if let Some(raw) = config.get_mut(EXPRESSION_CONFIG_KEY) {
            rewrite_expression(raw, identities);
        }
    }
}

fn rewrite_certificate_ref(raw: &mut String, identities: &IdentityMap) {
    match raw.parse::<CertificateRef>() {
        Ok(reference) => {
            if let Some(mapped) = identities.get(&reference.node_id) {
                *raw = reference.retarget(mapped).to_string();
            }
        }
        Err(e) => debug!(error = %e, "leaving certificate reference untouched"),
    }
}

/// Rewrites selector ids in a stored condition without decoding it.
///
/// Only `selector.id` of `var` operands is touched, so constants, unknown
/// fields and parts the typed AST would reject are kept as stored.
fn rewrite_expression(raw: &mut JsonValue, identities: &IdentityMap) {
    let mut stack = vec![raw];
    while let Some(value) = stack.pop() {
        let JsonValue::Object(object) = value else {
            continue;
        };

        if object.get("type").and_then(JsonValue::as_str) == Some("var") {
            let id = object
                .get_mut("selector")
                .and_then(|selector| selector.get_mut("id"));
            if let Some(JsonValue::String(id)) = id {
                if let Some(mapped) = identities.get(id.as_str()) {
                    *id = mapped.to_string();
                }
            }
            continue;
        }

        stack.extend(
            object
                .iter_mut()
                .filter(|(key, _)| key.as_str() == "left" || key.as_str() == "right")
                .map(|(_, operand)| operand),
        );
    }
}
