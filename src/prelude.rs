//! Prelude module for convenient imports
//!
//! Re-exports the types and functions most callers need, so a single
//! `use certflow::prelude::*;` covers navigation, duplication, the condition
//! codec and export.

// Node model
pub use crate::node::{
    CertificateRef, Node, NodeConfig, NodeData, NodeType, Selector, ValueType,
};

// Documents and navigation
pub use crate::document::FlowDocument;
pub use crate::graph::{ConfigStore, Navigator, TreeIndex};

// Engine operations
pub use crate::duplicate::{
    Duplication, Duplicator, IdAllocator, IdentityMap, RandomIdAllocator, RemapStrategy,
    SequentialIdAllocator, duplicate,
};
pub use crate::expr::{
    ComparisonOperator, Expr, FlatCondition, FlatForm, LogicalOperator, Value, from_flat_form,
    load_flat_form, reconcile_operator, store_flat_form, to_flat_form,
};
pub use crate::resolver::{
    VariableOption, certificate_sources, invisible_references, selectable_variables,
    visible_prior_nodes,
};

// Export view
pub use crate::export::{ExportFormat, export, to_json, to_yaml};

// Error types
pub use crate::error::{DocumentError, ExportError, GraphError, SelectorError, StoreError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
