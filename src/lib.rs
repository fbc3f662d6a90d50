//! # certflow - Workflow Tree Engine
//!
//! **certflow** is the graph-structural engine behind a certificate automation
//! workflow editor. Users build tree-shaped flows out of nodes (apply, upload,
//! monitor, deploy, notify, delay, condition branches, try/catch). This crate
//! works on that tree without any rendering attached:
//!
//! - [`duplicate`] deep-clones a subtree, assigns fresh ids and rewrites the
//!   cross-node references inside the copy.
//! - [`resolver`] computes which prior nodes a node may reference, nearest first.
//! - [`expr`] holds the typed branch-condition AST and its conversion to and
//!   from the flat form edited in the UI.
//! - [`export`] renders a graph to JSON or YAML with a stable key order.
//!
//! Every operation is synchronous and pure: inputs are borrowed, results are
//! newly allocated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certflow::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let document = FlowDocument::from_file("workflow.json")?;
//!     let index = document.index()?;
//!
//!     // What can the branch condition on "branch-1" compare against?
//!     for option in selectable_variables(&index, "branch-1")? {
//!         println!("{} ({})", option.label, option.key());
//!     }
//!
//!     // Edit its condition through the flat form.
//!     let mut form = load_flat_form(&document, "branch-1");
//!     form.logical_operator = LogicalOperator::Or;
//!     let expr = from_flat_form(&form);
//!     println!("{:?}", expr.map(|e| e.to_string()));
//!
//!     // Duplicate a subtree with deterministic ids.
//!     let source = document.find("apply-1").ok_or("missing node")?;
//!     let copy = Duplicator::builder()
//!         .with_copy_suffix(true)
//!         .with_allocator(SequentialIdAllocator::new("copy-"))
//!         .build()
//!         .duplicate(source);
//!     println!("{}", to_json(std::slice::from_ref(&copy.node))?);
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod duplicate;
pub mod error;
pub mod export;
pub mod expr;
pub mod graph;
pub mod node;
pub mod prelude;
pub mod resolver;
