//! In-memory hierarchical index with concurrent subtree search.
//!
//! This crate builds a navigable tree from a flat snapshot of nodes and
//! answers structural queries over it:
//! - Arena-backed node storage with identifier lookup
//! - Root listing, level computation, and direct-parent checks
//! - Deterministic breadth-first subtree enumeration
//! - Cancellable parallel subtree membership search
//!
//! The tree is built once and immutable thereafter; all queries are safe to
//! issue from any number of threads concurrently.

pub mod cancel;
pub mod error;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use cancel::CancellationToken;
pub use error::{Result, TreeError};
pub use node::{NodeId, TreeNode, ROOT_PARENT};
pub use tree::Tree;
