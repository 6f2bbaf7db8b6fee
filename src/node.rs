//! Tree node records and arena slot indices.
//!
//! Nodes are supplied to [`crate::Tree::new`](crate::Tree::new) as a flat
//! snapshot; the tree links them into a hierarchy at construction time.
//! Children are stored as arena slot indices rather than references, so no
//! ownership cycle exists between parent and child.

use serde::{Deserialize, Serialize};

/// Node identifier type.
///
/// Identifiers are assumed unique within a snapshot; `0` never identifies a
/// real node and is reserved as the root parent sentinel.
pub type NodeId = u64;

/// Parent sentinel for root nodes.
///
/// A `parent_id` that does not resolve to any node in the index is also
/// treated as a root, regardless of its literal value.
pub const ROOT_PARENT: NodeId = 0;

/// A compact 32-bit index into the tree arena.
///
/// Internal detail of the tree's storage: using u32 limits a tree to
/// ~4 billion nodes, which is sufficient for an in-memory index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct NodeSlot(u32);

impl NodeSlot {
    /// Creates a new NodeSlot from a usize.
    ///
    /// # Panics
    /// Panics if `index` does not fit in u32.
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        assert!(
            index <= u32::MAX as usize,
            "node slot must fit in u32"
        );
        Self(index as u32)
    }

    /// Returns the slot as a usize.
    #[inline]
    pub(crate) fn get(&self) -> usize {
        self.0 as usize
    }
}

/// A single tree node as supplied in the construction snapshot.
///
/// Plain record with no behavior: an identifier, a parent identifier, a
/// display name, an ordering hint, and an arbitrary payload. The `children`
/// links are populated by the tree during construction and are empty in a
/// freshly created node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode<T> {
    /// Unique node identifier.
    pub id: NodeId,
    /// Identifier of the parent node, or [`ROOT_PARENT`] for roots.
    pub parent_id: NodeId,
    /// Display name.
    pub name: String,
    /// Ordering hint; siblings are sorted ascending by this value.
    pub order: i64,
    /// Caller-defined payload.
    pub payload: T,
    /// Arena slots of direct children, filled in at construction.
    #[serde(skip)]
    pub(crate) children: Vec<NodeSlot>,
}

impl<T> TreeNode<T> {
    /// Creates a snapshot node with no children links.
    pub fn new(
        id: NodeId,
        parent_id: NodeId,
        name: impl Into<String>,
        order: i64,
        payload: T,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            order,
            payload,
            children: Vec::new(),
        }
    }
}
