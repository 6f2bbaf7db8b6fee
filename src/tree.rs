//! In-memory hierarchical index built once from a flat node snapshot.
//!
//! `Tree` owns all node storage in a dense arena and resolves identifiers
//! through an `FnvHashMap` lookup table. Parent/child links are established
//! in a single construction pass; after that the structure is immutable and
//! every query runs under a shared read lock.
//!
//! ## Preconditions
//!
//! The parent graph must be acyclic. [`Tree::level`] and
//! [`Tree::subtree_ids`] do not guard against cycles and will not terminate
//! on cyclic input; [`Tree::validate`] lets callers surface a cycle as a
//! diagnosable error instead of a hang.

use std::collections::VecDeque;
use std::time::Instant;

use fnv::FnvHashMap;
use parking_lot::RwLock;

use crate::error::{Result, TreeError};
use crate::node::{NodeId, NodeSlot, TreeNode};

/// Index storage: dense node arena plus identifier lookup.
///
/// The arena keeps every snapshot node, including nodes shadowed by a later
/// duplicate identifier; the lookup table points at the canonical (last
/// written) slot for each identifier.
#[derive(Debug)]
pub(crate) struct TreeData<T> {
    pub(crate) arena: Vec<TreeNode<T>>,
    pub(crate) index: FnvHashMap<NodeId, NodeSlot>,
}

impl<T> TreeData<T> {
    /// Returns the node stored at `slot`.
    #[inline]
    pub(crate) fn node(&self, slot: NodeSlot) -> &TreeNode<T> {
        &self.arena[slot.get()]
    }

    /// Resolves an identifier to its canonical arena slot.
    #[inline]
    pub(crate) fn resolve(&self, id: NodeId) -> Option<NodeSlot> {
        self.index.get(&id).copied()
    }

    /// True if `slot` is the canonical slot for its node's identifier.
    ///
    /// False only for nodes shadowed by a duplicate identifier written later.
    #[inline]
    fn is_canonical(&self, slot: NodeSlot) -> bool {
        self.resolve(self.node(slot).id) == Some(slot)
    }
}

/// A navigable tree built once from a flat node snapshot.
///
/// The read-write lock exists to gate queries against future mutation paths;
/// no current API mutates the structure after construction, so concurrent
/// readers never contend.
#[derive(Debug)]
pub struct Tree<T> {
    pub(crate) data: RwLock<TreeData<T>>,
}

impl<T> Tree<T> {
    /// Builds a tree from a snapshot of nodes.
    ///
    /// Nodes are stable-sorted ascending by `order` before indexing, which
    /// fixes the iteration order of sibling lists but does not affect
    /// correctness. Duplicate identifiers are resolved silently: the node
    /// encountered last wins the index entry. An empty snapshot yields an
    /// empty tree, never an error.
    pub fn new(mut nodes: Vec<TreeNode<T>>) -> Self {
        let started = Instant::now();

        // Stable sort keeps input order among equal keys.
        nodes.sort_by_key(|node| node.order);

        let mut index =
            FnvHashMap::with_capacity_and_hasher(nodes.len(), Default::default());
        for (slot, node) in nodes.iter().enumerate() {
            // Last write wins on duplicate identifiers.
            index.insert(node.id, NodeSlot::new(slot));
        }

        let mut data = TreeData {
            arena: nodes,
            index,
        };

        // Second pass: append every canonical node to its resolved parent's
        // children. Slots shadowed by a later duplicate identifier are never
        // linked, so enumeration only ever sees the surviving node. A node
        // whose parent does not resolve is a root and gets no link.
        for slot in 0..data.arena.len() {
            let slot = NodeSlot::new(slot);
            if !data.is_canonical(slot) {
                continue;
            }
            let parent_id = data.node(slot).parent_id;
            if let Some(parent) = data.resolve(parent_id) {
                data.arena[parent.get()].children.push(slot);
            }
        }

        log::debug!(
            "tree index built nodes={} elapsed_us={}",
            data.arena.len(),
            started.elapsed().as_micros(),
        );

        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns the identifiers of all root nodes.
    ///
    /// A root is any node whose `parent_id` does not resolve in the index;
    /// this covers the [`ROOT_PARENT`](crate::ROOT_PARENT) sentinel and
    /// dangling parent references alike.
    /// Order follows the sorted snapshot order. O(n) scan under a read lock.
    pub fn root_nodes(&self) -> Vec<NodeId> {
        let data = self.data.read();
        data.arena
            .iter()
            .enumerate()
            .filter(|(slot, node)| {
                data.is_canonical(NodeSlot::new(*slot))
                    && data.resolve(node.parent_id).is_none()
            })
            .map(|(_, node)| node.id)
            .collect()
    }

    /// Returns the number of root nodes.
    pub fn root_count(&self) -> usize {
        self.root_nodes().len()
    }

    /// Returns the level of a node: hops from the node up to its root.
    ///
    /// Roots are level `0`; an unknown identifier yields `-1`. Cost is
    /// O(depth). Does not terminate on a cyclic parent chain.
    pub fn level(&self, id: NodeId) -> i32 {
        let data = self.data.read();
        let Some(mut current) = data.resolve(id) else {
            return -1;
        };
        let mut level = 0;
        while let Some(parent) = data.resolve(data.node(current).parent_id) {
            current = parent;
            level += 1;
        }
        level
    }

    /// True iff `parent_id` is the direct parent of `id`.
    ///
    /// Checks the stored `parent_id` only, not ancestry; false for unknown
    /// identifiers. O(1).
    pub fn is_parent(&self, id: NodeId, parent_id: NodeId) -> bool {
        let data = self.data.read();
        data.resolve(id)
            .map(|slot| data.node(slot).parent_id == parent_id)
            .unwrap_or(false)
    }

    /// Enumerates the subtree below `root_id` breadth-first.
    ///
    /// Returns every descendant identifier in BFS order, optionally preceded
    /// by `root_id` itself. Ordering is deterministic given the snapshot
    /// order. An unknown `root_id` yields an empty result, not an error.
    /// Does not terminate on a cyclic child graph.
    pub fn subtree_ids(&self, root_id: NodeId, include_self: bool) -> Vec<NodeId> {
        let data = self.data.read();
        let Some(root) = data.resolve(root_id) else {
            return Vec::new();
        };

        let mut ids = Vec::new();
        if include_self {
            ids.push(root_id);
        }

        let mut queue = VecDeque::new();
        queue.push_back(root);
        while let Some(slot) = queue.pop_front() {
            for &child in &data.node(slot).children {
                ids.push(data.node(child).id);
                queue.push_back(child);
            }
        }
        ids
    }

    /// True iff `target_id` lies in the subtree rooted at `root_id`
    /// (inclusive), checked by a sequential stack-based traversal.
    ///
    /// For the parallel variant see
    /// [`is_in_subtree_concurrent`](Tree::is_in_subtree_concurrent).
    pub fn is_in_subtree(&self, root_id: NodeId, target_id: NodeId) -> bool {
        let data = self.data.read();
        let Some(root) = data.resolve(root_id) else {
            return false;
        };

        let mut stack = vec![root];
        while let Some(slot) = stack.pop() {
            let node = data.node(slot);
            if node.id == target_id {
                return true;
            }
            stack.extend(node.children.iter().copied());
        }
        false
    }

    /// Returns the direct child identifiers of a node, in sibling order.
    ///
    /// Empty for unknown identifiers and for leaves.
    pub fn children_ids(&self, id: NodeId) -> Vec<NodeId> {
        let data = self.data.read();
        data.resolve(id)
            .map(|slot| {
                data.node(slot)
                    .children
                    .iter()
                    .map(|&child| data.node(child).id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// True if the identifier resolves in the index.
    pub fn contains(&self, id: NodeId) -> bool {
        self.data.read().index.contains_key(&id)
    }

    /// Returns the number of addressable nodes (distinct identifiers).
    pub fn len(&self) -> usize {
        self.data.read().index.len()
    }

    /// True if the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.data.read().index.is_empty()
    }

    /// Checks the acyclicity precondition on every parent chain.
    ///
    /// Walks each node's parent chain with a hop budget of the arena size;
    /// exceeding the budget proves a cycle. Returns the identifier of the
    /// first node found on a cyclic chain. O(n * depth), intended as an
    /// opt-in diagnostic after construction from untrusted input.
    pub fn validate(&self) -> Result<()> {
        let data = self.data.read();
        let budget = data.arena.len();
        for start in 0..data.arena.len() {
            let mut current = NodeSlot::new(start);
            let mut hops = 0;
            while let Some(parent) = data.resolve(data.node(current).parent_id) {
                hops += 1;
                if hops > budget {
                    return Err(TreeError::CycleDetected {
                        id: data.node(NodeSlot::new(start)).id,
                    });
                }
                current = parent;
            }
        }
        Ok(())
    }
}

impl<T: Clone> Tree<T> {
    /// Returns a clone of the node with the given identifier.
    pub fn get(&self, id: NodeId) -> Option<TreeNode<T>> {
        let data = self.data.read();
        data.resolve(id).map(|slot| data.node(slot).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ROOT_PARENT;

    fn node(id: NodeId, parent_id: NodeId) -> TreeNode<()> {
        TreeNode::new(id, parent_id, format!("node-{id}"), 0, ())
    }

    /// Nodes from the reference scenario: 1(root), 2 and 3 under 1,
    /// 4 under 2, 5 under 3.
    fn scenario_tree() -> Tree<()> {
        Tree::new(vec![
            node(1, ROOT_PARENT),
            node(2, 1),
            node(3, 1),
            node(4, 2),
            node(5, 3),
        ])
    }

    #[test]
    fn empty_snapshot_yields_empty_tree() {
        let tree: Tree<()> = Tree::new(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.root_nodes().is_empty());
        assert!(tree.subtree_ids(1, true).is_empty());
    }

    #[test]
    fn roots_include_sentinel_and_dangling_parents() {
        let tree = Tree::new(vec![node(1, 0), node(2, 1), node(3, 999)]);
        assert_eq!(tree.root_nodes(), vec![1, 3]);
        assert_eq!(tree.root_count(), 2);
    }

    #[test]
    fn levels_follow_parent_chain() {
        let tree = scenario_tree();
        assert_eq!(tree.level(1), 0);
        assert_eq!(tree.level(2), 1);
        assert_eq!(tree.level(4), 2);
        assert_eq!(tree.level(999), -1);
    }

    #[test]
    fn every_child_is_one_level_below_its_parent() {
        let tree = scenario_tree();
        for id in [2u64, 3, 4, 5] {
            let parent_id = tree.get(id).unwrap().parent_id;
            assert_eq!(tree.level(id), tree.level(parent_id) + 1);
        }
    }

    #[test]
    fn dangling_parent_is_level_zero() {
        let tree = Tree::new(vec![node(7, 999), node(8, 7)]);
        assert_eq!(tree.level(7), 0);
        assert_eq!(tree.level(8), 1);
    }

    #[test]
    fn is_parent_checks_direct_parentage_only() {
        let tree = scenario_tree();
        assert!(tree.is_parent(2, 1));
        assert!(tree.is_parent(4, 2));
        assert!(!tree.is_parent(4, 1)); // grandparent, not parent
        assert!(!tree.is_parent(4, 3));
        assert!(!tree.is_parent(999, 1));
    }

    #[test]
    fn subtree_enumeration_is_breadth_first() {
        let tree = scenario_tree();
        assert_eq!(tree.subtree_ids(1, true), vec![1, 2, 3, 4, 5]);
        assert_eq!(tree.subtree_ids(1, false), vec![2, 3, 4, 5]);
        assert_eq!(tree.subtree_ids(2, true), vec![2, 4]);
        assert_eq!(tree.subtree_ids(5, false), Vec::<NodeId>::new());
        assert_eq!(tree.subtree_ids(999, true), Vec::<NodeId>::new());
    }

    #[test]
    fn full_enumeration_covers_every_node_once() {
        let n = 100u64;
        let nodes = (1..=n).map(|id| node(id, id / 2)).collect();
        let tree = Tree::new(nodes);
        let mut ids = tree.subtree_ids(1, true);
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), n as usize);
    }

    #[test]
    fn order_field_drives_sibling_ordering() {
        let tree = Tree::new(vec![
            TreeNode::new(1, 0, "root", 0, ()),
            TreeNode::new(3, 1, "second", 2, ()),
            TreeNode::new(2, 1, "first", 1, ()),
            TreeNode::new(4, 1, "third", 3, ()),
        ]);
        assert_eq!(tree.children_ids(1), vec![2, 3, 4]);
        assert_eq!(tree.subtree_ids(1, false), vec![2, 3, 4]);
    }

    #[test]
    fn duplicate_identifier_last_write_wins() {
        let tree = Tree::new(vec![
            node(1, 0),
            TreeNode::new(2, 1, "early", 0, ()),
            TreeNode::new(2, 1, "late", 0, ()),
        ]);
        assert_eq!(tree.get(2).unwrap().name, "late");
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn shadowed_duplicate_never_appears_in_enumeration() {
        let tree = Tree::new(vec![
            node(1, 0),
            TreeNode::new(2, 1, "early", 0, ()),
            TreeNode::new(2, 1, "late", 0, ()),
            node(3, 2),
        ]);
        // The overwrite is silent: the shadowed node is gone, not a sibling.
        assert_eq!(tree.subtree_ids(1, true), vec![1, 2, 3]);
        assert_eq!(tree.children_ids(1), vec![2]);
        assert_eq!(tree.children_ids(2), vec![3]);
    }

    #[test]
    fn queries_are_idempotent() {
        let tree = scenario_tree();
        let first = tree.subtree_ids(1, true);
        for _ in 0..10 {
            assert_eq!(tree.subtree_ids(1, true), first);
            assert_eq!(tree.level(4), 2);
            assert!(tree.is_parent(2, 1));
        }
    }

    #[test]
    fn validate_accepts_acyclic_tree() {
        assert!(scenario_tree().validate().is_ok());
    }

    #[test]
    fn validate_detects_two_node_cycle() {
        let tree = Tree::new(vec![node(1, 2), node(2, 1)]);
        match tree.validate() {
            Err(TreeError::CycleDetected { id }) => assert!(id == 1 || id == 2),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn validate_detects_self_parent() {
        let tree = Tree::new(vec![node(1, 1)]);
        assert!(tree.validate().is_err());
    }

    #[test]
    fn payloads_survive_construction() {
        let tree = Tree::new(vec![
            TreeNode::new(1, 0, "root", 0, "top"),
            TreeNode::new(2, 1, "leaf", 0, "nested"),
        ]);
        assert_eq!(tree.get(2).unwrap().payload, "nested");
    }

    #[test]
    fn builds_from_json_snapshot() {
        let nodes: Vec<TreeNode<serde_json::Value>> = serde_json::from_str(
            r#"[
                {"id": 1, "parent_id": 0, "name": "menu", "order": 0, "payload": null},
                {"id": 2, "parent_id": 1, "name": "files", "order": 1, "payload": {"icon": "folder"}},
                {"id": 3, "parent_id": 1, "name": "edit", "order": 2, "payload": null}
            ]"#,
        )
        .unwrap();
        let tree = Tree::new(nodes);
        assert_eq!(tree.root_nodes(), vec![1]);
        assert_eq!(tree.children_ids(1), vec![2, 3]);
        assert_eq!(tree.get(2).unwrap().payload["icon"], "folder");
    }
}
