//! Concurrent subtree membership search.
//!
//! The search fans out one task per visited node on rayon's worker pool: a
//! task compares its node against the target and spawns one child task per
//! child. The surrounding [`rayon::scope`] is the wait-for-all barrier, so
//! the outer call only returns after every spawned task has finished.
//!
//! A single-slot channel carries the first positive match; a match performs a
//! non-blocking send so that racing positives beyond the first are dropped
//! rather than blocking. Finding the target does not cancel branches already
//! in flight, so total work is always proportional to the subtree size; the
//! per-call token only stops tasks from starting after the outer call has
//! returned.

use std::sync::mpsc::{self, SyncSender};

use rayon::Scope;

use crate::cancel::CancellationToken;
use crate::node::{NodeId, NodeSlot};
use crate::tree::{Tree, TreeData};

impl<T: Sync> Tree<T> {
    /// True iff `target_id` lies in the subtree rooted at `root_id`
    /// (inclusive), searched with one parallel task per visited node.
    ///
    /// Returns `false` immediately, without spawning any work, when
    /// `root_id` is unknown. No ordering guarantee exists on which matching
    /// branch reports first when several contain the target.
    pub fn is_in_subtree_concurrent(&self, root_id: NodeId, target_id: NodeId) -> bool {
        let data = self.data.read();
        let Some(root) = data.resolve(root_id) else {
            return false;
        };

        let token = CancellationToken::new();
        // Cancelled when this call returns, never on match.
        let _cancel_guard = token.cancel_on_drop();

        let (sender, receiver) = mpsc::sync_channel(1);
        rayon::scope(|scope| {
            visit(scope, &data, root, target_id, sender, token.clone());
        });

        // Every task has joined by now; an empty channel means no match.
        receiver.try_recv().unwrap_or(false)
    }
}

/// One search step: compare this node, then fan out over its children.
fn visit<'scope, T: Sync>(
    scope: &Scope<'scope>,
    data: &'scope TreeData<T>,
    slot: NodeSlot,
    target_id: NodeId,
    sender: SyncSender<bool>,
    token: CancellationToken,
) {
    // Entry check: a task scheduled after the outer call returned never runs.
    if token.is_cancelled().is_none() {
        return;
    }

    let node = data.node(slot);
    if node.id == target_id {
        // Non-blocking: only the first positive answer is delivered.
        let _ = sender.try_send(true);
        return;
    }

    for &child in &node.children {
        let sender = sender.clone();
        let token = token.clone();
        scope.spawn(move |scope| visit(scope, data, child, target_id, sender, token));
    }
}
