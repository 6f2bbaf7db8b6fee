use criterion::{criterion_group, criterion_main, Criterion};
use treeindex::{Tree, TreeNode};

/// Builds a tree of `n` nodes rooted at `1`, where node `id` hangs under
/// `id / fanout`, giving a roughly balanced shape with the chosen fan-out.
fn balanced_tree(n: u64, fanout: u64) -> Tree<()> {
    let nodes = (1..=n)
        .map(|id| {
            let parent = if id == 1 { 0 } else { (id / fanout).max(1) };
            TreeNode::new(id, parent, format!("node-{id}"), 0, ())
        })
        .collect();
    Tree::new(nodes)
}

fn membership_search(c: &mut Criterion) {
    let tree = balanced_tree(10_000, 4);

    c.bench_function("concurrent_hit_deep", |b| {
        b.iter(|| tree.is_in_subtree_concurrent(1, 9_999));
    });
    c.bench_function("concurrent_miss", |b| {
        b.iter(|| tree.is_in_subtree_concurrent(2, 10_001));
    });
    c.bench_function("sequential_hit_deep", |b| {
        b.iter(|| tree.is_in_subtree(1, 9_999));
    });
    c.bench_function("sequential_miss", |b| {
        b.iter(|| tree.is_in_subtree(2, 10_001));
    });
}

fn construction(c: &mut Criterion) {
    c.bench_function("build_10k", |b| {
        b.iter(|| balanced_tree(10_000, 4));
    });
}

criterion_group!(benches, membership_search, construction);
criterion_main!(benches);
