use super::arena::{FileTree, NodeId};

/// Compute aggregated sizes for all directory nodes (bottom-up).
/// After this, each directory's `size` field equals the sum of all descendant leaf sizes.
pub fn aggregate_sizes(tree: &mut FileTree) {
    // Process nodes in reverse order (children before parents) since
    // children always have higher indices than their parents in our arena.
    // This is guaranteed by the add_node insertion order.
    let len = tree.nodes.len();
    for i in (0..len).rev() {
        let node = &tree.nodes[i];
        if node.is_leaf() {
            continue;
        }

        // Sum up all direct children
        let mut total: u64 = 0;
        let mut child = node.first_child;
        while let Some(child_id) = child {
            total += tree.nodes[child_id.index()].size;
            child = tree.nodes[child_id.index()].next_sibling;
        }
        tree.nodes[i].size = total;
    }
}

/// Sort children of each directory by size (descending).
/// The layout engine requires children sorted by size and does not sort itself.
/// This re-links the sibling lists without moving nodes in the arena.
pub fn sort_children_by_size(tree: &mut FileTree) {
    let len = tree.nodes.len();
    for i in 0..len {
        if tree.nodes[i].is_leaf() || tree.nodes[i].first_child.is_none() {
            continue;
        }

        // Collect children into a vec
        let mut children: Vec<NodeId> = Vec::new();
        let mut child = tree.nodes[i].first_child;
        while let Some(child_id) = child {
            children.push(child_id);
            child = tree.nodes[child_id.index()].next_sibling;
        }

        // Sort by size descending
        children.sort_by(|a, b| {
            tree.nodes[b.index()]
                .size
                .cmp(&tree.nodes[a.index()].size)
        });

        // Re-link the sibling list
        if children.is_empty() {
            continue;
        }
        tree.nodes[i].first_child = Some(children[0]);
        for w in children.windows(2) {
            tree.nodes[w[0].index()].next_sibling = Some(w[1]);
        }
        tree.nodes[children.last().unwrap().index()].next_sibling = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::arena::FileTree;

    #[test]
    fn aggregate_sums_nested_dirs() {
        let mut tree = FileTree::new("root");
        let sub = tree.add_dir(tree.root, "sub");
        tree.add_leaf(sub, "a", 30, 0);
        tree.add_leaf(sub, "b", 20, 0);
        tree.add_leaf(tree.root, "c", 50, 0);

        aggregate_sizes(&mut tree);

        assert_eq!(tree.get(sub).size, 50);
        assert_eq!(tree.get(tree.root).size, 100);
    }

    #[test]
    fn sort_orders_siblings_descending() {
        let mut tree = FileTree::new("root");
        tree.add_leaf(tree.root, "small", 10, 0);
        tree.add_leaf(tree.root, "big", 90, 0);
        tree.add_leaf(tree.root, "mid", 40, 0);

        aggregate_sizes(&mut tree);
        sort_children_by_size(&mut tree);

        let sizes: Vec<u64> = tree
            .children(tree.root)
            .map(|id| tree.get(id).size)
            .collect();
        assert_eq!(sizes, vec![90, 40, 10]);
    }
}
