//! Point → node lookup against a completed layout.

use crate::layout::Layout;
use crate::tree::arena::{FileTree, NodeId};

/// Find the deepest node whose rectangle contains the point.
///
/// Descends from `root`, at each level following the unique child whose
/// rectangle contains the point (sibling rectangles are disjoint, so at most
/// one matches). Cost is O(depth x fan-out), never O(total nodes). Returns
/// `None` only when the point lies outside the root rectangle or the root
/// was not laid out at all.
pub fn find_node_at(
    tree: &FileTree,
    layout: &Layout,
    root: NodeId,
    x: i32,
    y: i32,
) -> Option<NodeId> {
    let root_rect = layout.rect_of(root)?;
    if !root_rect.contains(x, y) {
        return None;
    }

    let mut current = root;
    'descend: loop {
        for child in tree.children(current) {
            // Children under a degenerate rectangle are not laid out;
            // zero-area rectangles contain no point.
            if let Some(rect) = layout.rect_of(child) {
                if rect.contains(x, y) {
                    current = child;
                    continue 'descend;
                }
            }
        }
        return Some(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::layout::{compute_layout, PixRect};
    use crate::options::RenderOptions;
    use crate::tree::aggregate;
    use crate::tree::arena::FileTree;

    fn nested_tree() -> FileTree {
        let mut tree = FileTree::new("root");
        let sub = tree.add_dir(tree.root, "sub");
        tree.add_leaf(sub, "deep1", 300, 0);
        tree.add_leaf(sub, "deep2", 200, 1);
        tree.add_leaf(tree.root, "top", 500, 2);
        tree.add_leaf(tree.root, "zero", 0, 3);
        aggregate::aggregate_sizes(&mut tree);
        aggregate::sort_children_by_size(&mut tree);
        tree
    }

    fn laid_out(tree: &FileTree, w: i32, h: i32) -> Layout {
        compute_layout(
            tree,
            tree.root,
            PixRect::new(0, 0, w, h),
            &RenderOptions::default(),
            &CancelToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn center_of_every_leaf_hits_that_leaf() {
        let tree = nested_tree();
        let layout = laid_out(&tree, 200, 150);
        for (i, node) in tree.nodes.iter().enumerate() {
            if !node.is_leaf() {
                continue;
            }
            let id = NodeId(i as u32);
            let rect = layout.rect_of(id).unwrap();
            if rect.is_empty() {
                continue;
            }
            let cx = rect.left + rect.width / 2;
            let cy = rect.top + rect.height / 2;
            assert_eq!(
                find_node_at(&tree, &layout, tree.root, cx, cy),
                Some(id),
                "center of {:?}",
                node.name
            );
        }
    }

    #[test]
    fn outside_the_render_area_misses() {
        let tree = nested_tree();
        let layout = laid_out(&tree, 100, 100);
        assert_eq!(find_node_at(&tree, &layout, tree.root, -1, 50), None);
        assert_eq!(find_node_at(&tree, &layout, tree.root, 100, 50), None);
        assert_eq!(find_node_at(&tree, &layout, tree.root, 50, 100), None);
    }

    #[test]
    fn empty_dir_resolves_to_itself() {
        let mut tree = FileTree::new("root");
        aggregate::aggregate_sizes(&mut tree);
        // A zero-size root still gets the viewport rectangle; with no
        // children the hit resolves to the root itself.
        let layout = laid_out(&tree, 10, 10);
        assert_eq!(
            find_node_at(&tree, &layout, tree.root, 5, 5),
            Some(tree.root)
        );
    }

    #[test]
    fn zero_size_leaf_is_never_hit() {
        let tree = nested_tree();
        let layout = laid_out(&tree, 200, 150);
        let zero = (0..tree.len() as u32)
            .map(NodeId)
            .find(|&id| tree.get(id).is_leaf() && tree.get(id).size == 0)
            .unwrap();
        let rect = layout.rect_of(zero).unwrap();
        assert_eq!(rect.area(), 0);
        // Its anchor point belongs to whichever sibling actually covers it.
        let hit = find_node_at(&tree, &layout, tree.root, rect.left.min(199), rect.top);
        assert_ne!(hit, Some(zero));
    }
}
