//! Row-based greedy packing. The parent rectangle is divided into rows along
//! its long axis; each row takes children (in descending-size order) until
//! the next child would get too narrow relative to the parent's short side.

use super::{distribute_px, PixRect};
use crate::tree::arena::{FileTree, NodeId};

/// A row closes when the next child's extent along the packing axis would
/// fall below this fraction of the parent's short side.
const MIN_PROPORTION: f64 = 0.4;

struct Row {
    /// Fraction of the short axis this row occupies.
    extent: f64,
    /// Children in order with their fraction of the long axis. Zero-size
    /// children sit at the end of their row with fraction 0.
    children: Vec<(NodeId, f64)>,
}

/// Partition a non-zero-size directory's rectangle among its children.
/// Returns one rectangle per child, in child order.
pub(super) fn partition(tree: &FileTree, parent: NodeId, rect: PixRect) -> Vec<(NodeId, PixRect)> {
    let children: Vec<NodeId> = tree.children(parent).collect();
    debug_assert!(!children.is_empty());
    let parent_size = tree.get(parent).size;
    debug_assert!(parent_size > 0);

    let horizontal = rect.width >= rect.height;
    let (long_px, short_px) = if horizontal {
        (rect.width, rect.height)
    } else {
        (rect.height, rect.width)
    };
    let aspect = if short_px > 0 {
        long_px as f64 / short_px as f64
    } else {
        1.0
    };

    let mut rows = Vec::new();
    let mut next = 0;
    while next < children.len() {
        let (row, used) = next_row(tree, &children[next..], parent_size, aspect);
        debug_assert!(used > 0);
        rows.push(row);
        next += used;
    }

    // Integer conversion: rows share the short axis, each row's children
    // share the long axis. distribute_px lands the last edges exactly on the
    // parent's far edges, so the partition is pixel-exact by construction.
    let extents: Vec<f64> = rows.iter().map(|r| r.extent).collect();
    let row_heights = distribute_px(&extents, short_px);

    let mut out = Vec::with_capacity(children.len());
    let mut cross = if horizontal { rect.top } else { rect.left };
    for (row, row_height) in rows.iter().zip(row_heights) {
        let fractions: Vec<f64> = row.children.iter().map(|&(_, f)| f).collect();
        let spans = distribute_px(&fractions, long_px);
        let mut main = if horizontal { rect.left } else { rect.top };
        for (&(child, _), span) in row.children.iter().zip(spans) {
            let child_rect = if horizontal {
                PixRect::new(main, cross, span, row_height)
            } else {
                PixRect::new(cross, main, row_height, span)
            };
            out.push((child, child_rect));
            main += span;
        }
        cross += row_height;
    }
    out
}

/// Greedily fill one row starting at `children[0]`.
/// Returns the row and how many children it consumed.
fn next_row(tree: &FileTree, children: &[NodeId], parent_size: u64, aspect: f64) -> (Row, usize) {
    let my_size = parent_size as f64;
    let mut size_used = 0.0;
    let mut row_extent = 0.0;
    let mut taken = 0;

    for (i, &child) in children.iter().enumerate() {
        let child_size = tree.get(child).size as f64;
        if child_size == 0.0 {
            // Zero-size children close the row; they are collected below.
            debug_assert!(i > 0, "a zero-size child cannot start a row (unsorted input?)");
            break;
        }

        size_used += child_size;
        let virtual_extent = size_used / my_size;
        // The candidate's extent along the packing axis, as a fraction of
        // the parent's short side.
        let child_span = child_size / my_size * aspect / virtual_extent;
        if child_span < MIN_PROPORTION && taken > 0 {
            size_used -= child_size;
            break;
        }
        row_extent = virtual_extent;
        taken = i + 1;
    }

    // Trailing zero-size children keep their slots in this row, with zero
    // span, so child order and rectangle order stay index-aligned.
    let mut end = taken.max(1);
    while end < children.len() && tree.get(children[end]).size == 0 {
        end += 1;
    }

    let row_size = my_size * row_extent;
    let members = children[..end]
        .iter()
        .map(|&c| {
            let child_size = tree.get(c).size as f64;
            let fraction = if row_size > 0.0 {
                child_size / row_size
            } else {
                0.0
            };
            (c, fraction)
        })
        .collect();

    (
        Row {
            extent: row_extent,
            children: members,
        },
        end,
    )
}

/// Equal split for zero-size directories: one horizontal row, each child
/// `width / n` wide by integer division, the last child taking the
/// remainder. Avoids the division by zero a weighted split would hit.
pub(super) fn equal_split(
    tree: &FileTree,
    parent: NodeId,
    rect: PixRect,
) -> Vec<(NodeId, PixRect)> {
    let children: Vec<NodeId> = tree.children(parent).collect();
    debug_assert!(!children.is_empty());

    let n = children.len() as i32;
    let base = rect.width / n;
    let mut out = Vec::with_capacity(children.len());
    let mut left = rect.left;
    for (i, &child) in children.iter().enumerate() {
        let right = if i as i32 == n - 1 {
            rect.right()
        } else {
            left + base
        };
        out.push((child, PixRect::new(left, rect.top, right - left, rect.height)));
        left = right;
    }
    out
}
