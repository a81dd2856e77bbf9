//! Squarified packing (Bruls, Huizing, van Wijk): rows are grown greedily
//! while the worst aspect ratio in the row keeps improving, then laid along
//! the long axis of the remaining rectangle.

use super::{distribute_px, PixRect};
use crate::tree::arena::{FileTree, NodeId};

/// Partition a non-zero-size directory's rectangle among its children.
/// Returns one rectangle per child, in child order.
pub(super) fn partition(tree: &FileTree, parent: NodeId, rect: PixRect) -> Vec<(NodeId, PixRect)> {
    let children: Vec<NodeId> = tree.children(parent).collect();
    debug_assert!(!children.is_empty());
    let parent_size = tree.get(parent).size;
    debug_assert!(parent_size > 0);

    // Normalized pixel areas against the full rectangle; consistent across
    // rows because every row consumes exactly its share of the area.
    let total_area = rect.width as f64 * rect.height as f64;
    let areas: Vec<f64> = children
        .iter()
        .map(|&c| tree.get(c).size as f64 / parent_size as f64 * total_area)
        .collect();

    let mut out = Vec::with_capacity(children.len());
    let (mut x, mut y, mut w, mut h) = (rect.left, rect.top, rect.width, rect.height);

    let mut idx = 0;
    while idx < children.len() {
        // Once only zero-size children (or no space) remain, they occupy
        // zero-area slots at the current corner.
        if areas[idx] <= 0.0 || w <= 0 || h <= 0 {
            for &c in &children[idx..] {
                out.push((c, PixRect::new(x, y, 0, 0)));
            }
            break;
        }

        let horizontal = w >= h;
        let long = if horizontal { w } else { h } as f64;

        // Find the best row length.
        let mut best_score = f64::INFINITY;
        let mut best_k = 1;
        let mut row_sum = areas[idx];
        let mut sum = 0.0;
        let max_k = (children.len() - idx).min(20); // cap for speed
        for k in 1..=max_k {
            let area = areas[idx + k - 1];
            if area <= 0.0 {
                break; // zero-size children never join a row
            }
            sum += area;
            let score = worst_aspect_ratio(&areas[idx..idx + k], sum, long);
            if score < best_score {
                best_score = score;
                best_k = k;
                row_sum = sum;
            } else if k > 3 {
                break; // diminishing returns
            }
        }

        let end = idx + best_k;
        let last_row = end >= children.len() || areas[end] <= 0.0;

        let short_avail = if horizontal { h } else { w };
        let mut thickness = ((row_sum / long) as i32).min(short_avail);
        if last_row {
            // The final row absorbs the rounding slack of all earlier rows.
            thickness = short_avail;
        }

        let fractions: Vec<f64> = areas[idx..end].iter().map(|&a| a / row_sum).collect();
        let spans = distribute_px(&fractions, if horizontal { w } else { h });
        let mut main = if horizontal { x } else { y };
        for (&child, span) in children[idx..end].iter().zip(spans) {
            let child_rect = if horizontal {
                PixRect::new(main, y, span, thickness)
            } else {
                PixRect::new(x, main, thickness, span)
            };
            out.push((child, child_rect));
            main += span;
        }

        // Shrink the remaining space.
        if horizontal {
            y += thickness;
            h -= thickness;
        } else {
            x += thickness;
            w -= thickness;
        }
        idx = end;
    }

    out
}

/// Worst aspect ratio a row of `areas` would have when laid along a side of
/// length `side` with combined area `sum`.
fn worst_aspect_ratio(areas: &[f64], sum: f64, side: f64) -> f64 {
    if areas.is_empty() || sum <= 0.0 || side <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let max_a = areas.iter().copied().fold(0.0, f64::max);
    let min_a = areas.iter().copied().fold(f64::INFINITY, f64::min);
    let a = (side_sq * max_a) / sum_sq;
    let b = sum_sq / (side_sq * min_a);
    a.max(b)
}
