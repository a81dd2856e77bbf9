//! Treemap layout: recursive squarification of a weighted tree into integer
//! pixel rectangles, plus accumulation of the cushion surface coefficients
//! the rasterizer shades with.
//!
//! The layout never touches the tree; each render pass gets its own
//! [`Layout`] (rectangle list + node lookup), so cancellation just drops the
//! partial result and hit-testing always sees a finished assignment.

pub mod kdirstat;
pub mod squarify;

use std::collections::HashMap;

use crate::cancel::CancelToken;
use crate::options::{RenderOptions, TreemapStyle};
use crate::tree::arena::{FileTree, NodeId};

/// Integer pixel rectangle. Zero area is valid and means "not drawn".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl PixRect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0);
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Half-open containment: the right and bottom edges are exclusive.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    pub fn intersection(&self, other: &PixRect) -> PixRect {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        PixRect {
            left,
            top,
            width: (right - left).max(0),
            height: (bottom - top).max(0),
        }
    }
}

/// A positioned rectangle in the treemap layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRect {
    pub node: NodeId,
    pub rect: PixRect,
    pub depth: u16,
    /// Accumulated cushion surface coefficients
    /// [linear_x, quad_x, linear_y, quad_y] from van Wijk & van de Wetering 1999.
    pub surface: [f64; 4],
}

/// The full layout result (rects + fast lookup).
///
/// `rects` is in draw order, parents before children.
#[derive(Debug)]
pub struct Layout {
    pub rects: Vec<LayoutRect>,
    /// node → index into `rects` (O(1) hover, tooltip, highlighting)
    pub node_to_rect: HashMap<NodeId, usize>,
}

impl Layout {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            rects: Vec::with_capacity(capacity),
            node_to_rect: HashMap::with_capacity(capacity),
        }
    }

    fn push(&mut self, rect: LayoutRect) {
        self.node_to_rect.insert(rect.node, self.rects.len());
        self.rects.push(rect);
    }

    pub fn get(&self, node: NodeId) -> Option<&LayoutRect> {
        self.node_to_rect.get(&node).map(|&i| &self.rects[i])
    }

    pub fn rect_of(&self, node: NodeId) -> Option<PixRect> {
        self.get(node).map(|lr| lr.rect)
    }
}

/// Compute the layout for any subtree (the root can be any directory, for
/// drill-down views). Returns `None` iff the pass was cancelled.
pub fn compute_layout(
    tree: &FileTree,
    root: NodeId,
    viewport: PixRect,
    options: &RenderOptions,
    cancel: &CancelToken,
) -> Option<Layout> {
    let mut layout = Layout::with_capacity(tree.len() / 4);
    recurse(
        tree,
        options,
        cancel,
        root,
        viewport,
        [0.0; 4],
        options.height_factor,
        true,
        0,
        &mut layout,
    )?;
    tracing::debug!(
        rects = layout.rects.len(),
        nodes = tree.len(),
        "layout computed"
    );
    Some(layout)
}

fn recurse(
    tree: &FileTree,
    options: &RenderOptions,
    cancel: &CancelToken,
    node_id: NodeId,
    rect: PixRect,
    parent_surface: [f64; 4],
    h: f64,
    is_root: bool,
    depth: u16,
    out: &mut Layout,
) -> Option<()> {
    if cancel.is_cancelled() {
        return None;
    }

    let node = tree.get(node_id);

    let mut surface = parent_surface;
    if options.is_cushion_shading() && !is_root {
        let (s0, s1) = surface.split_at_mut(1);
        add_ridge(
            rect.left as f64,
            rect.right() as f64,
            h,
            &mut s0[0],
            &mut s1[0],
        );
        let (s2, s3) = surface.split_at_mut(3);
        add_ridge(
            rect.top as f64,
            rect.bottom() as f64,
            h,
            &mut s2[2],
            &mut s3[0],
        );
    }

    out.push(LayoutRect {
        node: node_id,
        rect,
        depth,
        surface,
    });

    // Too small to subdivide; with the grid on, one-pixel rectangles are all
    // grid line anyway.
    let grid_width = if options.grid { 1 } else { 0 };
    if rect.width <= grid_width || rect.height <= grid_width {
        return Some(());
    }

    if node.is_leaf() || node.first_child.is_none() {
        return Some(());
    }

    debug_assert!(
        children_sorted_descending(tree, node_id),
        "children must be pre-sorted by descending size (tree::aggregate::sort_children_by_size)"
    );
    debug_assert!(
        child_sum_matches(tree, node_id),
        "directory size must equal the sum of its children (tree::aggregate::aggregate_sizes)"
    );

    // Zero-size directories split evenly and keep the ridge height; normal
    // recursion decays it per level for the nested 3-D look.
    let child_h = if node.size == 0 {
        h
    } else {
        h * options.scale_factor
    };
    let parts = if node.size == 0 {
        kdirstat::equal_split(tree, node_id, rect)
    } else {
        match options.style {
            TreemapStyle::KDirStat => kdirstat::partition(tree, node_id, rect),
            TreemapStyle::SequoiaView => squarify::partition(tree, node_id, rect),
        }
    };

    for (child, child_rect) in parts {
        recurse(
            tree, options, cancel, child, child_rect, surface, child_h, false,
            depth + 1, out,
        )?;
    }
    Some(())
}

/// Add a parabolic ridge of height `h` to the cushion surface coefficients
/// along one axis. Matches the CTM procedure from van Wijk & van de
/// Wetering 1999.
fn add_ridge(x1: f64, x2: f64, h: f64, s_lin: &mut f64, s_quad: &mut f64) {
    let denom = x2 - x1;
    if denom.abs() < 1e-6 {
        return;
    }
    *s_lin += 4.0 * h * (x2 + x1) / denom;
    *s_quad -= 4.0 * h / denom;
}

/// Convert fractional shares into integer pixel extents that sum exactly to
/// `total`. Base extents come from flooring each share; leftover pixels go
/// to the earliest non-zero shares, which keeps extents non-increasing when
/// the shares are non-increasing and lands the last edge exactly on the far
/// edge of the parent.
pub(crate) fn distribute_px(shares: &[f64], total: i32) -> Vec<i32> {
    let mut extents: Vec<i32> = shares
        .iter()
        .map(|s| ((s * total as f64).floor() as i32).clamp(0, total))
        .collect();
    let used: i32 = extents.iter().sum();
    let mut leftover = total - used;

    if leftover < 0 {
        // Accumulated float error overshot the far edge; trim from the end.
        for e in extents.iter_mut().rev() {
            let take = (*e).min(-leftover);
            *e -= take;
            leftover += take;
            if leftover == 0 {
                break;
            }
        }
        return extents;
    }

    let nonzero: Vec<usize> = (0..shares.len()).filter(|&i| shares[i] > 0.0).collect();
    if !nonzero.is_empty() {
        let mut i = 0;
        while leftover > 0 {
            extents[nonzero[i % nonzero.len()]] += 1;
            leftover -= 1;
            i += 1;
        }
    }
    extents
}

fn children_sorted_descending(tree: &FileTree, parent: NodeId) -> bool {
    let mut prev = u64::MAX;
    for child in tree.children(parent) {
        let size = tree.get(child).size;
        if size > prev {
            return false;
        }
        prev = size;
    }
    true
}

fn child_sum_matches(tree: &FileTree, parent: NodeId) -> bool {
    let sum: u64 = tree.children(parent).map(|c| tree.get(c).size).sum();
    sum == tree.get(parent).size
}
