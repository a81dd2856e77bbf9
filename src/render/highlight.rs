//! Highlight overlay: border/fill marks drawn over the rendered treemap.
//!
//! Marks go into a fresh transparent buffer of the render size so the
//! presentation layer can composite them over the base image without
//! re-rendering it.

use crate::layout::{Layout, PixRect};
use crate::render::colors::Rgb;
use crate::render::pixels::{PixelBuffer, Rgba};
use crate::tree::arena::{FileTree, NodeId, NodeKind};

/// Border thickness of a highlight frame.
const FRAME_WIDTH: i32 = 3;
/// Rectangles smaller than this on either side are filled solid; a frame
/// would swallow them whole.
const MIN_FRAME_SIZE: i32 = 7;

/// Selection mode: mark an explicit set of nodes.
pub fn draw_selection(buffer: &mut PixelBuffer, layout: &Layout, nodes: &[NodeId], color: Rgb) {
    let mark = color.opaque();
    for &node in nodes {
        if let Some(rect) = layout.rect_of(node) {
            render_mark(buffer, rect, mark);
        }
    }
}

/// Predicate mode: mark every laid-out leaf whose category matches `category`.
pub fn draw_category(
    buffer: &mut PixelBuffer,
    layout: &Layout,
    tree: &FileTree,
    category: u16,
    color: Rgb,
) {
    let mark = color.opaque();
    let mut marked = 0usize;
    for lr in &layout.rects {
        match tree.get(lr.node).kind {
            NodeKind::Leaf { category: c } if c == category => {
                render_mark(buffer, lr.rect, mark);
                marked += 1;
            }
            _ => {}
        }
    }
    tracing::debug!(category, marked, "category highlight drawn");
}

fn render_mark(buffer: &mut PixelBuffer, rect: PixRect, color: Rgba) {
    if rect.is_empty() {
        return;
    }
    if rect.width >= MIN_FRAME_SIZE && rect.height >= MIN_FRAME_SIZE {
        let inner_height = rect.height - 2 * FRAME_WIDTH;
        fill_region(
            buffer,
            PixRect::new(rect.left, rect.top, rect.width, FRAME_WIDTH),
            color,
        );
        fill_region(
            buffer,
            PixRect::new(rect.left, rect.bottom() - FRAME_WIDTH, rect.width, FRAME_WIDTH),
            color,
        );
        fill_region(
            buffer,
            PixRect::new(rect.left, rect.top + FRAME_WIDTH, FRAME_WIDTH, inner_height),
            color,
        );
        fill_region(
            buffer,
            PixRect::new(
                rect.right() - FRAME_WIDTH,
                rect.top + FRAME_WIDTH,
                FRAME_WIDTH,
                inner_height,
            ),
            color,
        );
    } else {
        fill_region(buffer, rect, color);
    }
}

fn fill_region(buffer: &mut PixelBuffer, rect: PixRect, color: Rgba) {
    let x0 = rect.left.max(0);
    let x1 = rect.right().min(buffer.width() as i32);
    let y0 = rect.top.max(0);
    let y1 = rect.bottom().min(buffer.height() as i32);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let (x0, x1) = (x0 as usize, x1 as usize);
    for y in y0..y1 {
        buffer.row_mut(y as usize)[x0..x1].fill(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelToken;
    use crate::layout::compute_layout;
    use crate::options::RenderOptions;
    use crate::tree::aggregate;
    use crate::tree::arena::FileTree;

    const MARK: Rgb = Rgb::new(255, 255, 0);

    fn laid_out_pair() -> (FileTree, Layout) {
        let mut tree = FileTree::new("root");
        tree.add_leaf(tree.root, "a.txt", 60, 2);
        tree.add_leaf(tree.root, "b.bin", 40, 5);
        aggregate::aggregate_sizes(&mut tree);
        aggregate::sort_children_by_size(&mut tree);
        let layout = compute_layout(
            &tree,
            tree.root,
            PixRect::new(0, 0, 40, 20),
            &RenderOptions::default(),
            &CancelToken::new(),
        )
        .unwrap();
        (tree, layout)
    }

    fn find_leaf(tree: &FileTree, category: u16) -> NodeId {
        (0..tree.len() as u32)
            .map(NodeId)
            .find(|&id| tree.get(id).category() == Some(category))
            .unwrap()
    }

    #[test]
    fn selection_draws_hollow_frame() {
        let (tree, layout) = laid_out_pair();
        let node = find_leaf(&tree, 2);
        let rect = layout.rect_of(node).unwrap();
        assert!(rect.width >= MIN_FRAME_SIZE && rect.height >= MIN_FRAME_SIZE);

        let mut buffer = PixelBuffer::new(40, 20);
        draw_selection(&mut buffer, &layout, &[node], MARK);

        let mark = MARK.opaque();
        // Corners of the rect are border.
        assert_eq!(buffer.get(rect.left as u32, rect.top as u32), mark);
        assert_eq!(
            buffer.get((rect.right() - 1) as u32, (rect.bottom() - 1) as u32),
            mark
        );
        // The center stays transparent.
        let cx = (rect.left + rect.width / 2) as u32;
        let cy = (rect.top + rect.height / 2) as u32;
        assert_eq!(buffer.get(cx, cy), Rgba::TRANSPARENT);
        // So does everything outside the rect.
        assert_eq!(buffer.get(rect.right() as u32, rect.top as u32), Rgba::TRANSPARENT);
    }

    #[test]
    fn tiny_rectangles_fill_solid() {
        let mut buffer = PixelBuffer::new(10, 10);
        render_mark(&mut buffer, PixRect::new(2, 2, 5, 5), MARK.opaque());
        for y in 2..7 {
            for x in 2..7 {
                assert_eq!(buffer.get(x, y), MARK.opaque());
            }
        }
        assert_eq!(buffer.get(1, 1), Rgba::TRANSPARENT);
    }

    #[test]
    fn single_pixel_rect_is_one_opaque_pixel() {
        let mut buffer = PixelBuffer::new(4, 4);
        render_mark(&mut buffer, PixRect::new(1, 1, 1, 1), MARK.opaque());
        assert_eq!(buffer.get(1, 1), MARK.opaque());
        assert_eq!(
            buffer.pixels().iter().filter(|&&p| p == MARK.opaque()).count(),
            1
        );
    }

    #[test]
    fn category_mode_marks_only_matching_leaves() {
        let (tree, layout) = laid_out_pair();
        let mut buffer = PixelBuffer::new(40, 20);
        draw_category(&mut buffer, &layout, &tree, 5, MARK);

        let matching = layout.rect_of(find_leaf(&tree, 5)).unwrap();
        let other = layout.rect_of(find_leaf(&tree, 2)).unwrap();
        assert_eq!(
            buffer.get(matching.left as u32, matching.top as u32),
            MARK.opaque()
        );
        // Center of the non-matching leaf is untouched.
        let cx = (other.left + other.width / 2) as u32;
        let cy = (other.top + other.height / 2) as u32;
        assert_eq!(buffer.get(cx, cy), Rgba::TRANSPARENT);
    }

    #[test]
    fn zero_area_rectangles_are_skipped() {
        let mut buffer = PixelBuffer::new(4, 4);
        render_mark(&mut buffer, PixRect::new(2, 2, 0, 5), MARK.opaque());
        assert!(buffer.pixels().iter().all(|&p| p == Rgba::TRANSPARENT));
    }
}
