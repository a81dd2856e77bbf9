/// Diagnostic tool to verify the tree → layout → raster pipeline
use cushionmap::cancel::CancelToken;
use cushionmap::hit::find_node_at;
use cushionmap::layout::{compute_layout, PixRect};
use cushionmap::options::{RenderOptions, TreemapStyle};
use cushionmap::render::colors::Palette;
use cushionmap::render::cushion::{self, BACKGROUND};
use cushionmap::render::highlight;
use cushionmap::render::pixels::PixelBuffer;
use cushionmap::tree::aggregate;
use cushionmap::tree::arena::{FileTree, NodeId};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cushionmap=debug".parse().unwrap()),
        )
        .init();

    let (width, height) = (1920i32, 1080i32);

    println!("=== DIAGNOSTIC: Tree → Layout → Raster Pipeline ===");

    // Build a synthetic tree (deterministic, no filesystem access)
    let tree = synthetic_tree(4, 6);
    println!("\n[1] Tree built: {} nodes", tree.len());

    let root_node = tree.get(tree.root);
    println!(
        "    Root: '{}' (size={:.2} MB)",
        root_node.name,
        root_node.size as f64 / 1_048_576.0
    );

    for style in [TreemapStyle::KDirStat, TreemapStyle::SequoiaView] {
        let options = RenderOptions {
            style,
            ..Default::default()
        };
        let cancel = CancelToken::new();
        let layout = compute_layout(
            &tree,
            tree.root,
            PixRect::new(0, 0, width, height),
            &options,
            &cancel,
        )
        .expect("no cancellation in the diagnostic run");

        println!("\n[2] Layout ({style:?}): {} rectangles", layout.rects.len());

        // Coverage: leaf areas vs viewport
        let leaf_area: i64 = layout
            .rects
            .iter()
            .filter(|lr| tree.get(lr.node).is_leaf())
            .map(|lr| lr.rect.area())
            .sum();
        let viewport_area = (width as i64) * (height as i64);
        println!(
            "    Leaf coverage: {}px² of {}px² ({:.2}%)",
            leaf_area,
            viewport_area,
            leaf_area as f64 / viewport_area as f64 * 100.0
        );

        // Disjointness spot check among root children
        let child_rects: Vec<PixRect> = tree
            .children(tree.root)
            .filter_map(|c| layout.rect_of(c))
            .collect();
        let mut overlaps = 0;
        for (i, a) in child_rects.iter().enumerate() {
            for b in child_rects.iter().skip(i + 1) {
                if a.intersection(b).area() > 0 {
                    overlaps += 1;
                }
            }
        }
        println!("    Sibling overlaps at root: {overlaps}");

        // Rasterize
        let palette = Palette::default();
        let mut buffer = PixelBuffer::new(width as u32, height as u32);
        buffer.fill(BACKGROUND);
        let done = cushion::rasterize(&mut buffer, &layout, &tree, &palette, &options, &cancel);
        println!("\n[3] Rasterized: {} (cancelled={})", done, !done);

        let untouched = buffer.pixels().iter().filter(|&&p| p == BACKGROUND).count();
        println!(
            "    Background pixels remaining: {} ({:.3}%)",
            untouched,
            untouched as f64 / buffer.pixels().len() as f64 * 100.0
        );

        // Hit-test the viewport center
        let hit = find_node_at(&tree, &layout, tree.root, width / 2, height / 2);
        match hit {
            Some(id) => println!(
                "\n[4] Hit at center: '{}' (size={})",
                tree.get(id).name,
                tree.get(id).size
            ),
            None => println!("\n[4] Hit at center: none"),
        }

        // Highlight every leaf in category 0
        let mut overlay = PixelBuffer::new(width as u32, height as u32);
        highlight::draw_category(&mut overlay, &layout, &tree, 0, cushionmap::render::colors::Rgb::WHITE);
        let marked = overlay.pixels().iter().filter(|p| p.a == 255).count();
        println!("\n[5] Highlight overlay: {marked} opaque pixels");
    }

    Ok(())
}

/// Deterministic multi-level tree with uneven sizes, a few zero-size leaves
/// and an empty directory thrown in.
fn synthetic_tree(depth: u32, fanout: u32) -> FileTree {
    let mut tree = FileTree::new("synthetic");
    let mut seed = 0x2545F491u32;
    let mut next = move || {
        // xorshift, good enough for test data
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        seed
    };

    fn fill(
        tree: &mut FileTree,
        parent: NodeId,
        depth: u32,
        fanout: u32,
        next: &mut impl FnMut() -> u32,
    ) {
        for i in 0..fanout {
            if depth > 0 && next() % 3 == 0 {
                let dir = tree.add_dir(parent, &format!("dir{i}"));
                fill(tree, dir, depth - 1, fanout, next);
            } else {
                let size = match next() % 10 {
                    0 => 0,
                    n => (next() % 1_000_000) as u64 * n as u64,
                };
                let category = (next() % 8) as u16;
                tree.add_leaf(parent, &format!("file{i}"), size, category);
            }
        }
    }

    let root = tree.root;
    fill(&mut tree, root, depth, fanout, &mut next);
    tree.add_dir(root, "empty-dir");

    aggregate::aggregate_sizes(&mut tree);
    aggregate::sort_children_by_size(&mut tree);
    tree
}
