//! CPU rasterizer for the cushion treemap.
//!
//! Walks the rectangles produced by the layout pass and fills every leaf
//! with its palette color, shaded by the accumulated cushion surface. Pixels
//! outside leaf rectangles keep whatever value the buffer already holds;
//! the caller decides the background (and pre-fills with the grid color when
//! grid lines are on).

use crate::cancel::CancelToken;
use crate::layout::Layout;
use crate::options::RenderOptions;
use crate::render::colors::{self, Palette};
use crate::render::pixels::{PixelBuffer, Rgba};
use crate::tree::arena::{FileTree, NodeKind};

/// Dark neutral background behind the treemap (visible only where the
/// layout leaves gaps, e.g. an empty tree).
pub const BACKGROUND: Rgba = Rgba::new(20, 22, 28, 255);

/// Rasterize all leaves of `layout` into `buffer`.
///
/// Each pixel's brightness comes from Lambertian reflectance of the cushion
/// surface accumulated during layout; with `height_factor == 0` leaves are
/// filled with their flat color instead. Returns `false` if the pass was
/// cancelled mid-way (the buffer contents are then unspecified and must not
/// be published).
pub fn rasterize(
    buffer: &mut PixelBuffer,
    layout: &Layout,
    tree: &FileTree,
    palette: &Palette,
    options: &RenderOptions,
    cancel: &CancelToken,
) -> bool {
    let [lx, ly, lz] = options.light_vector();
    let ambient = options.ambient_light;
    let diffuse = 1.0 - ambient;
    let brightness_scale = options.brightness / colors::PALETTE_BRIGHTNESS;

    let buf_w = buffer.width() as i32;
    let buf_h = buffer.height() as i32;

    for lr in &layout.rects {
        if cancel.is_cancelled() {
            return false;
        }

        let node = tree.get(lr.node);
        let NodeKind::Leaf { category } = node.kind else {
            continue;
        };

        let mut rect = lr.rect;
        if options.grid {
            // One-pixel inset at top and left lets the grid color show
            // through between neighbors.
            rect.left += 1;
            rect.top += 1;
            rect.width -= 1;
            rect.height -= 1;
        }
        if rect.is_empty() {
            continue;
        }

        // Clip to the buffer.
        let x0 = rect.left.max(0);
        let x1 = rect.right().min(buf_w);
        let y0 = rect.top.max(0);
        let y1 = rect.bottom().min(buf_h);
        if x0 >= x1 || y0 >= y1 {
            continue;
        }
        let (x0, x1) = (x0 as usize, x1 as usize);

        let base = palette.color_for(category);

        if !options.is_cushion_shading() {
            let flat = base.opaque();
            for y in y0..y1 {
                buffer.row_mut(y as usize)[x0..x1].fill(flat);
            }
            continue;
        }

        let [sx_lin, sx_quad, sy_lin, sy_quad] = lr.surface;
        let base_r = base.r as f64;
        let base_g = base.g as f64;
        let base_b = base.b as f64;

        for y in y0..y1 {
            let fy = y as f64 + 0.5;
            let ny = -(2.0 * sy_quad * fy + sy_lin);
            let row = buffer.row_mut(y as usize);
            for (x, px) in row[x0..x1].iter_mut().enumerate() {
                let fx = (x0 + x) as f64 + 0.5;
                // Surface normal from the accumulated parabolic
                // coefficients; nz = 1 implicitly.
                let nx = -(2.0 * sx_quad * fx + sx_lin);
                let cos_theta =
                    (nx * lx + ny * ly + lz) / (nx * nx + ny * ny + 1.0).sqrt();
                let mut intensity = diffuse * cos_theta.min(1.0);
                if intensity < 0.0 {
                    intensity = 0.0;
                }
                intensity += ambient;
                intensity *= brightness_scale;

                let shaded = colors::normalize_channels(
                    (base_r * intensity) as i32,
                    (base_g * intensity) as i32,
                    (base_b * intensity) as i32,
                );
                *px = shaded.opaque();
            }
        }
    }

    true
}
