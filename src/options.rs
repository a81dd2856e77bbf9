use crate::render::colors::Rgb;

/// Which packing algorithm partitions a directory's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreemapStyle {
    /// Row-based greedy packing with a minimum-proportion cutoff.
    KDirStat,
    /// Squarified packing (Bruls, Huizing, van Wijk): rows grow while the
    /// worst aspect ratio improves.
    SequoiaView,
}

/// Per-render options. Supplied fresh for each render pass; never mutated by
/// the engine.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub style: TreemapStyle,
    /// Draw one-pixel grid lines between items.
    pub grid: bool,
    pub grid_color: Rgb,
    /// Overall image brightness, 0..=1.
    pub brightness: f64,
    /// Cushion ridge height, 0..=1. Zero disables shading entirely (flat fill).
    pub height_factor: f64,
    /// Per-level decay of the ridge height, 0..=1. Smaller values flatten
    /// deep nesting faster.
    pub scale_factor: f64,
    /// Ambient light fraction, 0..=1; the rest is directional.
    pub ambient_light: f64,
    /// Light source direction, each component in -4..=4. Negative x lights
    /// from the left, negative y from the top.
    pub light_source_x: f64,
    pub light_source_y: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: TreemapStyle::KDirStat,
            grid: false,
            grid_color: Rgb::BLACK,
            brightness: 0.88,
            height_factor: 0.38,
            scale_factor: 0.91,
            ambient_light: 0.13,
            light_source_x: -1.0,
            light_source_y: -1.0,
        }
    }
}

impl RenderOptions {
    pub fn is_cushion_shading(&self) -> bool {
        self.height_factor > 0.0
    }

    /// Normalized light direction. The z component is fixed at 10 so the
    /// light always comes from well above the surface.
    pub fn light_vector(&self) -> [f64; 3] {
        let (lx, ly, lz) = (self.light_source_x, self.light_source_y, 10.0);
        let len = (lx * lx + ly * ly + lz * lz).sqrt();
        [lx / len, ly / len, lz / len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_vector_is_normalized() {
        let options = RenderOptions {
            light_source_x: 3.0,
            light_source_y: -2.5,
            ..Default::default()
        };
        let [x, y, z] = options.light_vector();
        let len = (x * x + y * y + z * z).sqrt();
        assert!((len - 1.0).abs() < 1e-9);
        assert!(z > 0.9); // z dominates: (3, -2.5, 10)
    }

    #[test]
    fn zero_height_disables_shading() {
        let options = RenderOptions {
            height_factor: 0.0,
            ..Default::default()
        };
        assert!(!options.is_cushion_shading());
        assert!(RenderOptions::default().is_cushion_shading());
    }
}
