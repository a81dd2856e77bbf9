use crate::render::pixels::Rgba;

/// Common brightness every palette is equalized to. The rasterizer divides
/// the per-render brightness option by this, so equalized colors at the
/// default options come out near their nominal intensity.
pub const PALETTE_BRIGHTNESS: f64 = 0.60;

/// Fixed-point RGB color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mean of the three channels, normalized to [0, 1].
    pub fn brightness(self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0 / 255.0
    }

    /// Scale the channels to the target brightness, redistributing any
    /// channel that overflows 255 into the other two.
    ///
    /// Black stays black: the scale factor is undefined at r+g+b = 0, so the
    /// input is returned unmodified.
    pub fn with_brightness(self, target: f64) -> Rgb {
        debug_assert!((0.0..=1.0).contains(&target));
        let sum = self.r as f64 + self.g as f64 + self.b as f64;
        if sum <= 0.0 {
            return self;
        }
        let factor = target * 3.0 * 255.0 / sum;
        normalize_channels(
            (self.r as f64 * factor) as i32,
            (self.g as f64 * factor) as i32,
            (self.b as f64 * factor) as i32,
        )
    }

    /// Convert to a fully opaque RGBA pixel.
    pub const fn opaque(self) -> Rgba {
        Rgba::new(self.r, self.g, self.b, 255)
    }
}

/// Clamp oversaturated channels while preserving total brightness as closely
/// as possible: an overflowing channel's excess is split evenly between the
/// other two, then any remaining overflow saturates.
pub(crate) fn normalize_channels(mut red: i32, mut green: i32, mut blue: i32) -> Rgb {
    debug_assert!(red >= 0 && green >= 0 && blue >= 0);
    if red > 255 {
        distribute_first(&mut red, &mut green, &mut blue);
    } else if green > 255 {
        distribute_first(&mut green, &mut red, &mut blue);
    } else if blue > 255 {
        distribute_first(&mut blue, &mut red, &mut green);
    }
    Rgb::new(
        red.clamp(0, 255) as u8,
        green.clamp(0, 255) as u8,
        blue.clamp(0, 255) as u8,
    )
}

fn distribute_first(first: &mut i32, second: &mut i32, third: &mut i32) {
    let excess = (*first - 255) / 2;
    *first = 255;
    *second += excess;
    *third += excess;
    if *second > 255 {
        *third += *second - 255;
        *second = 255;
    } else if *third > 255 {
        *second += *third - 255;
        *third = 255;
    }
}

/// Ordered leaf color palette. Leaves pick their color by category index,
/// wrapping around when there are more categories than palette entries.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Equalize the given colors to [`PALETTE_BRIGHTNESS`].
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self::with_brightness(colors, PALETTE_BRIGHTNESS)
    }

    /// Equalize the given colors to a custom target brightness.
    /// Done once per palette change, not per frame.
    pub fn with_brightness(colors: Vec<Rgb>, target: f64) -> Self {
        debug_assert!(!colors.is_empty(), "palette must have at least one color");
        Self {
            colors: colors
                .into_iter()
                .map(|c| c.with_brightness(target))
                .collect(),
        }
    }

    pub fn color_for(&self, category: u16) -> Rgb {
        self.colors[category as usize % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    /// The thirteen classic cushion colors.
    fn default() -> Self {
        Self::new(vec![
            Rgb::new(0, 0, 255),
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 255, 255),
            Rgb::new(255, 0, 255),
            Rgb::new(255, 255, 0),
            Rgb::new(150, 150, 255),
            Rgb::new(255, 150, 150),
            Rgb::new(150, 255, 150),
            Rgb::new(150, 255, 255),
            Rgb::new(255, 150, 255),
            Rgb::new(255, 255, 150),
            Rgb::new(255, 255, 255),
        ])
    }
}
