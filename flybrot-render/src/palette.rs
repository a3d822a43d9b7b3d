use rand::Rng;
use serde::{Deserialize, Serialize};

use flybrot_core::{EscapeParams, EscapeResult};

use crate::error::RenderError;

/// Number of entries in a generated palette.
pub const PALETTE_SIZE: usize = 128;

/// Divisor applied to the smooth iteration count before palette lookup.
///
/// Larger values stretch each palette band over more iterations. Chosen by
/// eye; nothing depends on the exact value.
pub const COLOR_SPREAD: f64 = 16.0;

// ---------------------------------------------------------------------------
// Colors and packing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Byte order used when packing a color into a 32-bit display word.
///
/// The raster itself always stores R, G, B; packing only matters to the
/// surface that displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// `0x00RRGGBB`.
    #[default]
    Rgb,
    /// `0x00BBGGRR`, for surfaces whose masks put red in the low byte.
    Bgr,
}

impl PixelFormat {
    #[inline]
    pub fn pack(self, c: Rgb) -> u32 {
        let (r, g, b) = (c.r as u32, c.g as u32, c.b as u32);
        match self {
            Self::Rgb => r << 16 | g << 8 | b,
            Self::Bgr => b << 16 | g << 8 | r,
        }
    }
}

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// A ring of colors sampled by smooth iteration count.
///
/// `version` increases every time the colors are replaced so a frame can
/// record which palette produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
    version: u64,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> crate::Result<Self> {
        if colors.is_empty() {
            return Err(RenderError::EmptyPalette);
        }
        Ok(Self { colors, version: 0 })
    }

    /// [`PALETTE_SIZE`] independent random colors.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            colors: random_colors(rng),
            version: 0,
        }
    }

    /// Replace every entry with a fresh random color and bump the version.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.colors = random_colors(rng);
        self.version += 1;
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Color at fractional position `t`, wrapping around the ring.
    ///
    /// `floor(t)` selects the entry and the fractional part blends towards
    /// the next one.
    pub fn sample(&self, t: f64) -> crate::Result<Rgb> {
        let whole = t.floor();
        let frac = t - whole;
        let len = self.colors.len() as i64;
        let lo = (whole as i64).rem_euclid(len) as usize;
        let hi = (lo + 1) % self.colors.len();
        blend(self.colors[lo], self.colors[hi], frac)
    }
}

fn random_colors<R: Rng + ?Sized>(rng: &mut R) -> Vec<Rgb> {
    (0..PALETTE_SIZE)
        .map(|_| Rgb::new(rng.gen_range(0..255), rng.gen_range(0..255), rng.gen_range(0..255)))
        .collect()
}

// ---------------------------------------------------------------------------
// Smooth coloring
// ---------------------------------------------------------------------------

/// Linear blend from `a` (ratio 0) to `b` (ratio 1), truncating each channel.
pub fn blend(a: Rgb, b: Rgb, ratio: f64) -> crate::Result<Rgb> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(RenderError::InvalidBlendRatio(ratio));
    }
    let channel = |a: u8, b: u8| -> u8 {
        let (a, b) = (a as i32, b as i32);
        (a - ((a - b) as f64 * ratio) as i32) as u8
    };
    Ok(Rgb::new(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b)))
}

/// Normalized iteration count `n + 1 − ln(ln|z|) / ln(R)`, divided by
/// [`COLOR_SPREAD`]. `None` for interior points.
pub fn normalized_iteration(result: &EscapeResult, params: &EscapeParams) -> Option<f64> {
    if result.is_interior(params) {
        return None;
    }
    let mu = result.iterations as f64 + 1.0
        - result.modulus().ln().ln() / params.bailout_radius.ln();
    Some(mu / COLOR_SPREAD)
}

/// Map an escape result to its display color. Interior points are black.
pub fn color_for(
    result: &EscapeResult,
    palette: &Palette,
    params: &EscapeParams,
) -> crate::Result<Rgb> {
    match normalized_iteration(result, params) {
        None => Ok(Rgb::BLACK),
        Some(mu) => palette.sample(mu),
    }
}
