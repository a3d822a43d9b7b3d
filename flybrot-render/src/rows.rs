use flybrot_core::{escape_with, Complex, EscapeParams, Viewport};

use crate::palette::{color_for, Palette};
use crate::raster::{put_pixel, BYTES_PER_PIXEL};

/// One independent unit of render work: a full row of the raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowJob {
    /// Pixel row this job fills.
    pub y: u32,
    /// Complex coordinate of the row's first pixel.
    pub origin: Complex,
    /// Real-axis distance between neighbouring pixels.
    pub x_step: f64,
    /// Pixels in the row.
    pub width: u32,
}

/// Split a `width × height` canvas into one job per row.
pub fn build_row_jobs(viewport: &Viewport, width: u32, height: u32) -> Vec<RowJob> {
    let x_step = viewport.x_step(width);
    (0..height)
        .map(|y| RowJob {
            y,
            origin: viewport.pixel_to_complex(0.0, y as f64, width, height),
            x_step,
            width,
        })
        .collect()
}

/// Compute and color every pixel of `job` into `out`.
///
/// `out` must be exactly one raster row. The real coordinate is stepped
/// along the row rather than recomputed per pixel.
pub fn render_row(
    job: &RowJob,
    palette: &Palette,
    params: &EscapeParams,
    out: &mut [u8],
) -> crate::Result<()> {
    debug_assert_eq!(out.len(), job.width as usize * BYTES_PER_PIXEL);
    let mut c = job.origin;
    for px in 0..job.width as usize {
        let result = escape_with(c, params);
        put_pixel(out, px, color_for(&result, palette, params)?);
        c.re += job.x_step;
    }
    Ok(())
}
