use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;

/// Narrowest real-axis span the navigator will zoom into.
///
/// Below this the spacing between neighbouring pixels approaches the
/// resolution of `f64` and further zooming shows nothing new.
pub const MIN_SPAN: f64 = 0.000_000_000_000_4;

/// Widest real-axis span the navigator will zoom out to.
pub const MAX_SPAN: f64 = 6.0;

/// Which zoom bound a viewport has crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomLimit {
    /// Span fell below [`MIN_SPAN`]; no further zooming in.
    Floor,
    /// Span grew beyond [`MAX_SPAN`]; no further zooming out.
    Ceiling,
}

/// The visible rectangle of the complex plane.
///
/// Stored as explicit bounds rather than centre + scale: the fly-through
/// moves each edge independently towards the pointer. Pixel `(0, 0)` maps
/// to `(start_x, start_y)` and pixel y grows with the imaginary part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub start_x: f64,
    pub end_x: f64,
    pub start_y: f64,
    pub end_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            start_x: -2.0,
            end_x: 1.0,
            start_y: -1.0,
            end_y: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport with explicit bounds.
    pub fn new(start_x: f64, end_x: f64, start_y: f64, end_y: f64) -> crate::Result<Self> {
        let vp = Self {
            start_x,
            end_x,
            start_y,
            end_y,
        };
        vp.validate()?;
        Ok(vp)
    }

    /// Check that both spans are finite and strictly positive.
    pub fn validate(&self) -> crate::Result<()> {
        let spans = [
            ("real", self.start_x, self.end_x),
            ("imaginary", self.start_y, self.end_y),
        ];
        for (axis, start, end) in spans {
            if !start.is_finite() || !end.is_finite() {
                return Err(CoreError::DegenerateViewport {
                    reason: format!("{axis} bounds must be finite, got [{start}, {end}]"),
                });
            }
            if start >= end {
                return Err(CoreError::DegenerateViewport {
                    reason: format!("{axis} bounds must satisfy start < end, got [{start}, {end}]"),
                });
            }
        }
        Ok(())
    }

    /// Real-axis span.
    #[inline]
    pub fn width(&self) -> f64 {
        self.end_x - self.start_x
    }

    /// Imaginary-axis span.
    #[inline]
    pub fn height(&self) -> f64 {
        self.end_y - self.start_y
    }

    /// Map a pixel of a `width × height` canvas to the complex plane.
    #[inline]
    pub fn pixel_to_complex(&self, px: f64, py: f64, width: u32, height: u32) -> Complex {
        Complex::new(
            self.start_x + px * (self.end_x - self.start_x) / width as f64,
            self.start_y + py * (self.end_y - self.start_y) / height as f64,
        )
    }

    /// Complex-plane distance between horizontally adjacent pixels.
    #[inline]
    pub fn x_step(&self, width: u32) -> f64 {
        (self.end_x - self.start_x) / width as f64
    }

    /// `true` while the real span lies within `[MIN_SPAN, MAX_SPAN]`.
    pub fn zoom_bounds_ok(&self) -> bool {
        self.zoom_limit().is_none()
    }

    /// The zoom bound this viewport has crossed, if any.
    pub fn zoom_limit(&self) -> Option<ZoomLimit> {
        let span = self.width();
        if span < MIN_SPAN {
            Some(ZoomLimit::Floor)
        } else if span > MAX_SPAN {
            Some(ZoomLimit::Ceiling)
        } else {
            None
        }
    }

    /// Restore the default `[-2, 1] × [-1, 1]` rectangle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move every edge towards (positive `velocity`) or away from (negative)
    /// the complex point under pixel `(px, py)`.
    ///
    /// Each edge travels `(target - edge) / (100 / velocity)`, so repeated
    /// calls converge exponentially on the target. A step that would make a
    /// span zero or negative is rejected and the viewport is left untouched.
    pub fn recenter_towards(
        &mut self,
        px: f64,
        py: f64,
        width: u32,
        height: u32,
        velocity: f64,
    ) -> crate::Result<()> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        if velocity == 0.0 {
            return Ok(());
        }

        let target = self.pixel_to_complex(px, py, width, height);
        let divisor = 100.0 / velocity;

        let next = Self {
            start_x: self.start_x + (target.re - self.start_x) / divisor,
            end_x: self.end_x - (self.end_x - target.re) / divisor,
            start_y: self.start_y + (target.im - self.start_y) / divisor,
            end_y: self.end_y - (self.end_y - target.im) / divisor,
        };
        next.validate()?;
        *self = next;
        Ok(())
    }
}
