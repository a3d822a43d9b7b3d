use crate::complex::Complex;
use crate::error::CoreError;

/// The orbit of a single point after the escape loop stops.
///
/// Smooth coloring needs the final iterate as well as the count, so both are
/// kept; the renderer turns this into a color straight away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeResult {
    pub final_re: f64,
    pub final_im: f64,
    /// Iterations performed, `0..=max_iterations`.
    pub iterations: u32,
}

impl EscapeResult {
    /// `|z|` of the final iterate.
    #[inline]
    pub fn modulus(&self) -> f64 {
        Complex::new(self.final_re, self.final_im).norm()
    }

    /// `true` if the orbit never left the bailout disc.
    #[inline]
    pub fn is_interior(&self, params: &EscapeParams) -> bool {
        self.iterations >= params.max_iterations
    }
}

/// Parameters controlling the escape loop.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EscapeParams {
    /// Iteration cap; points reaching it are treated as inside the set.
    pub max_iterations: u32,

    /// Orbits with `|z|` beyond this radius have escaped.
    pub bailout_radius: f64,
}

impl EscapeParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 1024;
    pub const DEFAULT_BAILOUT_RADIUS: f64 = 2.0;

    pub fn new(max_iterations: u32, bailout_radius: f64) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        // ln(ln|z|) / ln(R) needs escaped orbits to sit strictly outside the unit circle.
        if bailout_radius <= 1.0 || !bailout_radius.is_finite() {
            return Err(CoreError::InvalidBailoutRadius(bailout_radius));
        }
        Ok(Self {
            max_iterations,
            bailout_radius,
        })
    }

    #[inline]
    pub fn bailout_sq(&self) -> f64 {
        self.bailout_radius * self.bailout_radius
    }
}

impl Default for EscapeParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            bailout_radius: Self::DEFAULT_BAILOUT_RADIUS,
        }
    }
}

/// Run the escape loop for `c` with the default parameters.
#[inline]
pub fn escape(c: Complex) -> EscapeResult {
    escape_with(c, &EscapeParams::default())
}

/// Iterate `z ← z² + c` until `|z|` leaves the bailout disc or the cap is hit.
///
/// The orbit starts at `z = c` rather than `z = 0`, so every count is one
/// lower than the textbook formulation and `|c| > R` returns 0.
pub fn escape_with(c: Complex, params: &EscapeParams) -> EscapeResult {
    let bailout_sq = params.bailout_sq();
    let max_iter = params.max_iterations;

    let mut z = c;
    let mut iterations = 0;
    while z.norm_sq() <= bailout_sq && iterations < max_iter {
        z = z.square() + c;
        iterations += 1;
    }

    EscapeResult {
        final_re: z.re,
        final_im: z.im,
        iterations,
    }
}
