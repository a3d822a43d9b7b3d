use thiserror::Error;

/// Errors originating from the core engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be >= 1)")]
    InvalidMaxIterations(u32),

    #[error("invalid bailout radius: {0} (must be finite and > 1.0)")]
    InvalidBailoutRadius(f64),

    #[error("degenerate viewport: {reason}")]
    DegenerateViewport { reason: String },

    #[error("invalid canvas dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },
}
