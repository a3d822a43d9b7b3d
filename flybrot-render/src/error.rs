use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid blend ratio: {0} (must be within 0.0..=1.0)")]
    InvalidBlendRatio(f64),

    #[error("palette must contain at least one color")]
    EmptyPalette,

    #[error("invalid image dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("row {row} failed: {reason}")]
    RenderTaskFailure { row: u32, reason: String },

    #[error("failed to build render pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),

    #[error("export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Core(#[from] flybrot_core::CoreError),
}
