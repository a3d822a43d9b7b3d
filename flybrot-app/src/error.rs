use thiserror::Error;

use flybrot_core::CoreError;
use flybrot_render::RenderError;

/// Errors surfaced by the headless driver.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
