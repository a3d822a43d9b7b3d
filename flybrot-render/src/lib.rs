pub mod error;
pub mod export;
pub mod flythrough;
pub mod palette;
pub mod raster;
pub mod renderer;
pub mod rows;

pub use error::RenderError;
pub use export::{export_png, ExportMetadata};
pub use flythrough::{EngineConfig, FlyThrough, TickReport};
pub use palette::{
    blend, color_for, normalized_iteration, Palette, PixelFormat, Rgb, COLOR_SPREAD, PALETTE_SIZE,
};
pub use raster::Raster;
pub use renderer::{Frame, RenderPool};
pub use rows::{build_row_jobs, RowJob};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;
