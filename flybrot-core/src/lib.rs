pub mod complex;
pub mod error;
pub mod escape;
pub mod navigation;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use escape::{escape, escape_with, EscapeParams, EscapeResult};
pub use navigation::{NavPhase, NavigationState, TickOutcome, ZoomButton, TICK_INTERVAL_MS};
pub use viewport::{Viewport, ZoomLimit};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
