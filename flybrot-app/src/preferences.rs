use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use flybrot_core::{EscapeParams, Viewport, TICK_INTERVAL_MS};
use flybrot_render::EngineConfig;

use crate::error::AppError;
use crate::screenshot::ScreenshotFormat;
use crate::script::{FlightAction, PointerButton, TimedEvent};

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_bailout_radius")]
    pub bailout_radius: f64,
    /// Render worker threads; 0 uses every available core.
    #[serde(default)]
    pub threads: usize,
    /// Fixed seed for reproducible palettes. Random when absent.
    #[serde(default)]
    pub palette_seed: Option<u64>,
    /// Where screenshots go. When empty, an `images/` folder next to the executable is used.
    #[serde(default)]
    pub screenshot_dir: String,
    #[serde(default)]
    pub screenshot_format: ScreenshotFormat,
    /// Capture every Nth rendered frame; 0 captures only on request.
    #[serde(default)]
    pub screenshot_every: u32,
    #[serde(default)]
    pub initial_view: Option<Viewport>,
    /// Simulated run length. The run always lasts at least until the last scripted event.
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_script")]
    pub script: Vec<TimedEvent>,
}

fn default_width() -> u32 {
    600
}
fn default_height() -> u32 {
    400
}
fn default_tick_interval_ms() -> u64 {
    TICK_INTERVAL_MS
}
fn default_max_iterations() -> u32 {
    EscapeParams::DEFAULT_MAX_ITERATIONS
}
fn default_bailout_radius() -> f64 {
    EscapeParams::DEFAULT_BAILOUT_RADIUS
}
fn default_duration_ms() -> u64 {
    4000
}

/// Dive into the seahorse valley for three seconds, then coast and capture.
fn default_script() -> Vec<TimedEvent> {
    vec![
        TimedEvent::new(0, FlightAction::Move { x: 250, y: 220 }),
        TimedEvent::new(
            0,
            FlightAction::Press {
                button: PointerButton::Left,
            },
        ),
        TimedEvent::new(
            3000,
            FlightAction::Release {
                button: PointerButton::Left,
            },
        ),
        TimedEvent::new(3500, FlightAction::Screenshot),
    ]
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            tick_interval_ms: default_tick_interval_ms(),
            max_iterations: default_max_iterations(),
            bailout_radius: default_bailout_radius(),
            threads: 0,
            palette_seed: None,
            screenshot_dir: String::new(),
            screenshot_format: ScreenshotFormat::default(),
            screenshot_every: 0,
            initial_view: None,
            duration_ms: default_duration_ms(),
            script: default_script(),
        }
    }
}

impl Preferences {
    /// Load preferences from `path` (or the default location), falling back to defaults.
    ///
    /// A missing default file is created so it can be edited for the next run.
    pub fn load(path: Option<&Path>) -> Self {
        let explicit = path.is_some();
        let path = path.map_or_else(config_path, Path::to_path_buf);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(json) => match serde_json::from_str::<Preferences>(&json) {
                    Ok(prefs) => {
                        info!("Loaded preferences from {}", path.display());
                        return prefs;
                    }
                    Err(e) => {
                        error!("Failed to parse preferences: {e}");
                    }
                },
                Err(e) => {
                    error!("Failed to read preferences file: {e}");
                }
            }
        } else {
            debug!("No preferences file at {}", path.display());
            if !explicit {
                Self::default().save(&path);
            }
        }
        Self::default()
    }

    /// Persist preferences to disk.
    pub fn save(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences to {}", path.display());
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }

    /// Validated engine settings.
    pub fn engine_config(&self) -> Result<EngineConfig, AppError> {
        if self.tick_interval_ms == 0 {
            return Err(AppError::Config("tick_interval_ms must be > 0".into()));
        }
        let escape = EscapeParams::new(self.max_iterations, self.bailout_radius)?;
        let initial_view = self.initial_view.unwrap_or_default();
        initial_view.validate()?;
        Ok(EngineConfig {
            width: self.width,
            height: self.height,
            threads: self.threads,
            escape,
            initial_view,
        })
    }

    pub fn screenshot_directory(&self) -> PathBuf {
        if self.screenshot_dir.is_empty() {
            exe_directory().join("images")
        } else {
            PathBuf::from(&self.screenshot_dir)
        }
    }
}

fn config_path() -> PathBuf {
    exe_directory().join("flybrot.json")
}

/// Folder holding the executable, so a standalone binary keeps its data
/// beside it. Falls back to the working directory.
fn exe_directory() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}
