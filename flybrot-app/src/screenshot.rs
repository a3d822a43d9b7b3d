//! Numbered screenshots: `image1.jpg`, `image2.jpg`, …
//!
//! Numbering continues after the highest index already present in the
//! output directory so earlier captures are never overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use flybrot_render::{export_png, ExportMetadata, Frame};

use crate::error::AppError;

const PREFIX: &str = "image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotFormat {
    #[default]
    Jpeg,
    /// PNG with the view embedded as text chunks.
    Png,
}

impl ScreenshotFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Next free index for `image{N}.{extension}` files in `dir`.
///
/// Files whose middle part is not a number are ignored.
pub fn next_capture_index(dir: &Path, extension: &str) -> std::io::Result<u32> {
    if !dir.exists() {
        return Ok(1);
    }
    let suffix = format!(".{extension}");
    let mut highest = 0;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let index = name
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.strip_suffix(&suffix))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(index) = index {
            highest = highest.max(index);
        }
    }
    Ok(highest + 1)
}

pub struct ScreenshotWriter {
    dir: PathBuf,
    format: ScreenshotFormat,
    next_index: u32,
}

impl ScreenshotWriter {
    pub fn new(dir: PathBuf, format: ScreenshotFormat) -> Result<Self, AppError> {
        let next_index = next_capture_index(&dir, format.extension())?;
        debug!(dir = %dir.display(), next_index, "Screenshot writer ready");
        Ok(Self {
            dir,
            format,
            next_index,
        })
    }

    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Write `frame` to the next numbered file and return its path.
    pub fn capture(&mut self, frame: &Frame, meta: &ExportMetadata) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!(
            "{PREFIX}{}.{}",
            self.next_index,
            self.format.extension()
        ));

        match self.format {
            ScreenshotFormat::Png => export_png(frame, &path, meta)?,
            ScreenshotFormat::Jpeg => {
                let raster = &frame.raster;
                let img = image::RgbImage::from_raw(raster.width, raster.height, raster.pixels.clone())
                    .ok_or_else(|| {
                        AppError::Config(format!(
                            "raster {}×{} does not match its pixel buffer",
                            raster.width, raster.height
                        ))
                    })?;
                img.save_with_format(&path, image::ImageFormat::Jpeg)?;
            }
        }

        info!("Saved screenshot {}", path.display());
        self.next_index += 1;
        Ok(path)
    }
}
