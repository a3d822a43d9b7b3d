//! PNG export with embedded view metadata (tEXt chunks).

use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use crate::error::RenderError;
use crate::renderer::Frame;

/// Navigation context stored alongside the pixels.
pub struct ExportMetadata {
    pub velocity: f64,
    pub max_iterations: u32,
}

/// Write a frame as an RGB PNG with its viewport and speed embedded.
///
/// Uses the `png` crate directly so custom tEXt chunks can be added.
pub fn export_png(frame: &Frame, path: &Path, metadata: &ExportMetadata) -> crate::Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| RenderError::Export(format!("failed to create {}: {e}", path.display())))?;
    let writer = BufWriter::new(file);

    let raster = &frame.raster;
    let mut encoder = png::Encoder::new(writer, raster.width, raster.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    for (key, value) in build_metadata_pairs(frame, metadata) {
        encoder
            .add_text_chunk(key.clone(), value)
            .map_err(|e| RenderError::Export(format!("failed to add text chunk '{key}': {e}")))?;
    }

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| RenderError::Export(format!("failed to write PNG header: {e}")))?;
    png_writer
        .write_image_data(&raster.pixels)
        .map_err(|e| RenderError::Export(format!("failed to write PNG image data: {e}")))?;

    debug!(
        width = raster.width,
        height = raster.height,
        path = %path.display(),
        "Exported PNG"
    );
    Ok(())
}

fn build_metadata_pairs(frame: &Frame, meta: &ExportMetadata) -> Vec<(String, String)> {
    let vp = &frame.viewport;
    vec![
        ("Software".into(), "Flybrot".into()),
        (
            "Description".into(),
            format!(
                "Mandelbrot [{},{}] to [{},{}], speed {:.2}",
                vp.start_x, vp.start_y, vp.end_x, vp.end_y, meta.velocity
            ),
        ),
        ("Flybrot.StartX".into(), vp.start_x.to_string()),
        ("Flybrot.EndX".into(), vp.end_x.to_string()),
        ("Flybrot.StartY".into(), vp.start_y.to_string()),
        ("Flybrot.EndY".into(), vp.end_y.to_string()),
        ("Flybrot.Velocity".into(), format!("{:.2}", meta.velocity)),
        ("Flybrot.MaxIterations".into(), meta.max_iterations.to_string()),
        ("Flybrot.PaletteVersion".into(), frame.palette_version.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use flybrot_core::Viewport;
    use std::time::Duration;

    fn frame(width: u32, height: u32) -> Frame {
        let mut raster = Raster::new(width, height);
        raster.pixels.fill(128);
        Frame {
            raster,
            viewport: Viewport::default(),
            palette_version: 3,
            elapsed: Duration::from_millis(1),
            rows_rendered: height as usize,
            pixels_written: (width * height) as usize,
        }
    }

    #[test]
    fn export_embeds_text_chunks() {
        let dir = std::env::temp_dir().join("flybrot_test_export_meta");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("meta.png");
        let meta = ExportMetadata {
            velocity: 1.5,
            max_iterations: 1024,
        };
        export_png(&frame(4, 3), &path, &meta).expect("export should succeed");

        let decoder = png::Decoder::new(std::fs::File::open(&path).expect("file should exist"));
        let reader = decoder.read_info().expect("should read info");
        let info = reader.info();
        assert_eq!((info.width, info.height), (4, 3));
        assert_eq!(info.color_type, png::ColorType::Rgb);

        let texts = &info.uncompressed_latin1_text;
        assert!(texts.iter().any(|t| t.keyword == "Software" && t.text == "Flybrot"));
        assert!(texts.iter().any(|t| t.keyword == "Flybrot.StartX" && t.text == "-2"));
        assert!(texts.iter().any(|t| t.keyword == "Flybrot.Velocity" && t.text == "1.50"));
        assert!(texts.iter().any(|t| t.keyword == "Flybrot.PaletteVersion" && t.text == "3"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn export_to_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("flybrot_no_such_dir")
            .join("nested")
            .join("x.png");
        let meta = ExportMetadata {
            velocity: 0.0,
            max_iterations: 1,
        };
        assert!(matches!(
            export_png(&frame(2, 2), &path, &meta),
            Err(RenderError::Export(_))
        ));
    }
}
