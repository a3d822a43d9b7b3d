use crate::palette::{PixelFormat, Rgb};

/// Bytes per pixel in a [`Raster`].
pub const BYTES_PER_PIXEL: usize = 3;

/// A 24-bit RGB image, row-major, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    /// Bytes in one row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = y as usize * self.stride() + x as usize * BYTES_PER_PIXEL;
        Rgb::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.pixels[start..start + self.stride()]
    }

    /// Pack every pixel into a 32-bit word for a display surface.
    pub fn packed(&self, format: PixelFormat) -> Vec<u32> {
        self.pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| format.pack(Rgb::new(px[0], px[1], px[2])))
            .collect()
    }
}

/// Write `color` into pixel `x` of a row slice.
#[inline]
pub(crate) fn put_pixel(row: &mut [u8], x: usize, color: Rgb) {
    let i = x * BYTES_PER_PIXEL;
    row[i] = color.r;
    row[i + 1] = color.g;
    row[i + 2] = color.b;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_raster_is_black() {
        let r = Raster::new(4, 3);
        assert_eq!(r.pixels.len(), 4 * 3 * 3);
        assert_eq!(r.stride(), 12);
        assert!(r.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn put_pixel_writes_correct_region() {
        let mut r = Raster::new(5, 2);
        let stride = r.stride();
        let row1 = &mut r.pixels[stride..2 * stride];
        put_pixel(row1, 3, Rgb::new(1, 2, 3));

        assert_eq!(r.pixel(3, 1), Rgb::new(1, 2, 3));
        assert_eq!(r.pixel(3, 0), Rgb::BLACK);
        assert_eq!(r.row(1)[9..12], [1, 2, 3]);
    }

    #[test]
    fn packed_respects_format() {
        let mut r = Raster::new(1, 1);
        put_pixel(&mut r.pixels, 0, Rgb::new(0xAA, 0xBB, 0xCC));
        assert_eq!(r.packed(PixelFormat::Rgb), vec![0x00AA_BBCC]);
        assert_eq!(r.packed(PixelFormat::Bgr), vec![0x00CC_BBAA]);
    }
}
