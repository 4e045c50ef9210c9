//! Grayscale intensity grid

use image::DynamicImage;

use crate::perceptual_hash::HashError;

/// Square single-channel intensity grid, input to the hashing pipeline
pub struct LumaGrid {
    /// Grid side in pixels
    size: usize,
    /// Row-major luma samples
    pixels: Vec<u8>,
}

impl LumaGrid {
    /// Build a grid by grayscale-reducing and resizing a decoded image
    #[must_use]
    pub fn from_image(img: &DynamicImage, size: usize) -> Self {
        #[expect(clippy::cast_possible_truncation)]
        let side = size as u32;
        let resized = img
            .grayscale()
            .resize_exact(side, side, image::imageops::FilterType::Triangle)
            .into_luma8();
        Self {
            size,
            pixels: resized.into_raw(),
        }
    }

    /// Build a grid from raw row-major luma samples
    pub fn from_raw(size: usize, pixels: Vec<u8>) -> Result<Self, HashError> {
        if pixels.len() != size * size {
            return Err(HashError::PixelCount {
                len: pixels.len(),
                size,
            });
        }
        Ok(Self { size, pixels })
    }

    /// Grid side in pixels
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Iterate over pixel rows
    pub(crate) fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(self.size)
    }

    /// Mean luma value over the whole grid
    pub(crate) fn mean(&self) -> f64 {
        #[expect(clippy::cast_precision_loss)]
        let count = self.pixels.len() as f64;
        self.pixels.iter().copied().map(f64::from).sum::<f64>() / count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_grid_pixel_count_is_checked() {
        assert!(LumaGrid::from_raw(32, vec![0; 32 * 32]).is_ok());
        assert!(matches!(
            LumaGrid::from_raw(32, vec![0; 32 * 32 - 1]),
            Err(HashError::PixelCount { len: 1023, size: 32 })
        ));
        assert!(LumaGrid::from_raw(16, vec![0; 32 * 32]).is_err());
    }

    #[test]
    fn image_reduces_to_requested_side() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_fn(640, 480, |x, y| {
            image::Rgb([u8::try_from(x % 256).unwrap(), u8::try_from(y % 256).unwrap(), 0])
        }));
        let grid = LumaGrid::from_image(&img, 32);
        assert_eq!(grid.size(), 32);
        assert_eq!(grid.rows().count(), 32);
        assert!(grid.rows().all(|row| row.len() == 32));
    }

    #[test]
    #[expect(clippy::float_cmp)]
    fn mean_of_uniform_grid_is_exact() {
        // Pixel sums are exact integers and the divisor is a power of two
        let grid = LumaGrid::from_raw(32, vec![77; 32 * 32]).unwrap();
        assert_eq!(grid.mean(), 77.0);
    }
}
