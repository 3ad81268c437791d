// THEORY:
// A `PixelGrid` is one captured frame, frozen. It is a "dumb" data container in
// the same spirit as `Pixel`: width, height, and a row-major run of pixels. The
// pixels live behind an `Arc<[Pixel]>`, so a grid can be cloned into the worker
// context for free and nobody can mutate it mid-scan. The capture side pays for one
// copy when it builds the grid; everything downstream shares it.
//
// The constructor does not reject inconsistent dimensions. Grids come from the
// capture boundary, and the histogram pass is where a mismatch is caught and
// reported (`validate`).

use std::sync::Arc;

use crate::core_modules::pixel::pixel::{Byte, CHANNELS, Pixel};
use crate::error::{Error, Result};

/// An immutable, row-major grid of packed color values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Arc<[Pixel]>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Self {
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// A grid of zero pixels.
    pub fn empty() -> Self {
        Self::new(0, 0, Vec::new())
    }

    /// A `width`x`height` grid where every position holds `color`.
    ///
    /// # Panics
    ///
    /// If `width * height` overflows `usize`.
    pub fn filled(width: usize, height: usize, color: Pixel) -> Self {
        let Some(len) = width.checked_mul(height) else {
            panic!("{width}x{height} grid has more pixels than fit in usize");
        };
        Self::new(width, height, vec![color; len])
    }

    /// Adapts an RGBA8 frame buffer. The buffer must be exactly `4 * width * height` bytes.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[Byte]) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS));
        if expected != Some(bytes.len()) {
            return Err(Error::DimensionMismatch {
                width,
                height,
                len: bytes.len() / CHANNELS,
            });
        }

        let pixels: Vec<Pixel> = bytes
            .chunks_exact(CHANNELS)
            .map(|rgba| Pixel::new(rgba[0], rgba[1], rgba[2], rgba[3]))
            .collect();
        Ok(Self::new(width, height, pixels))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The declared pixel count, W·H. Saturates rather than overflowing.
    pub fn declared_len(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Checks that the declared dimensions describe the backing data exactly.
    pub fn validate(&self) -> Result<()> {
        let declared = self.width.checked_mul(self.height);
        if declared != Some(self.pixels.len()) {
            return Err(Error::DimensionMismatch {
                width: self.width,
                height: self.height,
                len: self.pixels.len(),
            });
        }
        Ok(())
    }
}

impl From<&image::RgbaImage> for PixelGrid {
    fn from(image: &image::RgbaImage) -> Self {
        let pixels: Vec<Pixel> = image.pixels().map(|p| Pixel::from(*p)).collect();
        Self::new(image.width() as usize, image.height() as usize, pixels)
    }
}
