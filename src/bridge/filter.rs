//! The fixed noir filter.
//!
//! Converts RGB frames to high-contrast black and white. A 256-entry lookup
//! table keeps the per-pixel cost to one table read.

use crate::capture::{Frame, BYTES_PER_PIXEL};

/// Default contrast multiplier.
pub const DEFAULT_CONTRAST: f32 = 1.35;

/// High-contrast monochrome filter.
#[derive(Clone)]
pub struct NoirFilter {
    contrast: f32,
    curve: [u8; 256],
}

impl NoirFilter {
    pub fn new(contrast: f32) -> Self {
        let mut curve = [0u8; 256];
        for (luma, out) in curve.iter_mut().enumerate() {
            let stretched = (luma as f32 - 128.0) * contrast + 128.0;
            *out = stretched.round().clamp(0.0, 255.0) as u8;
        }
        Self { contrast, curve }
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    /// Returns the filtered copy of `frame`.
    pub fn apply(&self, frame: &Frame) -> Frame {
        let mut pixels = Vec::with_capacity(frame.pixels().len());
        for rgb in frame.pixels().chunks_exact(BYTES_PER_PIXEL) {
            let value = self.curve[luma(rgb[0], rgb[1], rgb[2]) as usize];
            pixels.extend_from_slice(&[value, value, value]);
        }
        frame.with_pixels(pixels)
    }
}

impl Default for NoirFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CONTRAST)
    }
}

impl std::fmt::Debug for NoirFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoirFilter")
            .field("contrast", &self.contrast)
            .finish()
    }
}

/// BT.601 luma in 8.8 fixed point.
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Dimensions;

    #[test]
    fn test_output_is_grey() {
        let frame = Frame::filled(Dimensions::new(3, 2), [200, 40, 90], 1);
        let filtered = NoirFilter::default().apply(&frame);

        assert!(filtered.is_valid());
        for px in filtered.pixels().chunks_exact(3) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn test_extremes_are_preserved() {
        let filter = NoirFilter::default();
        let black = filter.apply(&Frame::filled(Dimensions::new(1, 1), [0, 0, 0], 1));
        let white = filter.apply(&Frame::filled(Dimensions::new(1, 1), [255, 255, 255], 1));

        assert_eq!(black.pixels(), &[0, 0, 0]);
        assert_eq!(white.pixels()[0], 255);
    }

    #[test]
    fn test_contrast_stretches_away_from_mid_grey() {
        let frame = Frame::filled(Dimensions::new(1, 1), [160, 160, 160], 1);

        let flat = NoirFilter::new(1.0).apply(&frame).pixels()[0];
        let punchy = NoirFilter::new(2.0).apply(&frame).pixels()[0];
        assert!(punchy > flat);
    }

    #[test]
    fn test_metadata_survives() {
        let frame = Frame::filled(Dimensions::new(2, 2), [1, 2, 3], 42);
        let filtered = NoirFilter::default().apply(&frame);

        assert_eq!(filtered.sequence(), 42);
        assert_eq!(filtered.dimensions(), frame.dimensions());
    }
}
