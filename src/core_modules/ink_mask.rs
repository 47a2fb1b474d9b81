// THEORY:
// The `InkMask` is the first analysis layer. It turns a raw RGBA frame into a flat,
// single-byte-per-pixel map of "how much ink" each pixel carries.
//
// Key architectural principles:
// 1.  **Fixed Policy**: A pixel is ink when it is dark (luminance < 90), or when it is
//     mid-tone (luminance < 160) and clearly coloured (chroma > 40). These are policy
//     constants, not tuning knobs, so they are not part of any config struct.
// 2.  **Intensity, not just a flag**: Ink pixels store their darkness (1..=255), so
//     later layers (heatmap, region counter, denoiser) can threshold on strength.
//     Since an ink pixel always has luminance < 160, its darkness is at least 95.
// 3.  **Same shape as the image**: `values.len() == width * height`, index `i` maps to
//     pixel `(i % width, i / width)`. Every constructor enforces that.

use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::error::{AnalysisError, Result, check_rgba_len, pixel_count};

/// Below this luminance a pixel is ink regardless of colour.
pub const DARK_THRESHOLD: f64 = 90.0;
/// Below this luminance a pixel is ink if it is also saturated.
pub const MID_THRESHOLD: f64 = 160.0;
/// Minimum chroma (max − min channel) for a mid-tone pixel to count as ink.
pub const SAT_THRESHOLD: u8 = 40;

/// Per-pixel ink intensity. 0 = no ink, 1..=255 = ink, darker is higher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkMask {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl InkMask {
    /// Wraps existing intensities, checking they match the dimensions.
    pub fn from_values(width: u32, height: u32, values: Vec<u8>) -> Result<Self> {
        let expected = pixel_count(width, height)?;
        if values.len() != expected {
            return Err(AnalysisError::InvalidInput(format!(
                "mask holds {} values but a {}x{} image needs {}",
                values.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn into_values(self) -> Vec<u8> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Intensity at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Number of pixels classified as ink.
    pub fn ink_count(&self) -> usize {
        self.values.iter().filter(|&&value| value > 0).count()
    }

    /// Percentage of ink pixels in `[0, 100]`. An empty image has 0% coverage.
    pub fn coverage_percent(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.ink_count() as f64 / self.values.len() as f64 * 100.0
    }
}

/// The classification rule for a single pixel.
pub fn is_ink(pixel: &Pixel) -> bool {
    let luminance = pixel.luminance();
    luminance < DARK_THRESHOLD || (luminance < MID_THRESHOLD && pixel.chroma() > SAT_THRESHOLD)
}

/// Mask value for one pixel: its darkness when it is ink, else 0.
pub fn ink_intensity(pixel: &Pixel) -> u8 {
    if is_ink(pixel) { pixel.darkness() } else { 0 }
}

/// Classifies every pixel of an RGBA buffer. Alpha is ignored.
///
/// Fails with `BufferSize` when `buffer.len() != width * height * 4`; no partial
/// mask is ever produced.
pub fn classify(buffer: &[u8], width: u32, height: u32) -> Result<InkMask> {
    let pixels = check_rgba_len(buffer, width, height)?;

    let mut values = Vec::with_capacity(pixels);
    for bytes in buffer.chunks_exact(CHANNELS) {
        let pixel = Pixel::try_from(bytes)?;
        values.push(ink_intensity(&pixel));
    }

    let mask = InkMask {
        width,
        height,
        values,
    };
    log::debug!(
        "classified {}x{} image: {} ink pixels ({:.2}%)",
        width,
        height,
        mask.ink_count(),
        mask.coverage_percent()
    );
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(pixels: &[[u8; 4]]) -> Vec<u8> {
        pixels.iter().flatten().copied().collect()
    }

    #[test]
    fn black_and_white_checker() {
        let buffer = rgba(&[
            [0, 0, 0, 255],
            [255, 255, 255, 255],
            [0, 0, 0, 255],
            [255, 255, 255, 255],
        ]);
        let mask = classify(&buffer, 2, 2).unwrap();
        assert_eq!(mask.values(), &[255, 0, 255, 0]);
        assert_eq!(mask.coverage_percent(), 50.0);
    }

    #[test]
    fn saturated_mid_tone_is_ink() {
        // Orange marker: L = 135.62, chroma 210.
        let orange = Pixel::new(230, 110, 20, 255);
        assert!(is_ink(&orange));
        assert_eq!(ink_intensity(&orange), 119);
    }

    #[test]
    fn unsaturated_mid_tone_is_not_ink() {
        // Gray 120: L = 120, chroma 0.
        let gray = Pixel::new(120, 120, 120, 255);
        assert!(!is_ink(&gray));
        // Just at the chroma threshold is still not ink.
        let muted = Pixel::new(140, 120, 100, 255);
        assert_eq!(muted.chroma(), SAT_THRESHOLD);
        assert!(!is_ink(&muted));
    }

    #[test]
    fn bright_saturated_pixel_is_never_ink() {
        // Pure yellow has L ≈ 225.9 even though chroma is 255.
        assert!(!is_ink(&Pixel::new(255, 255, 0, 255)));
    }

    #[test]
    fn alpha_is_ignored() {
        let opaque = classify(&[10, 10, 10, 255], 1, 1).unwrap();
        let clear = classify(&[10, 10, 10, 0], 1, 1).unwrap();
        assert_eq!(opaque, clear);
    }

    #[test]
    fn length_mismatch_fails_fast() {
        let result = classify(&[0u8; 12], 2, 2);
        assert!(matches!(
            result,
            Err(AnalysisError::BufferSize {
                expected: 16,
                actual: 12
            })
        ));
    }

    #[test]
    fn channels_are_read_in_rgba_order() {
        let mask = classify(&rgba(&[[230, 110, 20, 255], [20, 110, 230, 255]]), 2, 1).unwrap();
        assert_eq!(mask.get(0, 0), Some(ink_intensity(&Pixel::new(230, 110, 20, 255))));
        assert_eq!(mask.get(1, 0), Some(ink_intensity(&Pixel::new(20, 110, 230, 255))));
        // L = 96.77 once red and blue swap.
        assert_eq!(mask.values(), &[119, 158]);
    }

    #[test]
    fn empty_image_has_zero_coverage() {
        let mask = classify(&[], 0, 0).unwrap();
        assert!(mask.is_empty());
        assert_eq!(mask.coverage_percent(), 0.0);
    }

    #[test]
    fn from_values_validates_shape() {
        assert!(InkMask::from_values(3, 2, vec![0; 6]).is_ok());
        assert!(InkMask::from_values(3, 2, vec![0; 5]).is_err());
    }

    #[test]
    fn get_maps_row_major() {
        let mask = InkMask::from_values(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(mask.get(2, 0), Some(2));
        assert_eq!(mask.get(0, 1), Some(3));
        assert_eq!(mask.get(3, 0), None);
        assert_eq!(mask.get(0, 2), None);
    }
}
