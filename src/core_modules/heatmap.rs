// THEORY:
// The heatmap is the visual layer of the engine. It takes the source frame and the
// `InkMask` and produces a recoloured frame of exactly the same shape.
//
// Two passes:
// 1.  **Base draw**: every pixel keeps its RGB and has its alpha scaled by the base
//     opacity, as if the source were drawn at that opacity onto a transparent canvas.
// 2.  **Heat paint**: every ink pixel is overwritten with the colour of its heat band.
//     Bands are checked hottest first and the first match wins:
//       - Hot  (intensity > 0.65): rose, green fades out as intensity rises
//       - Warm (0.35 < intensity <= 0.65): amber
//       - Cool (intensity <= 0.35): indigo
//
// Non-ink pixels are never touched by the second pass.

use crate::core_modules::ink_mask::InkMask;
use crate::error::{AnalysisError, Result, check_rgba_len};

pub const DEFAULT_BASE_OPACITY: f32 = 0.55;

const HOT_BAND_FLOOR: f64 = 0.65;
const WARM_BAND_FLOOR: f64 = 0.35;

/// The colour band an ink pixel falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatBand {
    Hot,
    Warm,
    Cool,
}

impl HeatBand {
    /// Picks the band for a normalised intensity in `(0, 1]`.
    pub fn for_intensity(intensity: f64) -> Self {
        if intensity > HOT_BAND_FLOOR {
            HeatBand::Hot
        } else if intensity > WARM_BAND_FLOOR {
            HeatBand::Warm
        } else {
            HeatBand::Cool
        }
    }

    /// RGBA paint for a mask value. `mask_value` must be non-zero.
    pub fn paint(mask_value: u8) -> [u8; 4] {
        let intensity = mask_value as f64 / 255.0;
        match Self::for_intensity(intensity) {
            HeatBand::Hot => [
                244,
                round_channel(63.0 * (1.0 - intensity)),
                94,
                round_channel(200.0 * intensity),
            ],
            HeatBand::Warm => [245, 158, 11, round_channel(180.0 * intensity)],
            HeatBand::Cool => [99, 102, 241, round_channel(160.0 * intensity + 40.0)],
        }
    }
}

fn round_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// A recoloured RGBA frame, same shape as the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn validate_opacity(base_opacity: f32) -> Result<()> {
    if !base_opacity.is_finite() || !(0.0..=1.0).contains(&base_opacity) {
        return Err(AnalysisError::InvalidInput(format!(
            "base opacity must be within [0, 1], got {}",
            base_opacity
        )));
    }
    Ok(())
}

/// Renders the heatmap for `source` using `mask`.
pub fn heatmap(source: &[u8], mask: &InkMask, base_opacity: f32) -> Result<HeatmapBuffer> {
    validate_opacity(base_opacity)?;
    let (width, height) = (mask.width(), mask.height());
    check_rgba_len(source, width, height)?;

    let opacity = base_opacity as f64;
    let mut pixels = source.to_vec();
    let mut painted = 0usize;

    for (rgba, &value) in pixels.chunks_exact_mut(4).zip(mask.values()) {
        if value == 0 {
            rgba[3] = round_channel(rgba[3] as f64 * opacity);
        } else {
            rgba.copy_from_slice(&HeatBand::paint(value));
            painted += 1;
        }
    }

    log::debug!(
        "painted {} of {} pixels at base opacity {}",
        painted,
        mask.len(),
        base_opacity
    );
    Ok(HeatmapBuffer {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_exclusive_from_the_top() {
        assert_eq!(HeatBand::for_intensity(1.0), HeatBand::Hot);
        assert_eq!(HeatBand::for_intensity(0.66), HeatBand::Hot);
        assert_eq!(HeatBand::for_intensity(0.65), HeatBand::Warm);
        assert_eq!(HeatBand::for_intensity(0.36), HeatBand::Warm);
        assert_eq!(HeatBand::for_intensity(0.35), HeatBand::Cool);
        assert_eq!(HeatBand::for_intensity(0.01), HeatBand::Cool);
    }

    #[test]
    fn paint_colours_per_band() {
        // 255 -> intensity 1.0
        assert_eq!(HeatBand::paint(255), [244, 0, 94, 200]);
        // 204 -> 0.8: green = round(12.6) = 13, alpha = 160
        assert_eq!(HeatBand::paint(204), [244, 13, 94, 160]);
        // 128 -> 0.50196: alpha = round(90.35) = 90
        assert_eq!(HeatBand::paint(128), [245, 158, 11, 90]);
        // 51 -> 0.2: alpha = round(72) = 72
        assert_eq!(HeatBand::paint(51), [99, 102, 241, 72]);
    }

    #[test]
    fn non_ink_pixels_keep_colour_and_scale_alpha() {
        let source = vec![10, 20, 30, 200, 0, 0, 0, 255];
        let mask = InkMask::from_values(2, 1, vec![0, 255]).unwrap();
        let out = heatmap(&source, &mask, 0.5).unwrap();
        assert_eq!(&out.pixels[..4], &[10, 20, 30, 100]);
        assert_eq!(&out.pixels[4..], &[244, 0, 94, 200]);
        assert_eq!((out.width, out.height), (2, 1));
    }

    #[test]
    fn default_opacity_applies_to_background() {
        let source = vec![255, 255, 255, 255];
        let mask = InkMask::from_values(1, 1, vec![0]).unwrap();
        let out = heatmap(&source, &mask, DEFAULT_BASE_OPACITY).unwrap();
        // 255 * 0.55 = 140.25
        assert_eq!(out.pixels, vec![255, 255, 255, 140]);
    }

    #[test]
    fn rejects_out_of_range_opacity() {
        let mask = InkMask::from_values(1, 1, vec![0]).unwrap();
        assert!(heatmap(&[0, 0, 0, 0], &mask, 1.5).is_err());
        assert!(heatmap(&[0, 0, 0, 0], &mask, f32::NAN).is_err());
    }

    #[test]
    fn rejects_mismatched_source() {
        let mask = InkMask::from_values(2, 1, vec![0, 0]).unwrap();
        assert!(matches!(
            heatmap(&[0, 0, 0, 0], &mask, 0.5),
            Err(AnalysisError::BufferSize { .. })
        ));
    }
}
