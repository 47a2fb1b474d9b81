// THEORY (1D Pixel Heuristics):
// The `Pixel` module is the smallest unit of the ink engine: a "dumb" container for
// one RGBA pixel plus the single-pixel measurements the classifier needs. Nothing in
// here looks at neighbours; anything spatial (denoising, region counting) lives in
// the higher modules.
//
// Heuristics kept here:
// - Luminance: Rec. 601 luma on the raw 0..255 channels. Not gamma-corrected; the
//   classifier thresholds are expressed in this exact scale.
// - Chroma: max(R,G,B) − min(R,G,B), the "saturation" used to catch coloured ink
//   (blue/red pen strokes) that is not dark enough to pass the luminance test alone.
// - Darkness: the inverse of luminance mapped onto 0..255, which becomes the mask
//   intensity of an ink pixel.
//
// Alpha is carried but never used by any heuristic.

pub mod pixel {
    use crate::error::AnalysisError;

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Luminance = f64;
    pub type Chroma = u8;

    pub const CHANNELS: usize = 4;

    /// A single RGBA pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255).
        pub alpha: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        /// Chroma = max(R,G,B) − min(R,G,B). Zero for any pure gray.
        pub fn chroma(&self) -> Chroma {
            let maximum = self.red.max(self.green).max(self.blue);
            let minimum = self.red.min(self.green).min(self.blue);
            maximum - minimum
        }

        /// Darkness on the 0..255 scale: `round((1 − L/255) × 255)`.
        pub fn darkness(&self) -> u8 {
            let value = ((1.0 - self.luminance() / 255.0) * 255.0).round();
            value.clamp(0.0, 255.0) as u8
        }
    }

    impl TryFrom<&[Byte]> for Pixel {
        type Error = AnalysisError;

        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            match bytes {
                [red, green, blue, alpha] => Ok(Pixel::new(*red, *green, *blue, *alpha)),
                _ => Err(AnalysisError::InvalidInput(format!(
                    "cannot convert {} bytes into a pixel",
                    bytes.len()
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn luminance_uses_rec601_weights() {
        assert_eq!(Pixel::new(0, 0, 0, 255).luminance(), 0.0);
        assert!((Pixel::new(255, 255, 255, 255).luminance() - 255.0).abs() < 1e-9);
        assert!((Pixel::new(100, 0, 0, 0).luminance() - 29.9).abs() < 1e-9);
        assert!((Pixel::new(0, 100, 0, 0).luminance() - 58.7).abs() < 1e-9);
        assert!((Pixel::new(0, 0, 100, 0).luminance() - 11.4).abs() < 1e-9);
    }

    #[test]
    fn chroma_is_channel_spread() {
        assert_eq!(Pixel::new(12, 12, 12, 0).chroma(), 0);
        assert_eq!(Pixel::new(10, 200, 60, 0).chroma(), 190);
        assert_eq!(Pixel::new(255, 0, 255, 0).chroma(), 255);
    }

    #[test]
    fn darkness_inverts_luminance() {
        assert_eq!(Pixel::new(0, 0, 0, 255).darkness(), 255);
        assert_eq!(Pixel::new(255, 255, 255, 255).darkness(), 0);
        // L = 128
        assert_eq!(Pixel::new(128, 128, 128, 255).darkness(), 127);
    }

    #[test]
    fn slice_conversion_requires_four_channels() {
        let bytes = [1u8, 2, 3, 4];
        let pixel = Pixel::try_from(&bytes[..]).unwrap();
        assert_eq!(pixel, Pixel::new(1, 2, 3, 4));
        assert!(Pixel::try_from(&bytes[..3]).is_err());
    }
}
