// Host-side image plumbing: decoding files into the flat RGBA buffers the engine
// consumes, writing buffers back out as PNG, and building the side-by-side
// comparison panel. None of the analysis math lives here.

pub mod image_helper {
    use crate::core_modules::heatmap::HeatmapBuffer;
    use crate::core_modules::ink_mask::InkMask;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::error::{AnalysisError, Result, check_rgba_len};
    use image::{ImageEncoder, RgbaImage, imageops};
    use std::path::Path;

    /// A decoded frame as a flat, row-major RGBA buffer.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DecodedImage {
        pub width: u32,
        pub height: u32,
        pub pixels: Vec<u8>,
    }

    impl From<RgbaImage> for DecodedImage {
        fn from(image: RgbaImage) -> Self {
            let (width, height) = image.dimensions();
            Self {
                width,
                height,
                pixels: image.into_raw(),
            }
        }
    }

    /// Decodes any format the `image` crate understands into RGBA.
    pub fn load_rgba(path: impl AsRef<Path>) -> Result<DecodedImage> {
        let decoded = image::open(path.as_ref())?.to_rgba8();
        log::debug!(
            "decoded {} ({}x{})",
            path.as_ref().display(),
            decoded.width(),
            decoded.height()
        );
        Ok(decoded.into())
    }

    /// Decodes an in-memory encoded image into RGBA.
    pub fn decode_rgba(bytes: &[u8]) -> Result<DecodedImage> {
        Ok(image::load_from_memory(bytes)?.to_rgba8().into())
    }

    pub fn save_png(path: impl AsRef<Path>, width: u32, height: u32, buffer: &[u8]) -> Result<()> {
        check_rgba_len(buffer, width, height)?;
        let output = std::io::BufWriter::new(std::fs::File::create(path.as_ref())?);
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;

        log::info!("wrote {}x{} PNG to {}", width, height, path.as_ref().display());
        Ok(())
    }

    fn to_image(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbaImage> {
        RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            AnalysisError::InvalidInput(format!("buffer does not fit a {}x{} image", width, height))
        })
    }

    /// Source as opaque gray luminance.
    fn grayscale_panel(source: &[u8]) -> Vec<u8> {
        source
            .chunks_exact(4)
            .flat_map(|rgba| {
                let pixel = Pixel::new(rgba[0], rgba[1], rgba[2], rgba[3]);
                let gray = pixel.luminance().round().clamp(0.0, 255.0) as u8;
                [gray, gray, gray, 255]
            })
            .collect()
    }

    /// Mask intensity as opaque gray, ink bright on black.
    fn mask_panel(mask: &InkMask) -> Vec<u8> {
        mask.values()
            .iter()
            .flat_map(|&value| [value, value, value, 255])
            .collect()
    }

    /// Heatmap composited (source-over) onto an opaque white backdrop.
    fn overlay_panel(heatmap: &HeatmapBuffer) -> Vec<u8> {
        heatmap
            .pixels
            .chunks_exact(4)
            .flat_map(|rgba| {
                let alpha = rgba[3] as f64 / 255.0;
                let blend = |channel: u8| (channel as f64 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
                [blend(rgba[0]), blend(rgba[1]), blend(rgba[2]), 255]
            })
            .collect()
    }

    /// Three panels side by side: grayscale source, raw mask, heatmap overlay.
    /// The result is `3 * width` by `height`.
    pub fn comparison_panel(source: &[u8], mask: &InkMask, heatmap: &HeatmapBuffer) -> Result<DecodedImage> {
        let (width, height) = (mask.width(), mask.height());
        check_rgba_len(source, width, height)?;
        if heatmap.width != width || heatmap.height != height {
            return Err(AnalysisError::InvalidInput(format!(
                "heatmap is {}x{} but mask is {}x{}",
                heatmap.width, heatmap.height, width, height
            )));
        }
        let panel_width = width.checked_mul(3).ok_or(AnalysisError::DimensionsOverflow {
            width,
            height,
        })?;

        let mut canvas = RgbaImage::new(panel_width, height);
        let panels = [
            grayscale_panel(source),
            mask_panel(mask),
            overlay_panel(heatmap),
        ];
        for (slot, pixels) in panels.into_iter().enumerate() {
            let panel = to_image(width, height, pixels)?;
            imageops::replace(&mut canvas, &panel, slot as i64 * width as i64, 0);
        }
        Ok(canvas.into())
    }
}
