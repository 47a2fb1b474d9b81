// THEORY:
// The `pipeline` module is the top-level API of the ink engine. It wraps the
// individual layers (classification, optional denoising, heatmap painting, region
// counting) behind one synchronous call: RGBA buffer in, `Analysis` out.
//
// The analyzer keeps no state between runs. Each call produces fresh, owned
// results, and a caller that no longer wants a result simply drops it. The only
// suspension point is decoding an image file, which `analyze_file` finishes on a
// blocking thread before any analysis starts.

use crate::core_modules::heatmap::{self, DEFAULT_BASE_OPACITY, HeatmapBuffer};
use crate::core_modules::ink_mask::{self, InkMask};
use crate::core_modules::morphology::{self, DEFAULT_KERNEL_SIZE, DEFAULT_THRESHOLD};
use crate::core_modules::region_counter::{InkRegion, region_counter};
use crate::core_modules::utils::image_helper::image_helper;
use crate::error::{AnalysisError, Result};
use std::path::PathBuf;

/// Settings for the optional morphological clean-up of the mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenoiseConfig {
    /// Normalised intensity a pixel must exceed to survive thresholding.
    pub threshold: f32,
    /// Side of the square opening/closing kernel.
    pub kernel_size: usize,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            kernel_size: DEFAULT_KERNEL_SIZE,
        }
    }
}

/// Configuration for the PixelAnalyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Opacity the source is drawn at beneath the heatmap, in [0, 1].
    pub base_opacity: f32,
    /// When set, the mask is denoised before painting and counting.
    pub denoise: Option<DenoiseConfig>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base_opacity: DEFAULT_BASE_OPACITY,
            denoise: None,
        }
    }
}

/// The metrics of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Share of ink pixels in `mask`, in [0, 100].
    pub coverage_percent: f64,
    /// Number of sampled ink regions, never below 1.
    pub region_count: usize,
    pub mask: InkMask,
    pub width: u32,
    pub height: u32,
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub heatmap: HeatmapBuffer,
    /// The regions behind `result.region_count` (empty on a blank page).
    pub regions: Vec<InkRegion>,
}

/// Stages reported to an optional progress callback, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    Classifying,
    Denoising,
    Painting,
    CountingRegions,
    Done,
}

/// The stateless ink analysis service.
#[derive(Debug, Clone, Default)]
pub struct PixelAnalyzer {
    config: AnalyzerConfig,
}

impl PixelAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Classification only: the mask and its coverage.
    pub fn classify(&self, pixels: &[u8], width: u32, height: u32) -> Result<(InkMask, f64)> {
        let mask = ink_mask::classify(pixels, width, height)?;
        let coverage = mask.coverage_percent();
        Ok((mask, coverage))
    }

    pub fn heatmap(&self, source: &[u8], mask: &InkMask) -> Result<HeatmapBuffer> {
        heatmap::heatmap(source, mask, self.config.base_opacity)
    }

    pub fn count_regions(&self, mask: &InkMask) -> usize {
        region_counter::count_regions(mask)
    }

    pub fn analyze(&self, pixels: &[u8], width: u32, height: u32) -> Result<Analysis> {
        self.analyze_with_progress(pixels, width, height, |_| {})
    }

    /// Runs the full analysis, reporting each stage as it starts.
    pub fn analyze_with_progress(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        mut on_progress: impl FnMut(ProgressStage),
    ) -> Result<Analysis> {
        heatmap::validate_opacity(self.config.base_opacity)?;

        on_progress(ProgressStage::Classifying);
        let mut mask = ink_mask::classify(pixels, width, height)?;

        if let Some(denoise) = self.config.denoise {
            on_progress(ProgressStage::Denoising);
            let keep = morphology::post_process(&mask, denoise.threshold, denoise.kernel_size)?;
            mask = morphology::apply(&mask, &keep)?;
        }

        on_progress(ProgressStage::Painting);
        let heatmap = heatmap::heatmap(pixels, &mask, self.config.base_opacity)?;

        on_progress(ProgressStage::CountingRegions);
        let regions = region_counter::find_regions(&mask);
        let region_count = regions.len().max(1);

        let result = AnalysisResult {
            coverage_percent: mask.coverage_percent(),
            region_count,
            mask,
            width,
            height,
        };
        log::info!(
            "analyzed {}x{}: coverage {:.2}%, {} region(s)",
            width,
            height,
            result.coverage_percent,
            result.region_count
        );
        on_progress(ProgressStage::Done);

        Ok(Analysis {
            result,
            heatmap,
            regions,
        })
    }
}

/// Decodes `path` on a blocking thread, then analyzes it.
/// Returns the decoded source alongside the analysis so callers can export panels.
pub async fn analyze_file(
    path: impl Into<PathBuf>,
    config: AnalyzerConfig,
) -> Result<(image_helper::DecodedImage, Analysis)> {
    let path = path.into();
    let decoded = tokio::task::spawn_blocking(move || image_helper::load_rgba(&path))
        .await
        .map_err(|err| AnalysisError::Join(err.to_string()))??;

    let analyzer = PixelAnalyzer::new(config);
    let analysis = analyzer.analyze(&decoded.pixels, decoded.width, decoded.height)?;
    Ok((decoded, analysis))
}
