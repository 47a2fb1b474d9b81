// THEORY:
// This file is the entry point for the `ink_alchemist` library crate. The public
// face of the engine is `pipeline::PixelAnalyzer`: hand it a decoded RGBA buffer
// and its dimensions, get back coverage, a region count, the ink mask and a
// heatmap buffer.
//
// The individual layers in `core_modules` are public too, so hosts that only need
// one step (say, the mask for their own renderer) can call it directly.

pub mod core_modules;
pub mod error;
pub mod pipeline;

pub use error::{AnalysisError, Result};
pub use pipeline::{Analysis, AnalysisResult, AnalyzerConfig, DenoiseConfig, PixelAnalyzer, ProgressStage};
