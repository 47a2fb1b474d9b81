// THEORY:
// Post-processing for ink masks: binary thresholding followed by morphological
// denoising. Opening (erode, then dilate) strips isolated specks; closing (dilate,
// then erode) seals pinholes inside strokes. Both use a square kernel anchored at
// `kernel_size / 2`.
//
// Pixels outside the image never influence the result: erosion treats them as set
// and dilation treats them as unset, so borders neither shrink nor grow on their own.

use crate::core_modules::ink_mask::InkMask;
use crate::error::{AnalysisError, Result};

pub const DEFAULT_THRESHOLD: f32 = 0.5;
pub const DEFAULT_KERNEL_SIZE: usize = 3;

/// A mask of 0/1 values, same layout as `InkMask`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    pub width: u32,
    pub height: u32,
    pub values: Vec<u8>,
}

impl BinaryMask {
    pub fn count_set(&self) -> usize {
        self.values.iter().filter(|&&value| value != 0).count()
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Erode,
    Dilate,
}

/// Sets every pixel whose normalised intensity (`value / 255`) exceeds `threshold`.
pub fn threshold(mask: &InkMask, threshold: f32) -> Result<BinaryMask> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(AnalysisError::InvalidInput(format!(
            "threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    let values = mask
        .values()
        .iter()
        .map(|&value| u8::from(value as f32 / 255.0 > threshold))
        .collect();
    Ok(BinaryMask {
        width: mask.width(),
        height: mask.height(),
        values,
    })
}

fn apply_kernel(mask: &BinaryMask, kernel_size: usize, operation: Operation) -> BinaryMask {
    let width = mask.width as usize;
    let height = mask.height as usize;
    // Window is [p - anchor, p + reach] clipped to the image.
    let anchor = kernel_size / 2;
    let reach = kernel_size - 1 - anchor;

    let mut values = vec![0u8; mask.values.len()];
    for y in 0..height {
        let rows = y.saturating_sub(anchor)..=y.saturating_add(reach).min(height - 1);
        for x in 0..width {
            let columns = x.saturating_sub(anchor)..=x.saturating_add(reach).min(width - 1);
            let mut hit = match operation {
                Operation::Erode => 1u8,
                Operation::Dilate => 0u8,
            };
            'window: for ky in rows.clone() {
                for kx in columns.clone() {
                    let set = mask.values[ky * width + kx] != 0;
                    match operation {
                        Operation::Erode if !set => {
                            hit = 0;
                            break 'window;
                        }
                        Operation::Dilate if set => {
                            hit = 1;
                            break 'window;
                        }
                        _ => {}
                    }
                }
            }
            values[y * width + x] = hit;
        }
    }

    BinaryMask {
        width: mask.width,
        height: mask.height,
        values,
    }
}

fn check_kernel(kernel_size: usize) -> Result<()> {
    if kernel_size == 0 {
        return Err(AnalysisError::InvalidInput(
            "kernel size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub fn erode(mask: &BinaryMask, kernel_size: usize) -> Result<BinaryMask> {
    check_kernel(kernel_size)?;
    Ok(apply_kernel(mask, kernel_size, Operation::Erode))
}

pub fn dilate(mask: &BinaryMask, kernel_size: usize) -> Result<BinaryMask> {
    check_kernel(kernel_size)?;
    Ok(apply_kernel(mask, kernel_size, Operation::Dilate))
}

/// Erosion followed by dilation.
pub fn open(mask: &BinaryMask, kernel_size: usize) -> Result<BinaryMask> {
    dilate(&erode(mask, kernel_size)?, kernel_size)
}

/// Dilation followed by erosion.
pub fn close(mask: &BinaryMask, kernel_size: usize) -> Result<BinaryMask> {
    erode(&dilate(mask, kernel_size)?, kernel_size)
}

/// Threshold, then open, then close.
pub fn post_process(mask: &InkMask, threshold_value: f32, kernel_size: usize) -> Result<BinaryMask> {
    check_kernel(kernel_size)?;
    let binary = threshold(mask, threshold_value)?;
    let opened = open(&binary, kernel_size)?;
    let denoised = close(&opened, kernel_size)?;
    log::debug!(
        "denoised mask: {} -> {} set pixels (threshold {}, kernel {})",
        binary.count_set(),
        denoised.count_set(),
        threshold_value,
        kernel_size
    );
    Ok(denoised)
}

/// Keeps the intensities of `mask` where `keep` is set and zeroes the rest.
pub fn apply(mask: &InkMask, keep: &BinaryMask) -> Result<InkMask> {
    if keep.width != mask.width() || keep.height != mask.height() {
        return Err(AnalysisError::InvalidInput(format!(
            "binary mask is {}x{} but ink mask is {}x{}",
            keep.width,
            keep.height,
            mask.width(),
            mask.height()
        )));
    }
    let values = mask
        .values()
        .iter()
        .zip(&keep.values)
        .map(|(&value, &set)| if set != 0 { value } else { 0 })
        .collect();
    InkMask::from_values(mask.width(), mask.height(), values)
}
