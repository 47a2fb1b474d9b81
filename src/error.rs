// THEORY:
// A single error type for the whole engine. The analysis math itself is pure and
// deterministic, so every failure is a caller problem (bad dimensions, bad config)
// or a host problem (decode/IO). Nothing here is transient and nothing is retried.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("RGBA buffer holds {actual} bytes but the dimensions require {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Image dimensions {width}x{height} overflow the addressable buffer size")]
    DimensionsOverflow { width: u32, height: u32 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode task failed: {0}")]
    Join(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Number of pixels for `width x height`, guarded against overflow of the
/// RGBA byte length (`pixels * 4`).
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .filter(|count| count.checked_mul(4).is_some())
        .ok_or(AnalysisError::DimensionsOverflow { width, height })
}

/// Verifies that an RGBA buffer matches its declared dimensions.
pub(crate) fn check_rgba_len(buffer: &[u8], width: u32, height: u32) -> Result<usize> {
    let pixels = pixel_count(width, height)?;
    let expected = pixels * 4;
    if buffer.len() != expected {
        return Err(AnalysisError::BufferSize {
            expected,
            actual: buffer.len(),
        });
    }
    Ok(pixels)
}
