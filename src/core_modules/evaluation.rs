// THEORY:
// Offline scoring of a predicted ink map against a ground-truth label map. The
// score is the smoothed Dice coefficient, and `optimize_threshold` sweeps a fixed
// ladder of binarisation thresholds to find the one a deployment should use.
//
// All inputs are probability-like maps in [0, 1], one value per pixel. An `InkMask`
// can be turned into one with `probabilities`.

use crate::core_modules::ink_mask::InkMask;
use crate::error::{AnalysisError, Result};

/// Smoothing term added to both sides of the Dice ratio.
const DICE_SMOOTHING: f64 = 1.0;
const SWEEP_START: f32 = 0.10;
const SWEEP_STEP: f32 = 0.05;
/// Number of thresholds tried: 0.10, 0.15, ..., 0.85.
const SWEEP_STEPS: usize = 16;

/// Best threshold found by a sweep, and its Dice score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSweep {
    pub threshold: f32,
    pub dice: f64,
}

fn check_pair(prediction: &[f32], truth: &[f32]) -> Result<()> {
    if prediction.len() != truth.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "prediction has {} values but truth has {}",
            prediction.len(),
            truth.len()
        )));
    }
    if prediction.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "cannot score an empty prediction".to_string(),
        ));
    }
    Ok(())
}

/// Mask intensities as probabilities (`value / 255`).
pub fn probabilities(mask: &InkMask) -> Vec<f32> {
    mask.values().iter().map(|&value| value as f32 / 255.0).collect()
}

/// `(2·Σ(p·t) + 1) / (Σp + Σt + 1)`.
pub fn dice_score(prediction: &[f32], truth: &[f32]) -> Result<f64> {
    check_pair(prediction, truth)?;
    let mut intersection = 0.0f64;
    let mut predicted = 0.0f64;
    let mut expected = 0.0f64;
    for (&p, &t) in prediction.iter().zip(truth) {
        intersection += p as f64 * t as f64;
        predicted += p as f64;
        expected += t as f64;
    }
    Ok((2.0 * intersection + DICE_SMOOTHING) / (predicted + expected + DICE_SMOOTHING))
}

/// The thresholds `optimize_threshold` tries, in order.
pub fn sweep_thresholds() -> impl Iterator<Item = f32> {
    (0..SWEEP_STEPS).map(|step| SWEEP_START + SWEEP_STEP * step as f32)
}

/// Binarises `prediction > t` for every sweep threshold and keeps the first one
/// with the strictly best Dice score.
pub fn optimize_threshold(prediction: &[f32], truth: &[f32]) -> Result<ThresholdSweep> {
    check_pair(prediction, truth)?;
    log::info!("sweeping {} thresholds over {} values", SWEEP_STEPS, prediction.len());

    let mut best: Option<ThresholdSweep> = None;
    let mut binary = vec![0.0f32; prediction.len()];
    for threshold in sweep_thresholds() {
        for (slot, &p) in binary.iter_mut().zip(prediction) {
            *slot = if p > threshold { 1.0 } else { 0.0 };
        }
        let dice = dice_score(&binary, truth)?;
        if best.is_none_or(|current| dice > current.dice) {
            best = Some(ThresholdSweep { threshold, dice });
        }
    }

    let best = best.ok_or_else(|| AnalysisError::InvalidInput("empty threshold sweep".to_string()))?;
    log::info!("best dice {:.4} at threshold {:.2}", best.dice, best.threshold);
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_scores_one() {
        let truth = vec![1.0, 0.0, 1.0, 0.0];
        assert!((dice_score(&truth, &truth).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_prediction_scores_low() {
        let prediction = vec![1.0, 1.0, 0.0, 0.0];
        let truth = vec![0.0, 0.0, 1.0, 1.0];
        // (0 + 1) / (2 + 2 + 1)
        assert!((dice_score(&prediction, &truth).unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn mismatched_or_empty_inputs_fail() {
        assert!(dice_score(&[1.0], &[1.0, 0.0]).is_err());
        assert!(dice_score(&[], &[]).is_err());
        assert!(optimize_threshold(&[], &[]).is_err());
    }

    #[test]
    fn sweep_covers_ten_to_eighty_five_percent() {
        let thresholds: Vec<f32> = sweep_thresholds().collect();
        assert_eq!(thresholds.len(), 16);
        assert!((thresholds[0] - 0.10).abs() < 1e-6);
        assert!((thresholds[15] - 0.85).abs() < 1e-6);
    }

    #[test]
    fn sweep_finds_separating_threshold() {
        // Ink predicted at 0.6..0.7, background at 0.3..0.38.
        let prediction = vec![0.65, 0.7, 0.6, 0.3, 0.33, 0.38];
        let truth = vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let best = optimize_threshold(&prediction, &truth).unwrap();
        assert!((best.dice - 1.0).abs() < 1e-12);
        // First threshold that separates the classes is 0.40.
        assert!((best.threshold - 0.40).abs() < 1e-6);
    }

    #[test]
    fn mask_probabilities_are_normalised() {
        let mask = InkMask::from_values(2, 1, vec![0, 255]).unwrap();
        assert_eq!(probabilities(&mask), vec![0.0, 1.0]);
    }
}
