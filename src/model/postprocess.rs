//! Score post-processing: probabilities, arg-max, confidence

use thiserror::Error;

/// Tolerance when deciding whether scores already sum to one
const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("model returned an empty score vector")]
    Empty,

    #[error("model returned a non-finite score at index {0}")]
    NonFinite(usize),
}

/// Top-1 result over a probability vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Top1 {
    pub index: usize,
    pub probability: f32,
}

/// Turn raw model scores into probabilities.
///
/// Models ending in a softmax layer are passed through unchanged; anything else
/// (logits) goes through a numerically stable softmax.
pub fn probabilities(scores: &[f32]) -> Result<Vec<f32>, ScoreError> {
    if scores.is_empty() {
        return Err(ScoreError::Empty);
    }
    if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
        return Err(ScoreError::NonFinite(i));
    }

    if is_distribution(scores) {
        return Ok(scores.to_vec());
    }

    Ok(softmax(scores))
}

fn is_distribution(scores: &[f32]) -> bool {
    let in_range = scores.iter().all(|s| (0.0..=1.0).contains(s));
    let sum: f32 = scores.iter().sum();
    in_range && (sum - 1.0).abs() <= DISTRIBUTION_TOLERANCE
}

pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Highest probability; ties resolve to the lowest index
pub fn top1(probabilities: &[f32]) -> Result<Top1, ScoreError> {
    let mut best: Option<Top1> = None;

    for (index, &probability) in probabilities.iter().enumerate() {
        if !probability.is_finite() {
            return Err(ScoreError::NonFinite(index));
        }
        match best {
            Some(b) if probability <= b.probability => {}
            _ => best = Some(Top1 { index, probability }),
        }
    }

    best.ok_or(ScoreError::Empty)
}

/// Probability as a percentage rounded to two decimals, within [0, 100].
///
/// Rounds the exact binary value with ties to even, so 3.125 becomes 3.12.
pub fn confidence_percent(probability: f32) -> f64 {
    let percent = (probability as f64 * 100.0).clamp(0.0, 100.0);
    format!("{:.2}", percent).parse().unwrap_or(percent)
}
