//! Loss functions.
use crate::error::{Error, Result};

/// Mean squared error between a prediction and its target.
pub fn mse(pred: &[f64], target: &[f64]) -> Result<f64> {
    if pred.len() != target.len() {
        return Err(Error::ShapeMismatch {
            what: "loss target",
            expected: pred.len(),
            got: target.len(),
        });
    }
    if pred.is_empty() {
        return Err(Error::InvalidConfig("empty prediction".into()));
    }
    let sum: f64 = pred
        .iter()
        .zip(target)
        .map(|(p, t)| (p - t) * (p - t))
        .sum();
    Ok(sum / pred.len() as f64)
}
