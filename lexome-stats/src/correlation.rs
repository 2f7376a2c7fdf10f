//! Correlation coefficients for round-trip evaluation.

use lexome_core::{LexomeError, Result};

use crate::rank::{rank, RankMethod};

/// Pearson product-moment correlation coefficient between `x` and `y`.
///
/// Returns 0.0 if either series is constant (zero variance).
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_paired(x, y)?;

    let n = x.len() as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n;
    let mean_y: f64 = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return Ok(0.0);
    }
    Ok(cov / denom)
}

/// Spearman rank correlation coefficient between `x` and `y`.
///
/// Ranks both series with [`RankMethod::Average`], then computes Pearson
/// correlation on the ranks.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    validate_paired(x, y)?;
    let rx = rank(x, RankMethod::Average);
    let ry = rank(y, RankMethod::Average);
    pearson(&rx, &ry)
}

fn validate_paired(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(LexomeError::InvalidInput(format!(
            "correlation: x and y must have the same length ({} vs {})",
            x.len(),
            y.len(),
        )));
    }
    if x.len() < 2 {
        return Err(LexomeError::InvalidInput(
            "correlation: need at least 2 observations".into(),
        ));
    }
    Ok(())
}
