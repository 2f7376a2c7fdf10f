//! Descriptive statistics for numeric data.

use lexome_core::{LexomeError, Result};

/// Arithmetic mean.
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(LexomeError::InvalidInput(
            "mean: data must not be empty".into(),
        ));
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Variance with given degrees-of-freedom correction.
///
/// - `ddof = 0` → population variance
/// - `ddof = 1` → sample variance (Bessel's correction)
pub fn variance(data: &[f64], ddof: usize) -> Result<f64> {
    let n = data.len();
    if n <= ddof {
        return Err(LexomeError::InvalidInput(format!(
            "variance: need more than {} observations (got {})",
            ddof, n,
        )));
    }
    let m = mean(data)?;
    let ss: f64 = data.iter().map(|&x| (x - m).powi(2)).sum();
    Ok(ss / (n - ddof) as f64)
}

/// Standard deviation with given degrees-of-freedom correction.
pub fn std_dev(data: &[f64], ddof: usize) -> Result<f64> {
    Ok(variance(data, ddof)?.sqrt())
}
