//! Ordinary least squares regression.
//!
//! [`fit_ols`] is the single-covariate fit with an R² diagnostic, used to
//! relate expression to log-rank. [`fit_multi_ols`] solves the normal
//! equations for a small design matrix and reports per-coefficient t
//! statistics and p-values, the machinery behind pathway activity scoring.

use lexome_core::{LexomeError, Result};

use crate::distribution::t_two_tailed_p;

// ── Simple OLS ─────────────────────────────────────────────────────────────

/// A fitted single-covariate linear model `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Coefficient of determination (1 − RSS/TSS).
    pub r_squared: f64,
    /// Number of observations used in the fit.
    pub n: usize,
}

impl LinearFit {
    /// Predicted response at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y = intercept + slope * x` by ordinary least squares.
///
/// Requires at least 2 observations and a non-constant `x`. A constant `y`
/// yields `r_squared = 0.0` (no variance to explain).
pub fn fit_ols(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(LexomeError::InvalidInput(format!(
            "fit_ols: x and y must have the same length ({} vs {})",
            x.len(),
            y.len(),
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(LexomeError::InvalidInput(
            "fit_ols: need at least 2 observations".into(),
        ));
    }

    let n_f = n as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n_f;
    let mean_y: f64 = y.iter().sum::<f64>() / n_f;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        sxx += dx * dx;
        sxy += dx * (yi - mean_y);
    }

    if sxx == 0.0 {
        return Err(LexomeError::InvalidInput(
            "fit_ols: x is constant, slope is undefined".into(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let mut rss = 0.0;
    let mut tss = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let resid = yi - (intercept + slope * xi);
        rss += resid * resid;
        tss += (yi - mean_y).powi(2);
    }
    let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { 0.0 };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
        n,
    })
}

// ── Multi-covariate OLS ────────────────────────────────────────────────────

/// A fitted multi-covariate linear model with per-coefficient inference.
#[derive(Debug, Clone)]
pub struct MultiOlsFit {
    /// Fitted coefficients, one per design column.
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    /// t statistic of each coefficient.
    pub t_values: Vec<f64>,
    /// Two-tailed p-value of each coefficient.
    pub p_values: Vec<f64>,
    /// Residual degrees of freedom (n − p).
    pub df: f64,
}

/// Fit `y = X β` by ordinary least squares on the normal equations.
///
/// `design` is one row per observation; the caller supplies any intercept
/// column. Requires strictly more observations than columns and a
/// non-singular XᵀX.
pub fn fit_multi_ols(design: &[Vec<f64>], y: &[f64]) -> Result<MultiOlsFit> {
    let n_obs = design.len();
    if n_obs != y.len() {
        return Err(LexomeError::InvalidInput(format!(
            "fit_multi_ols: design has {} rows but y has {} values",
            n_obs,
            y.len(),
        )));
    }
    let n_cols = design.first().map_or(0, |r| r.len());
    if n_cols == 0 {
        return Err(LexomeError::InvalidInput(
            "fit_multi_ols: design matrix has no columns".into(),
        ));
    }
    for (i, row) in design.iter().enumerate() {
        if row.len() != n_cols {
            return Err(LexomeError::InvalidInput(format!(
                "fit_multi_ols: design row {} has {} columns, expected {}",
                i,
                row.len(),
                n_cols,
            )));
        }
    }
    if n_obs <= n_cols {
        return Err(LexomeError::InvalidInput(format!(
            "fit_multi_ols: need more observations ({}) than columns ({})",
            n_obs, n_cols,
        )));
    }

    // beta = (X^T X)^{-1} X^T y; X^T X is small, direct inversion is fine
    let xtx = mat_mul_ata(design, n_obs, n_cols);
    let xtx_inv = invert_small_matrix(&xtx, n_cols).ok_or_else(|| {
        LexomeError::InvalidInput("fit_multi_ols: singular design matrix".into())
    })?;

    let xty: Vec<f64> = (0..n_cols)
        .map(|k| (0..n_obs).map(|i| design[i][k] * y[i]).sum())
        .collect();

    let coefficients: Vec<f64> = (0..n_cols)
        .map(|k| (0..n_cols).map(|l| xtx_inv[k * n_cols + l] * xty[l]).sum())
        .collect();

    let mut rss = 0.0;
    for i in 0..n_obs {
        let predicted: f64 = (0..n_cols).map(|k| design[i][k] * coefficients[k]).sum();
        let resid = y[i] - predicted;
        rss += resid * resid;
    }

    let df = (n_obs - n_cols) as f64;
    let sigma2 = rss / df;

    let mut std_errors = Vec::with_capacity(n_cols);
    let mut t_values = Vec::with_capacity(n_cols);
    let mut p_values = Vec::with_capacity(n_cols);
    for k in 0..n_cols {
        let se = (sigma2 * xtx_inv[k * n_cols + k]).max(0.0).sqrt();
        let t = if se > 0.0 { coefficients[k] / se } else { 0.0 };
        std_errors.push(se);
        t_values.push(t);
        p_values.push(if se > 0.0 { t_two_tailed_p(t, df) } else { 1.0 });
    }

    Ok(MultiOlsFit {
        coefficients,
        std_errors,
        t_values,
        p_values,
        df,
    })
}

/// Compute X^T X for a design matrix stored as rows.
fn mat_mul_ata(x: &[Vec<f64>], n_rows: usize, n_cols: usize) -> Vec<f64> {
    let mut result = vec![0.0; n_cols * n_cols];
    for i in 0..n_rows {
        for j in 0..n_cols {
            for k in j..n_cols {
                let v = x[i][j] * x[i][k];
                result[j * n_cols + k] += v;
                if j != k {
                    result[k * n_cols + j] += v;
                }
            }
        }
    }
    result
}

/// Invert a small symmetric matrix via Gauss-Jordan with partial pivoting.
fn invert_small_matrix(m: &[f64], n: usize) -> Option<Vec<f64>> {
    let mut aug = vec![0.0; n * 2 * n];
    for i in 0..n {
        for j in 0..n {
            aug[i * 2 * n + j] = m[i * n + j];
        }
        aug[i * 2 * n + n + i] = 1.0;
    }

    for col in 0..n {
        let mut max_val = aug[col * 2 * n + col].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = aug[row * 2 * n + col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }
        if max_val < 1e-15 {
            return None;
        }

        if max_row != col {
            for j in 0..2 * n {
                aug.swap(col * 2 * n + j, max_row * 2 * n + j);
            }
        }

        let pivot = aug[col * 2 * n + col];
        for j in 0..2 * n {
            aug[col * 2 * n + j] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row * 2 * n + col];
            for j in 0..2 * n {
                aug[row * 2 * n + j] -= factor * aug[col * 2 * n + j];
            }
        }
    }

    let mut result = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            result[i * n + j] = aug[i * 2 * n + n + j];
        }
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn simple_fit_exact_line() {
        // y = 2 - x
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [2.0, 1.0, 0.0, -1.0];
        let fit = fit_ols(&x, &y).unwrap();
        assert!((fit.slope - (-1.0)).abs() < TOL);
        assert!((fit.intercept - 2.0).abs() < TOL);
        assert!((fit.r_squared - 1.0).abs() < TOL);
        assert_eq!(fit.n, 4);
    }

    #[test]
    fn simple_fit_predict() {
        let fit = LinearFit {
            slope: -1.0,
            intercept: 2.0,
            r_squared: 1.0,
            n: 3,
        };
        assert!((fit.predict(0.0) - 2.0).abs() < TOL);
        assert!((fit.predict(2.0) - 0.0).abs() < TOL);
    }

    #[test]
    fn simple_fit_noisy_r_squared_below_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.1, 1.9, 3.2, 3.8, 5.1];
        let fit = fit_ols(&x, &y).unwrap();
        assert!(fit.r_squared > 0.95 && fit.r_squared < 1.0);
    }

    #[test]
    fn simple_fit_constant_y() {
        let x = [1.0, 2.0, 3.0];
        let y = [5.0, 5.0, 5.0];
        let fit = fit_ols(&x, &y).unwrap();
        assert!(fit.slope.abs() < TOL);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn simple_fit_constant_x_errors() {
        assert!(fit_ols(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn simple_fit_length_mismatch() {
        assert!(fit_ols(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn simple_fit_too_short() {
        assert!(fit_ols(&[1.0], &[1.0]).is_err());
    }

    #[test]
    fn multi_fit_exact_plane() {
        // y = 1 + 2*x1 + 3*x2 over a grid
        let mut design = Vec::new();
        let mut y = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let x1 = i as f64;
                let x2 = (j as f64) * 0.5;
                design.push(vec![1.0, x1, x2]);
                y.push(1.0 + 2.0 * x1 + 3.0 * x2);
            }
        }
        let fit = fit_multi_ols(&design, &y).unwrap();
        assert!((fit.coefficients[0] - 1.0).abs() < 1e-7);
        assert!((fit.coefficients[1] - 2.0).abs() < 1e-7);
        assert!((fit.coefficients[2] - 3.0).abs() < 1e-7);
        assert_eq!(fit.df, 22.0);
    }

    #[test]
    fn multi_fit_t_and_p_track_signal() {
        // Strong covariate x1, pure-noise covariate x2 (fixed pattern).
        let noise = [0.3, -0.1, 0.2, -0.4, 0.1, -0.2, 0.4, -0.3, 0.0, 0.2];
        let mut design = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            let x1 = i as f64;
            design.push(vec![1.0, x1, noise[i]]);
            y.push(5.0 * x1 + noise[i] * 0.01 + if i % 2 == 0 { 0.05 } else { -0.05 });
        }
        let fit = fit_multi_ols(&design, &y).unwrap();
        assert!(fit.t_values[1].abs() > fit.t_values[2].abs());
        assert!(fit.p_values[1] < 1e-6);
    }

    #[test]
    fn multi_fit_singular_design() {
        // Second column duplicates the first
        let design = vec![
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
        ];
        let y = vec![1.0, 2.0, 3.0];
        assert!(fit_multi_ols(&design, &y).is_err());
    }

    #[test]
    fn multi_fit_underdetermined() {
        let design = vec![vec![1.0, 2.0, 3.0], vec![1.0, 3.0, 4.0]];
        let y = vec![1.0, 2.0];
        assert!(fit_multi_ols(&design, &y).is_err());
    }

    #[test]
    fn multi_fit_ragged_design() {
        let design = vec![vec![1.0, 2.0], vec![1.0]];
        let y = vec![1.0, 2.0];
        assert!(fit_multi_ols(&design, &y).is_err());
    }

    #[test]
    fn invert_small_matrix_2x2() {
        // [[2, 1], [1, 3]] → inverse [[3/5, -1/5], [-1/5, 2/5]]
        let m = vec![2.0, 1.0, 1.0, 3.0];
        let inv = invert_small_matrix(&m, 2).unwrap();
        assert!((inv[0] - 0.6).abs() < 1e-10);
        assert!((inv[1] - (-0.2)).abs() < 1e-10);
        assert!((inv[2] - (-0.2)).abs() < 1e-10);
        assert!((inv[3] - 0.4).abs() < 1e-10);
    }

    #[test]
    fn invert_singular_matrix() {
        let m = vec![1.0, 2.0, 2.0, 4.0]; // singular
        assert!(invert_small_matrix(&m, 2).is_none());
    }
}
