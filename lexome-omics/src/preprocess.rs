//! Single-cell preprocessing: QC filtering, normalization, log rebasing.
//!
//! All functions operate on [`ScDataset`], following scanpy conventions:
//! filter, then normalize to a per-cell target sum, then log-transform.
//! [`rebase_log10`] converts natural-log values to base 10 and clamps
//! negatives to zero, the form the sentence transform expects.

use lexome_core::{LexomeError, Result};

use crate::single_cell::{ColumnData, MatrixData, ScDataset};

// ── Normalization ──────────────────────────────────────────────────────────

/// Configuration for total-count normalization.
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Target sum per cell after normalization.
    pub target_sum: f64,
    /// Whether to apply log1p transformation after scaling.
    pub log_transform: bool,
    /// Whether to save raw counts in `layers["counts"]`.
    pub save_raw: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            target_sum: 1e4,
            log_transform: true,
            save_raw: true,
        }
    }
}

/// Normalize per-cell total counts to `target_sum`, optionally log-transforming.
///
/// Follows the scanpy `normalize_total` + `log1p` pattern. Cells with zero
/// total counts are left at zero. If `save_raw` is true, original counts are
/// saved to `layers["counts"]`.
pub fn normalize_total(ds: &mut ScDataset, config: &NormalizeConfig) -> Result<()> {
    if config.target_sum <= 0.0 {
        return Err(LexomeError::InvalidInput(format!(
            "normalize_total: target_sum must be > 0, got {}",
            config.target_sum
        )));
    }

    if config.save_raw {
        let raw = ds.x().clone();
        ds.add_layer("counts", raw)?;
    }

    let row_sums = ds.x().row_sums();
    let factors: Vec<f64> = row_sums
        .iter()
        .map(|&s| if s > 0.0 { config.target_sum / s } else { 0.0 })
        .collect();

    match ds.x_mut() {
        MatrixData::Dense(rows) => {
            for (i, row) in rows.iter_mut().enumerate() {
                for v in row.iter_mut() {
                    *v *= factors[i];
                    if config.log_transform {
                        *v = (*v + 1.0).ln();
                    }
                }
            }
        }
        MatrixData::Sparse(s) => {
            s.scale_rows(&factors)?;
            if config.log_transform {
                s.map_values(|v| (v + 1.0).ln());
            }
        }
    }

    Ok(())
}

/// Rebase natural-log expression values to log10 and clamp negatives to zero.
///
/// The sentence transform and the rank-to-expression fit both operate on
/// base-10 values. After the base change any value below zero is set to
/// exactly 0.0, so the matrix satisfies the no-negative-values invariant.
pub fn rebase_log10(ds: &mut ScDataset) {
    let ln10 = std::f64::consts::LN_10;
    let rebase = move |v: f64| {
        let r = v / ln10;
        if r < 0.0 {
            0.0
        } else {
            r
        }
    };
    match ds.x_mut() {
        MatrixData::Dense(rows) => {
            for row in rows.iter_mut() {
                for v in row.iter_mut() {
                    *v = rebase(*v);
                }
            }
        }
        MatrixData::Sparse(s) => s.map_values(rebase),
    }
}

// ── QC filtering ───────────────────────────────────────────────────────────

/// Thresholds for cell and gene filtering.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Minimum total counts for a cell to be kept.
    pub min_counts: f64,
    /// Minimum number of detected genes for a cell to be kept.
    pub min_genes: usize,
    /// Minimum number of expressing cells for a gene to be kept.
    pub min_cells: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_counts: 1.0,
            min_genes: 200,
            min_cells: 3,
        }
    }
}

/// Remove cells below the count/gene thresholds.
///
/// Annotates the result with `obs["total_counts"]` and `obs["n_genes"]` for
/// the surviving cells and returns the filtered dataset.
pub fn filter_cells(ds: &ScDataset, config: &FilterConfig) -> Result<ScDataset> {
    let qc = ds.qc_metrics();
    let keep: Vec<usize> = (0..ds.n_obs())
        .filter(|&i| qc.total_counts[i] >= config.min_counts && qc.n_genes[i] >= config.min_genes)
        .collect();

    let mut filtered = ds.subset_obs(&keep)?;
    let total: Vec<f64> = keep.iter().map(|&i| qc.total_counts[i]).collect();
    let n_genes: Vec<f64> = keep.iter().map(|&i| qc.n_genes[i] as f64).collect();
    filtered.add_obs_column("total_counts", ColumnData::Numeric(total))?;
    filtered.add_obs_column("n_genes", ColumnData::Numeric(n_genes))?;
    Ok(filtered)
}

/// Remove genes expressed in fewer than `min_cells` cells.
///
/// Annotates the result with `var["n_cells"]` for the surviving genes and
/// returns the filtered dataset.
pub fn filter_genes(ds: &ScDataset, config: &FilterConfig) -> Result<ScDataset> {
    let counts = ds.x().column_nnz_counts();
    let keep: Vec<usize> = (0..ds.n_vars())
        .filter(|&j| counts[j] >= config.min_cells)
        .collect();

    let mut filtered = ds.subset_vars(&keep)?;
    let n_cells: Vec<f64> = keep.iter().map(|&j| counts[j] as f64).collect();
    filtered.add_var_column("n_cells", ColumnData::Numeric(n_cells))?;
    Ok(filtered)
}
