//! Rank-to-expression model: fitting and the approximate inverse transform.
//!
//! Within one cell, expression falls off roughly linearly in the log of a
//! gene's rank. Fitting `expression ~ intercept + slope·ln(rank)` over a
//! sample of cells therefore gives a two-parameter model that maps a cell
//! sentence back to a dense expression vector. The slope is expected to be
//! negative for real data but the procedure does not enforce it — callers
//! check the sign and R² of the fit.

use lexome_core::{LexomeError, Result, Scored, Summarizable};
use lexome_omics::ScDataset;
use lexome_stats::fit_ols;

use crate::vocab::Vocabulary;

/// What to do when a sentence names a gene missing from the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownGenePolicy {
    /// Fail with an error naming the gene.
    #[default]
    Reject,
    /// Drop the token. The rank counter still advances, so genes after the
    /// unknown token keep their original sentence positions.
    Skip,
}

/// A fitted rank-to-expression model.
#[derive(Debug, Clone, Copy)]
pub struct RankModel {
    /// Slope of expression on ln(rank); negative for real data.
    pub slope: f64,
    /// Intercept, the predicted expression at rank 1.
    pub intercept: f64,
    /// Goodness of fit of the underlying regression.
    pub r_squared: f64,
}

impl RankModel {
    /// Predicted expression at a 1-indexed rank, clamped at zero.
    pub fn predict(&self, rank: usize) -> f64 {
        let v = self.intercept + self.slope * (rank as f64).ln();
        if v < 0.0 {
            0.0
        } else {
            v
        }
    }
}

impl Summarizable for RankModel {
    fn summary(&self) -> String {
        format!(
            "RankModel: slope={:.4}, intercept={:.4}, R\u{00b2}={:.4}",
            self.slope, self.intercept, self.r_squared,
        )
    }
}

impl Scored for RankModel {
    fn score(&self) -> f64 {
        self.r_squared
    }
}

/// Fit a [`RankModel`] on a dataset by pooled OLS of nonzero expression on
/// ln(rank).
///
/// `max_cells` limits the fit to the first N cells (the benchmarking runs
/// sample a fixed number); `None` uses every cell. Cells with no expressed
/// genes contribute nothing.
///
/// # Errors
///
/// Fails when fewer than two (rank, expression) points exist, or when all
/// points sit at rank 1 (constant regressor).
pub fn fit_rank_model(ds: &ScDataset, max_cells: Option<usize>) -> Result<RankModel> {
    let n_cells = match max_cells {
        Some(limit) => limit.min(ds.n_obs()),
        None => ds.n_obs(),
    };

    let mut log_ranks = Vec::new();
    let mut values = Vec::new();
    for i in 0..n_cells {
        let mut row: Vec<f64> = ds
            .x()
            .row_dense(i)
            .into_iter()
            .filter(|&v| v > 0.0)
            .collect();
        row.sort_by(|a, b| b.total_cmp(a));
        for (pos, &v) in row.iter().enumerate() {
            log_ranks.push(((pos + 1) as f64).ln());
            values.push(v);
        }
    }

    if log_ranks.len() < 2 {
        return Err(LexomeError::InvalidInput(format!(
            "fit_rank_model: need at least 2 expressed genes across {} cells, found {}",
            n_cells,
            log_ranks.len(),
        )));
    }

    let fit = fit_ols(&log_ranks, &values)?;
    Ok(RankModel {
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
    })
}

/// Reconstruct a dense expression vector from a cell sentence.
///
/// The gene at 1-indexed position `r` receives
/// `intercept + slope·ln(r)`, clamped at zero; genes absent from the
/// sentence receive exactly 0. The output is indexed in vocabulary order.
/// If a gene appears twice, the first (higher-ranked) occurrence wins.
///
/// An empty sentence yields an all-zero vector.
pub fn reconstruct_expression(
    sentence: &str,
    delimiter: &str,
    vocab: &Vocabulary,
    model: &RankModel,
    policy: UnknownGenePolicy,
) -> Result<Vec<f64>> {
    let mut out = vec![0.0; vocab.len()];
    let mut seen = vec![false; vocab.len()];

    for (pos, token) in sentence
        .split(delimiter)
        .filter(|t| !t.is_empty())
        .enumerate()
    {
        let idx = match vocab.index_of(token) {
            Some(idx) => idx,
            None => match policy {
                UnknownGenePolicy::Reject => {
                    return Err(LexomeError::InvalidInput(format!(
                        "reconstruct: gene '{}' at position {} is not in the vocabulary",
                        token,
                        pos + 1,
                    )));
                }
                UnknownGenePolicy::Skip => continue,
            },
        };
        if seen[idx] {
            continue;
        }
        seen[idx] = true;
        out[idx] = model.predict(pos + 1);
    }

    Ok(out)
}
