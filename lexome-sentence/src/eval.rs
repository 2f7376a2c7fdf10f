//! Round-trip reconstruction benchmark.
//!
//! Converts every cell of a dataset to a sentence, reconstructs it with a
//! fitted [`RankModel`], and reports per-cell Pearson and Spearman agreement
//! with the original matrix. This is the number a benchmarking run persists
//! alongside the fitted parameters.

use lexome_core::{LexomeError, Result, Summarizable};
use lexome_omics::ScDataset;
use lexome_stats::{mean, pearson, spearman};

use crate::reconstruct::{reconstruct_expression, RankModel, UnknownGenePolicy};
use crate::transform::CellSentence;
use crate::vocab::Vocabulary;

/// Agreement between original and reconstructed expression.
#[derive(Debug, Clone)]
pub struct RoundTripReport {
    /// Number of evaluated cells.
    pub n_cells: usize,
    /// Pearson correlation per cell.
    pub per_cell_pearson: Vec<f64>,
    /// Spearman correlation per cell.
    pub per_cell_spearman: Vec<f64>,
    /// Mean Pearson correlation across cells.
    pub mean_pearson: f64,
    /// Mean Spearman correlation across cells.
    pub mean_spearman: f64,
}

impl Summarizable for RoundTripReport {
    fn summary(&self) -> String {
        format!(
            "RoundTripReport: {} cells, mean r={:.4}, mean \u{03c1}={:.4}",
            self.n_cells, self.mean_pearson, self.mean_spearman,
        )
    }
}

/// Reconstruct every cell and score the round trip.
///
/// # Errors
///
/// Fails when the vocabulary length does not match the dataset's gene
/// dimension, or when the dataset has fewer than 2 genes (correlation is
/// undefined).
pub fn evaluate_round_trip(
    ds: &ScDataset,
    vocab: &Vocabulary,
    model: &RankModel,
    delimiter: &str,
) -> Result<RoundTripReport> {
    if vocab.len() != ds.n_vars() {
        return Err(LexomeError::InvalidInput(format!(
            "round trip: vocabulary has {} genes but dataset has {}",
            vocab.len(),
            ds.n_vars(),
        )));
    }
    if ds.n_vars() < 2 {
        return Err(LexomeError::InvalidInput(
            "round trip: need at least 2 genes to correlate".into(),
        ));
    }

    let n_cells = ds.n_obs();
    let mut per_cell_pearson = Vec::with_capacity(n_cells);
    let mut per_cell_spearman = Vec::with_capacity(n_cells);

    for i in 0..n_cells {
        let original = ds.x().row_dense(i);
        let sentence = CellSentence::from_profile(&original)?;
        let text = sentence.render(vocab, delimiter)?;
        let reconstructed =
            reconstruct_expression(&text, delimiter, vocab, model, UnknownGenePolicy::Reject)?;
        per_cell_pearson.push(pearson(&original, &reconstructed)?);
        per_cell_spearman.push(spearman(&original, &reconstructed)?);
    }

    let mean_pearson = if n_cells > 0 {
        mean(&per_cell_pearson)?
    } else {
        0.0
    };
    let mean_spearman = if n_cells > 0 {
        mean(&per_cell_spearman)?
    } else {
        0.0
    };

    Ok(RoundTripReport {
        n_cells,
        per_cell_pearson,
        per_cell_spearman,
        mean_pearson,
        mean_spearman,
    })
}
