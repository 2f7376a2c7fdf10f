//! Expression profile → cell sentence transform.
//!
//! For one cell, the sentence is the list of gene indices sorted by strictly
//! descending expression, ties broken by ascending gene index, with
//! zero-expression genes omitted. The tie order is arbitrary as far as the
//! model is concerned; fixing it keeps output deterministic.

use lexome_core::{LexomeError, Result};
use lexome_omics::ScDataset;

use crate::reconstruct::UnknownGenePolicy;
use crate::vocab::Vocabulary;

/// One cell's sentence: gene indices in rank order (rank 1 first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSentence {
    gene_indices: Vec<usize>,
}

impl CellSentence {
    /// Build a sentence from a dense expression profile.
    ///
    /// The profile must be non-negative (the matrix invariant after
    /// [`lexome_omics::preprocess::rebase_log10`]).
    pub fn from_profile(values: &[f64]) -> Result<Self> {
        for (j, &v) in values.iter().enumerate() {
            if v < 0.0 {
                return Err(LexomeError::InvalidInput(format!(
                    "cell sentence: negative expression {} at gene {}",
                    v, j,
                )));
            }
        }

        let mut expressed: Vec<usize> = (0..values.len()).filter(|&j| values[j] > 0.0).collect();
        // Descending by value, ascending by index within ties.
        expressed.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));

        Ok(Self {
            gene_indices: expressed,
        })
    }

    /// Number of genes in the sentence.
    pub fn len(&self) -> usize {
        self.gene_indices.len()
    }

    /// Whether the sentence is empty (cell with no expressed genes).
    pub fn is_empty(&self) -> bool {
        self.gene_indices.is_empty()
    }

    /// Gene indices in rank order.
    pub fn gene_indices(&self) -> &[usize] {
        &self.gene_indices
    }

    /// Render as a delimiter-joined string of gene names.
    ///
    /// # Errors
    ///
    /// Fails if any index is outside the vocabulary.
    pub fn render(&self, vocab: &Vocabulary, delimiter: &str) -> Result<String> {
        let mut names = Vec::with_capacity(self.gene_indices.len());
        for &idx in &self.gene_indices {
            let name = vocab.gene_name(idx).ok_or_else(|| {
                LexomeError::InvalidInput(format!(
                    "cell sentence: gene index {} outside vocabulary of {} genes",
                    idx,
                    vocab.len(),
                ))
            })?;
            names.push(name);
        }
        Ok(names.join(delimiter))
    }

    /// Parse a sentence string back into gene indices.
    ///
    /// Under [`UnknownGenePolicy::Skip`] unrecognized tokens are dropped;
    /// under [`UnknownGenePolicy::Reject`] they fail with an error naming the
    /// gene. Empty tokens (e.g. from a trailing delimiter) are ignored.
    pub fn parse(
        text: &str,
        delimiter: &str,
        vocab: &Vocabulary,
        policy: UnknownGenePolicy,
    ) -> Result<Self> {
        let mut gene_indices = Vec::new();
        for token in text.split(delimiter).filter(|t| !t.is_empty()) {
            match vocab.index_of(token) {
                Some(idx) => gene_indices.push(idx),
                None => match policy {
                    UnknownGenePolicy::Reject => {
                        return Err(LexomeError::InvalidInput(format!(
                            "cell sentence: gene '{}' is not in the vocabulary",
                            token,
                        )));
                    }
                    UnknownGenePolicy::Skip => {}
                },
            }
        }
        Ok(Self { gene_indices })
    }
}

/// Convert every cell of a dataset into a sentence.
pub fn dataset_to_sentences(ds: &ScDataset) -> Result<Vec<CellSentence>> {
    let mut sentences = Vec::with_capacity(ds.n_obs());
    for i in 0..ds.n_obs() {
        sentences.push(CellSentence::from_profile(&ds.x().row_dense(i))?);
    }
    Ok(sentences)
}
