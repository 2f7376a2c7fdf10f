//! Per-dataset gene vocabulary.
//!
//! A [`Vocabulary`] records, for every gene of a dataset, the number of cells
//! in which it is expressed (nonzero). The gene order is the dataset's column
//! order, and reconstruction output vectors are indexed by it. Genes never
//! expressed keep a count of 0 but stay in the vocabulary.

use std::collections::HashMap;

use lexome_core::{LexomeError, Result, Summarizable};
use lexome_omics::ScDataset;

/// Ordered gene list with per-gene expressing-cell counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    gene_names: Vec<String>,
    n_cells_expressing: Vec<usize>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from a dataset, one entry per gene column.
    ///
    /// # Errors
    ///
    /// Fails if the dataset has duplicate gene names — the name → index
    /// mapping would be ambiguous.
    pub fn from_dataset(ds: &ScDataset) -> Result<Self> {
        let counts = ds.x().column_nnz_counts();
        Self::from_counts(ds.var_names().to_vec(), counts)
    }

    /// Build a vocabulary from parallel name and count vectors.
    pub fn from_counts(gene_names: Vec<String>, n_cells_expressing: Vec<usize>) -> Result<Self> {
        if gene_names.len() != n_cells_expressing.len() {
            return Err(LexomeError::InvalidInput(format!(
                "vocabulary: {} gene names but {} counts",
                gene_names.len(),
                n_cells_expressing.len(),
            )));
        }
        let mut index = HashMap::with_capacity(gene_names.len());
        for (i, name) in gene_names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(LexomeError::InvalidInput(format!(
                    "vocabulary: duplicate gene name '{}'",
                    name,
                )));
            }
        }
        Ok(Self {
            gene_names,
            n_cells_expressing,
            index,
        })
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.gene_names.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.gene_names.is_empty()
    }

    /// Gene name at `idx`.
    pub fn gene_name(&self, idx: usize) -> Option<&str> {
        self.gene_names.get(idx).map(|s| s.as_str())
    }

    /// Index of a gene name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of cells expressing the gene at `idx`.
    pub fn n_cells_expressing(&self, idx: usize) -> Option<usize> {
        self.n_cells_expressing.get(idx).copied()
    }

    /// All gene names in vocabulary order.
    pub fn gene_names(&self) -> &[String] {
        &self.gene_names
    }

    /// Iterate `(gene name, expressing-cell count)` in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.gene_names
            .iter()
            .map(|s| s.as_str())
            .zip(self.n_cells_expressing.iter().copied())
    }
}

impl Summarizable for Vocabulary {
    fn summary(&self) -> String {
        let expressed = self
            .n_cells_expressing
            .iter()
            .filter(|&&c| c > 0)
            .count();
        format!(
            "Vocabulary: {} genes, {} expressed in at least one cell",
            self.len(),
            expressed,
        )
    }
}
