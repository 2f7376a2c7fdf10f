//! AnnData-like container for single-cell expression data.
//!
//! [`ScDataset`] is an in-memory representation inspired by the Python
//! AnnData format used across the scverse ecosystem:
//!
//! - `X` — primary data matrix (cells × genes), dense or sparse
//! - `obs` — per-cell metadata columns
//! - `var` — per-gene metadata columns
//! - `layers` — alternative data matrices with the same shape as `X`
//!
//! Shape invariants are enforced at construction and on every insertion, so
//! downstream code can index freely.

use std::collections::HashMap;

use lexome_core::{LexomeError, Result, Summarizable};

use crate::sparse::SparseMatrix;

/// The primary data matrix, either dense or sparse.
#[derive(Debug, Clone)]
pub enum MatrixData {
    /// Dense row-major matrix (n_obs × n_vars).
    Dense(Vec<Vec<f64>>),
    /// Sparse COO matrix.
    Sparse(SparseMatrix),
}

impl MatrixData {
    /// (n_obs, n_vars).
    pub fn shape(&self) -> (usize, usize) {
        match self {
            MatrixData::Dense(rows) => {
                let n_obs = rows.len();
                let n_vars = rows.first().map_or(0, |r| r.len());
                (n_obs, n_vars)
            }
            MatrixData::Sparse(s) => s.shape(),
        }
    }

    /// Get a value at (obs_idx, var_idx). Out-of-bounds reads return 0.0.
    pub fn get(&self, obs: usize, var: usize) -> f64 {
        match self {
            MatrixData::Dense(rows) => {
                rows.get(obs).and_then(|r| r.get(var)).copied().unwrap_or(0.0)
            }
            MatrixData::Sparse(s) => s.get(obs, var),
        }
    }

    /// One cell's expression profile as a dense vector of length n_vars.
    pub fn row_dense(&self, obs: usize) -> Vec<f64> {
        match self {
            MatrixData::Dense(rows) => rows.get(obs).cloned().unwrap_or_default(),
            MatrixData::Sparse(s) => s.row_dense(obs),
        }
    }

    /// Sum of values in each row.
    pub fn row_sums(&self) -> Vec<f64> {
        match self {
            MatrixData::Dense(rows) => rows.iter().map(|r| r.iter().sum()).collect(),
            MatrixData::Sparse(s) => s.row_sums(),
        }
    }

    /// Per-column count of cells with a nonzero value.
    pub fn column_nnz_counts(&self) -> Vec<usize> {
        match self {
            MatrixData::Dense(rows) => {
                let n_vars = rows.first().map_or(0, |r| r.len());
                let mut counts = vec![0usize; n_vars];
                for row in rows {
                    for (j, &v) in row.iter().enumerate() {
                        if v != 0.0 {
                            counts[j] += 1;
                        }
                    }
                }
                counts
            }
            MatrixData::Sparse(s) => s.column_nnz_counts(),
        }
    }

    /// Per-row count of nonzero values (genes detected per cell).
    pub fn row_nnz_counts(&self) -> Vec<usize> {
        match self {
            MatrixData::Dense(rows) => rows
                .iter()
                .map(|r| r.iter().filter(|&&v| v != 0.0).count())
                .collect(),
            MatrixData::Sparse(s) => s.row_nnz_counts(),
        }
    }
}

/// A metadata column with typed data.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Free-text string values.
    Strings(Vec<String>),
    /// Numeric (f64) values.
    Numeric(Vec<f64>),
}

impl ColumnData {
    /// Number of elements in this column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Strings(v) => v.len(),
            ColumnData::Numeric(v) => v.len(),
        }
    }

    /// Whether the column is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Try to get as string values. Returns `None` if not the `Strings` variant.
    pub fn as_strings(&self) -> Option<&Vec<String>> {
        match self {
            ColumnData::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as numeric values. Returns `None` if not the `Numeric` variant.
    pub fn as_numeric(&self) -> Option<&Vec<f64>> {
        match self {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    fn subset(&self, indices: &[usize]) -> Self {
        match self {
            ColumnData::Strings(v) => {
                ColumnData::Strings(indices.iter().map(|&i| v[i].clone()).collect())
            }
            ColumnData::Numeric(v) => {
                ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect())
            }
        }
    }
}

/// Per-cell quality control metrics.
#[derive(Debug, Clone)]
pub struct CellQc {
    /// Total counts per cell.
    pub total_counts: Vec<f64>,
    /// Number of genes detected (nonzero) per cell.
    pub n_genes: Vec<usize>,
}

/// AnnData-like container for single-cell expression data.
#[derive(Debug, Clone)]
pub struct ScDataset {
    /// Primary data matrix (n_obs × n_vars).
    x: MatrixData,
    /// Cell names.
    obs_names: Vec<String>,
    /// Gene names.
    var_names: Vec<String>,
    /// Per-cell metadata.
    obs: HashMap<String, ColumnData>,
    /// Per-gene metadata.
    var: HashMap<String, ColumnData>,
    /// Alternative data layers (same shape as X).
    layers: HashMap<String, MatrixData>,
}

impl ScDataset {
    /// Create a new dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix dimensions don't match the name vectors.
    pub fn new(
        x: MatrixData,
        obs_names: Vec<String>,
        var_names: Vec<String>,
    ) -> Result<Self> {
        let (n_obs, n_vars) = x.shape();
        if obs_names.len() != n_obs {
            return Err(LexomeError::InvalidInput(format!(
                "obs_names length ({}) does not match n_obs ({})",
                obs_names.len(),
                n_obs
            )));
        }
        if var_names.len() != n_vars {
            return Err(LexomeError::InvalidInput(format!(
                "var_names length ({}) does not match n_vars ({})",
                var_names.len(),
                n_vars
            )));
        }

        Ok(Self {
            x,
            obs_names,
            var_names,
            obs: HashMap::new(),
            var: HashMap::new(),
            layers: HashMap::new(),
        })
    }

    /// Number of cells.
    pub fn n_obs(&self) -> usize {
        self.obs_names.len()
    }

    /// Number of genes.
    pub fn n_vars(&self) -> usize {
        self.var_names.len()
    }

    /// Shape of the primary data matrix.
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }

    /// Access the primary data matrix.
    pub fn x(&self) -> &MatrixData {
        &self.x
    }

    /// Mutable access to the primary data matrix.
    pub fn x_mut(&mut self) -> &mut MatrixData {
        &mut self.x
    }

    /// Replace the primary data matrix. The new matrix must have the same shape.
    pub fn set_x(&mut self, new_x: MatrixData) -> Result<()> {
        let (n_obs, n_vars) = new_x.shape();
        if n_obs != self.n_obs() || n_vars != self.n_vars() {
            return Err(LexomeError::InvalidInput(format!(
                "new X shape ({}, {}) does not match ({}, {})",
                n_obs,
                n_vars,
                self.n_obs(),
                self.n_vars()
            )));
        }
        self.x = new_x;
        Ok(())
    }

    /// Cell names.
    pub fn obs_names(&self) -> &[String] {
        &self.obs_names
    }

    /// Gene names.
    pub fn var_names(&self) -> &[String] {
        &self.var_names
    }

    /// Add a per-cell metadata column.
    pub fn add_obs_column(&mut self, key: &str, data: ColumnData) -> Result<()> {
        if data.len() != self.n_obs() {
            return Err(LexomeError::InvalidInput(format!(
                "obs '{}' length ({}) does not match n_obs ({})",
                key,
                data.len(),
                self.n_obs()
            )));
        }
        self.obs.insert(key.to_string(), data);
        Ok(())
    }

    /// Get a per-cell metadata column.
    pub fn get_obs(&self, key: &str) -> Option<&ColumnData> {
        self.obs.get(key)
    }

    /// Add a per-gene metadata column.
    pub fn add_var_column(&mut self, key: &str, data: ColumnData) -> Result<()> {
        if data.len() != self.n_vars() {
            return Err(LexomeError::InvalidInput(format!(
                "var '{}' length ({}) does not match n_vars ({})",
                key,
                data.len(),
                self.n_vars()
            )));
        }
        self.var.insert(key.to_string(), data);
        Ok(())
    }

    /// Get a per-gene metadata column.
    pub fn get_var(&self, key: &str) -> Option<&ColumnData> {
        self.var.get(key)
    }

    /// Add an alternative data layer.
    pub fn add_layer(&mut self, key: &str, layer: MatrixData) -> Result<()> {
        let (n_obs, n_vars) = layer.shape();
        if n_obs != self.n_obs() || n_vars != self.n_vars() {
            return Err(LexomeError::InvalidInput(format!(
                "layer '{}' shape ({}, {}) does not match ({}, {})",
                key,
                n_obs,
                n_vars,
                self.n_obs(),
                self.n_vars()
            )));
        }
        self.layers.insert(key.to_string(), layer);
        Ok(())
    }

    /// Get an alternative data layer.
    pub fn get_layer(&self, key: &str) -> Option<&MatrixData> {
        self.layers.get(key)
    }

    /// Subset to the given cell indices.
    pub fn subset_obs(&self, indices: &[usize]) -> Result<ScDataset> {
        for &i in indices {
            if i >= self.n_obs() {
                return Err(LexomeError::InvalidInput(format!(
                    "obs index {} out of bounds (n_obs={})",
                    i,
                    self.n_obs()
                )));
            }
        }

        let x = subset_matrix_rows(&self.x, indices, self.n_vars());
        let obs_names: Vec<String> = indices.iter().map(|&i| self.obs_names[i].clone()).collect();

        let mut ds = ScDataset::new(x, obs_names, self.var_names.clone())?;
        for (key, col) in &self.obs {
            ds.obs.insert(key.clone(), col.subset(indices));
        }
        ds.var = self.var.clone();
        for (key, layer) in &self.layers {
            let sub = subset_matrix_rows(layer, indices, self.n_vars());
            ds.layers.insert(key.clone(), sub);
        }
        Ok(ds)
    }

    /// Subset to the given gene indices.
    pub fn subset_vars(&self, indices: &[usize]) -> Result<ScDataset> {
        for &i in indices {
            if i >= self.n_vars() {
                return Err(LexomeError::InvalidInput(format!(
                    "var index {} out of bounds (n_vars={})",
                    i,
                    self.n_vars()
                )));
            }
        }

        let x = subset_matrix_cols(&self.x, indices, self.n_obs());
        let var_names: Vec<String> = indices.iter().map(|&i| self.var_names[i].clone()).collect();

        let mut ds = ScDataset::new(x, self.obs_names.clone(), var_names)?;
        ds.obs = self.obs.clone();
        for (key, col) in &self.var {
            ds.var.insert(key.clone(), col.subset(indices));
        }
        for (key, layer) in &self.layers {
            let sub = subset_matrix_cols(layer, indices, self.n_obs());
            ds.layers.insert(key.clone(), sub);
        }
        Ok(ds)
    }

    /// Compute per-cell QC metrics.
    pub fn qc_metrics(&self) -> CellQc {
        CellQc {
            total_counts: self.x.row_sums(),
            n_genes: self.x.row_nnz_counts(),
        }
    }
}

fn subset_matrix_rows(x: &MatrixData, indices: &[usize], n_vars: usize) -> MatrixData {
    match x {
        MatrixData::Dense(rows) => {
            let sub: Vec<Vec<f64>> = indices.iter().map(|&i| rows[i].clone()).collect();
            MatrixData::Dense(sub)
        }
        MatrixData::Sparse(s) => {
            let mut row_map = HashMap::new();
            for (new_i, &old_i) in indices.iter().enumerate() {
                row_map.insert(old_i, new_i);
            }
            let mut new_s = SparseMatrix::new(indices.len(), n_vars);
            for (r, c, v) in s.iter() {
                if let Some(&new_r) = row_map.get(&r) {
                    let _ = new_s.insert(new_r, c, v);
                }
            }
            MatrixData::Sparse(new_s)
        }
    }
}

fn subset_matrix_cols(x: &MatrixData, indices: &[usize], n_obs: usize) -> MatrixData {
    match x {
        MatrixData::Dense(rows) => {
            let sub: Vec<Vec<f64>> = rows
                .iter()
                .map(|row| indices.iter().map(|&j| row[j]).collect())
                .collect();
            MatrixData::Dense(sub)
        }
        MatrixData::Sparse(s) => {
            let mut col_map = HashMap::new();
            for (new_j, &old_j) in indices.iter().enumerate() {
                col_map.insert(old_j, new_j);
            }
            let mut new_s = SparseMatrix::new(n_obs, indices.len());
            for (r, c, v) in s.iter() {
                if let Some(&new_c) = col_map.get(&c) {
                    let _ = new_s.insert(r, new_c, v);
                }
            }
            MatrixData::Sparse(new_s)
        }
    }
}

impl Summarizable for ScDataset {
    fn summary(&self) -> String {
        format!(
            "ScDataset: {} obs \u{00d7} {} vars, {} layers",
            self.n_obs(),
            self.n_vars(),
            self.layers.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> ScDataset {
        let x = MatrixData::Dense(vec![
            vec![1.0, 2.0, 0.0],
            vec![3.0, 0.0, 4.0],
            vec![0.0, 5.0, 6.0],
        ]);
        ScDataset::new(
            x,
            vec!["cell_1".into(), "cell_2".into(), "cell_3".into()],
            vec!["gene_a".into(), "gene_b".into(), "gene_c".into()],
        )
        .unwrap()
    }

    #[test]
    fn basic_construction() {
        let ds = sample_dataset();
        assert_eq!(ds.n_obs(), 3);
        assert_eq!(ds.n_vars(), 3);
        assert_eq!(ds.shape(), (3, 3));
    }

    #[test]
    fn dimension_mismatch_error() {
        let x = MatrixData::Dense(vec![vec![1.0, 2.0]]);
        let result = ScDataset::new(
            x,
            vec!["cell_1".into(), "cell_2".into()], // 2 names, 1 row
            vec!["gene_a".into(), "gene_b".into()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn obs_metadata() {
        let mut ds = sample_dataset();
        ds.add_obs_column(
            "cell_type",
            ColumnData::Strings(vec!["T-cell".into(), "B-cell".into(), "NK".into()]),
        )
        .unwrap();
        let ct = ds.get_obs("cell_type").unwrap().as_strings().unwrap();
        assert_eq!(ct[0], "T-cell");
        assert!(ds.get_obs("missing").is_none());
    }

    #[test]
    fn obs_metadata_length_mismatch() {
        let mut ds = sample_dataset();
        let result = ds.add_obs_column("bad", ColumnData::Strings(vec!["a".into()]));
        assert!(result.is_err());
    }

    #[test]
    fn var_metadata() {
        let mut ds = sample_dataset();
        ds.add_var_column(
            "n_cells",
            ColumnData::Numeric(vec![2.0, 2.0, 2.0]),
        )
        .unwrap();
        let counts = ds.get_var("n_cells").unwrap().as_numeric().unwrap();
        assert_eq!(counts[1], 2.0);
    }

    #[test]
    fn layers() {
        let mut ds = sample_dataset();
        let raw = MatrixData::Dense(vec![
            vec![10.0, 20.0, 0.0],
            vec![30.0, 0.0, 40.0],
            vec![0.0, 50.0, 60.0],
        ]);
        ds.add_layer("counts", raw).unwrap();
        assert_eq!(ds.get_layer("counts").unwrap().get(0, 0), 10.0);
    }

    #[test]
    fn layer_shape_mismatch() {
        let mut ds = sample_dataset();
        let bad = MatrixData::Dense(vec![vec![1.0]]);
        assert!(ds.add_layer("bad", bad).is_err());
    }

    #[test]
    fn subset_obs_basic() {
        let mut ds = sample_dataset();
        ds.add_obs_column(
            "label",
            ColumnData::Strings(vec!["a".into(), "b".into(), "c".into()]),
        )
        .unwrap();
        let sub = ds.subset_obs(&[0, 2]).unwrap();
        assert_eq!(sub.n_obs(), 2);
        assert_eq!(sub.n_vars(), 3);
        assert_eq!(sub.obs_names(), &["cell_1", "cell_3"]);
        let labels = sub.get_obs("label").unwrap().as_strings().unwrap();
        assert_eq!(labels, &["a", "c"]);
    }

    #[test]
    fn subset_obs_out_of_bounds() {
        let ds = sample_dataset();
        assert!(ds.subset_obs(&[0, 10]).is_err());
    }

    #[test]
    fn subset_vars_basic() {
        let mut ds = sample_dataset();
        ds.add_var_column(
            "kind",
            ColumnData::Strings(vec!["a".into(), "b".into(), "c".into()]),
        )
        .unwrap();
        let sub = ds.subset_vars(&[0, 2]).unwrap();
        assert_eq!(sub.n_vars(), 2);
        assert_eq!(sub.var_names(), &["gene_a", "gene_c"]);
        assert_eq!(sub.x().get(0, 1), 0.0); // was gene_c at col 2
        let kinds = sub.get_var("kind").unwrap().as_strings().unwrap();
        assert_eq!(kinds, &["a", "c"]);
    }

    #[test]
    fn subset_vars_sparse() {
        let s = SparseMatrix::from_triplets(
            vec![0, 1],
            vec![0, 2],
            vec![5.0, 7.0],
            2,
            3,
        )
        .unwrap();
        let ds = ScDataset::new(
            MatrixData::Sparse(s),
            vec!["c1".into(), "c2".into()],
            vec!["g1".into(), "g2".into(), "g3".into()],
        )
        .unwrap();
        let sub = ds.subset_vars(&[2]).unwrap();
        assert_eq!(sub.shape(), (2, 1));
        assert_eq!(sub.x().get(1, 0), 7.0);
    }

    #[test]
    fn qc_metrics() {
        let ds = sample_dataset();
        let qc = ds.qc_metrics();
        assert_eq!(qc.total_counts, vec![3.0, 7.0, 11.0]);
        assert_eq!(qc.n_genes, vec![2, 2, 2]);
    }

    #[test]
    fn row_dense_from_either_backend() {
        let ds = sample_dataset();
        assert_eq!(ds.x().row_dense(1), vec![3.0, 0.0, 4.0]);

        let s = SparseMatrix::from_dense(&vec![vec![3.0, 0.0, 4.0]]);
        let sparse_ds = ScDataset::new(
            MatrixData::Sparse(s),
            vec!["c".into()],
            vec!["g1".into(), "g2".into(), "g3".into()],
        )
        .unwrap();
        assert_eq!(sparse_ds.x().row_dense(0), vec![3.0, 0.0, 4.0]);
    }

    #[test]
    fn set_x_shape_mismatch() {
        let mut ds = sample_dataset();
        let bad = MatrixData::Dense(vec![vec![1.0]]);
        assert!(ds.set_x(bad).is_err());
    }

    #[test]
    fn summary_format() {
        let ds = sample_dataset();
        assert_eq!(ds.summary(), "ScDataset: 3 obs \u{00d7} 3 vars, 0 layers");
    }

    #[test]
    fn column_nnz_counts_dense() {
        let ds = sample_dataset();
        assert_eq!(ds.x().column_nnz_counts(), vec![2, 2, 2]);
    }
}
