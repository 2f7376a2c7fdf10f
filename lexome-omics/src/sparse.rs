//! Coordinate-format (COO) sparse matrix.
//!
//! [`SparseMatrix`] stores non-zero entries as `(row, col, value)` triplets —
//! the natural import format for single-cell count matrices, where well over
//! 90% of entries are typically zero. Rows are cells, columns are genes.

use lexome_core::{LexomeError, Result, Summarizable};

/// A sparse matrix in COO (coordinate) format.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl SparseMatrix {
    /// Create an empty sparse matrix with the given dimensions.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            rows: Vec::new(),
            cols: Vec::new(),
            values: Vec::new(),
            n_rows,
            n_cols,
        }
    }

    /// Create a sparse matrix from triplet vectors.
    ///
    /// All three vectors must have the same length, and all indices must be
    /// within bounds.
    pub fn from_triplets(
        rows: Vec<usize>,
        cols: Vec<usize>,
        values: Vec<f64>,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<Self> {
        if rows.len() != cols.len() || cols.len() != values.len() {
            return Err(LexomeError::InvalidInput(
                "rows, cols, and values must have the same length".into(),
            ));
        }
        for (i, (&r, &c)) in rows.iter().zip(cols.iter()).enumerate() {
            if r >= n_rows || c >= n_cols {
                return Err(LexomeError::InvalidInput(format!(
                    "triplet {i} index ({r}, {c}) out of bounds for ({n_rows}, {n_cols})"
                )));
            }
        }
        Ok(Self {
            rows,
            cols,
            values,
            n_rows,
            n_cols,
        })
    }

    /// Create a sparse matrix from dense data, storing values with `|value| > 0`.
    pub fn from_dense(data: &[Vec<f64>]) -> Self {
        let n_rows = data.len();
        let n_cols = data.first().map_or(0, |r| r.len());
        let mut rows = Vec::new();
        let mut cols = Vec::new();
        let mut values = Vec::new();

        for (r, row) in data.iter().enumerate() {
            for (c, &val) in row.iter().enumerate() {
                if val != 0.0 {
                    rows.push(r);
                    cols.push(c);
                    values.push(val);
                }
            }
        }

        Self {
            rows,
            cols,
            values,
            n_rows,
            n_cols,
        }
    }

    /// Insert a single entry. Returns an error if indices are out of bounds.
    ///
    /// Does not deduplicate — the first matching triplet wins on [`get`](Self::get).
    pub fn insert(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.n_rows || col >= self.n_cols {
            return Err(LexomeError::InvalidInput(format!(
                "index ({row}, {col}) out of bounds for ({}, {})",
                self.n_rows, self.n_cols
            )));
        }
        self.rows.push(row);
        self.cols.push(col);
        self.values.push(value);
        Ok(())
    }

    /// Get the value at `(row, col)`. Returns 0.0 if no entry is stored.
    ///
    /// This is an O(nnz) scan.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        for i in 0..self.values.len() {
            if self.rows[i] == row && self.cols[i] == col {
                return self.values[i];
            }
        }
        0.0
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Fraction of entries that are stored: `nnz / (n_rows * n_cols)`.
    pub fn density(&self) -> f64 {
        let total = self.n_rows as f64 * self.n_cols as f64;
        if total == 0.0 {
            return 0.0;
        }
        self.values.len() as f64 / total
    }

    /// (n_rows, n_cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Convert to a dense 2D vector.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.n_cols]; self.n_rows];
        for i in 0..self.values.len() {
            dense[self.rows[i]][self.cols[i]] = self.values[i];
        }
        dense
    }

    /// Iterate over stored triplets `(row, col, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .zip(self.cols.iter())
            .zip(self.values.iter())
            .map(|((&r, &c), &v)| (r, c, v))
    }

    /// Sum of values in each row.
    pub fn row_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_rows];
        for i in 0..self.values.len() {
            sums[self.rows[i]] += self.values[i];
        }
        sums
    }

    /// Sum of values in each column.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_cols];
        for i in 0..self.values.len() {
            sums[self.cols[i]] += self.values[i];
        }
        sums
    }

    /// Mean value of each column (zeros included in the denominator).
    pub fn column_means(&self) -> Vec<f64> {
        if self.n_rows == 0 {
            return vec![0.0; self.n_cols];
        }
        let n = self.n_rows as f64;
        self.column_sums().into_iter().map(|s| s / n).collect()
    }

    /// Number of stored entries with a nonzero value in each row.
    pub fn row_nnz_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_rows];
        for i in 0..self.values.len() {
            if self.values[i] != 0.0 {
                counts[self.rows[i]] += 1;
            }
        }
        counts
    }

    /// Number of stored entries with a nonzero value in each column.
    ///
    /// For a cells × genes matrix this is the per-gene count of expressing
    /// cells, the quantity a sentence vocabulary records.
    pub fn column_nnz_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_cols];
        for i in 0..self.values.len() {
            if self.values[i] != 0.0 {
                counts[self.cols[i]] += 1;
            }
        }
        counts
    }

    /// Multiply every entry of row `i` by `factors[i]`.
    ///
    /// `factors` must have length `n_rows`.
    pub fn scale_rows(&mut self, factors: &[f64]) -> Result<()> {
        if factors.len() != self.n_rows {
            return Err(LexomeError::InvalidInput(format!(
                "scale_rows: factors length ({}) does not match n_rows ({})",
                factors.len(),
                self.n_rows
            )));
        }
        for i in 0..self.values.len() {
            self.values[i] *= factors[self.rows[i]];
        }
        Ok(())
    }

    /// Apply `f` to every stored value in place.
    ///
    /// Structural zeros are untouched, so `f` should map 0 to 0 if the caller
    /// needs a uniform transform.
    pub fn map_values<F: Fn(f64) -> f64>(&mut self, f: F) {
        for v in self.values.iter_mut() {
            *v = f(*v);
        }
    }

    /// Extract one row as a dense vector of length `n_cols`.
    pub fn row_dense(&self, row: usize) -> Vec<f64> {
        let mut out = vec![0.0; self.n_cols];
        for i in 0..self.values.len() {
            if self.rows[i] == row {
                out[self.cols[i]] = self.values[i];
            }
        }
        out
    }
}

impl Summarizable for SparseMatrix {
    fn summary(&self) -> String {
        format!(
            "SparseMatrix: {}\u{00d7}{}, {} nonzeros ({:.2}% density)",
            self.n_rows,
            self.n_cols,
            self.nnz(),
            self.density() * 100.0
        )
    }
}
