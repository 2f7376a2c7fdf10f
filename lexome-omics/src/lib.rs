//! Single-cell expression data structures for the Lexome ecosystem.
//!
//! This crate provides the data model the rest of Lexome operates on:
//!
//! - **Containers** — [`ScDataset`], an AnnData-like cells × genes container
//! - **Sparse matrices** — [`SparseMatrix`] in COO format
//! - **Preprocessing** — total-count normalization, log rebasing, QC filters
//! - **Tabular I/O** — CSV round-trip for dense expression tables
//!
//! # Quick start
//!
//! ```
//! use lexome_omics::{MatrixData, ScDataset};
//! use lexome_core::Summarizable;
//!
//! let x = MatrixData::Dense(vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
//! let ds = ScDataset::new(
//!     x,
//!     vec!["cell_1".into(), "cell_2".into()],
//!     vec!["CD3D".into(), "MS4A1".into()],
//! ).unwrap();
//! assert_eq!(ds.shape(), (2, 2));
//! ```

pub mod io;
pub mod preprocess;
pub mod single_cell;
pub mod sparse;

pub use io::{read_expression_csv, write_expression_csv};
pub use preprocess::{
    filter_cells, filter_genes, normalize_total, rebase_log10, FilterConfig, NormalizeConfig,
};
pub use single_cell::{CellQc, ColumnData, MatrixData, ScDataset};
pub use sparse::SparseMatrix;
