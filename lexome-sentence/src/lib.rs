//! Cell sentences for the Lexome single-cell ecosystem.
//!
//! A *cell sentence* is the ordered list of gene names in one cell, ranked by
//! descending expression with zero-expression genes omitted. The rank
//! structure carries enough signal that a single linear model of expression
//! against log-rank approximately inverts the transform (Levine et al. 2023).
//!
//! - **Vocabulary** — [`Vocabulary`]: per-dataset gene list with
//!   expressing-cell counts
//! - **Transform** — [`CellSentence`], [`dataset_to_sentences`]
//! - **Inverse** — [`RankModel`], [`fit_rank_model`], [`reconstruct_expression`]
//! - **Evaluation** — [`evaluate_round_trip`]
//! - **Persistence** — fitted parameters, sentences, and vocabularies on disk
//!
//! # Example
//!
//! ```
//! use lexome_omics::{MatrixData, ScDataset};
//! use lexome_sentence::{dataset_to_sentences, Vocabulary};
//!
//! let ds = ScDataset::new(
//!     MatrixData::Dense(vec![vec![0.0, 2.0, 1.0]]),
//!     vec!["cell_1".into()],
//!     vec!["CD3D".into(), "MS4A1".into(), "NKG7".into()],
//! ).unwrap();
//! let vocab = Vocabulary::from_dataset(&ds).unwrap();
//! let sentences = dataset_to_sentences(&ds).unwrap();
//! assert_eq!(sentences[0].render(&vocab, " ").unwrap(), "MS4A1 NKG7");
//! ```

pub mod eval;
pub mod persist;
pub mod reconstruct;
pub mod transform;
pub mod vocab;

pub use eval::{evaluate_round_trip, RoundTripReport};
pub use persist::{
    read_fit_records, read_sentences, read_vocabulary, write_fit_records, write_sentences,
    write_vocabulary, FitRecord,
};
pub use reconstruct::{fit_rank_model, reconstruct_expression, RankModel, UnknownGenePolicy};
pub use transform::{dataset_to_sentences, CellSentence};
pub use vocab::Vocabulary;
