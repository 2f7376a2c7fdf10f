//! Statistical methods for the Lexome single-cell ecosystem.
//!
//! - **Descriptive statistics** — mean, variance, standard deviation
//! - **Distributions** — numerical helpers for t-distribution p-values
//! - **Ranking** — tie-aware rank transforms
//! - **Correlation** — Pearson and Spearman coefficients
//! - **Multiple testing correction** — Bonferroni, Benjamini-Hochberg
//! - **Regression** — simple and multi-covariate ordinary least squares
//! - **Pathway activity** — per-cell linear-model scoring against weighted
//!   gene sets

pub mod activity;
pub mod correction;
pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod rank;
pub mod regression;

pub use activity::{mlm_activity, ulm_activity, ActivityConfig, ActivityResult, WeightedGeneSet};
pub use correction::{benjamini_hochberg, bonferroni, correct, CorrectionMethod};
pub use correlation::{pearson, spearman};
pub use descriptive::{mean, std_dev, variance};
pub use rank::{rank, RankMethod};
pub use regression::{fit_ols, fit_multi_ols, LinearFit, MultiOlsFit};
