//! Pathway activity inference from prior-knowledge gene sets.
//!
//! Scores each cell of an expression matrix against a resource of weighted
//! gene sets (pathway → gene → mode-of-regulation weight) with linear
//! models:
//!
//! - **MLM** ([`mlm_activity`]) — one multivariate model per cell: the cell's
//!   expression profile is regressed on all gene-set weight columns at once
//!   (plus an intercept); the activity score of a set is the t-value of its
//!   coefficient.
//! - **ULM** ([`ulm_activity`]) — one univariate model per cell and set.
//!
//! Two-tailed t p-values are corrected across gene sets within each cell via
//! [`crate::correction`].

use lexome_core::{Annotated, LexomeError, Result, Summarizable};

use crate::correction::{correct, CorrectionMethod};
use crate::regression::fit_multi_ols;

// ── Resource types ─────────────────────────────────────────────────────────

/// A named gene set with mode-of-regulation weights.
#[derive(Debug, Clone)]
pub struct WeightedGeneSet {
    /// Name of the gene set (e.g., pathway name).
    pub name: String,
    /// `(gene index, weight)` pairs. Indices are 0-based columns of the
    /// expression matrix.
    pub genes: Vec<(usize, f64)>,
}

impl Annotated for WeightedGeneSet {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Configuration for activity scoring.
#[derive(Debug, Clone)]
pub struct ActivityConfig {
    /// Minimum number of weighted genes a set needs to be scored.
    pub min_genes: usize,
    /// Correction applied across gene sets within each cell.
    pub correction: CorrectionMethod,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            min_genes: 5,
            correction: CorrectionMethod::BenjaminiHochberg,
        }
    }
}

/// Per-cell activity scores for a filtered set of gene sets.
#[derive(Debug, Clone)]
pub struct ActivityResult {
    /// Names of the scored gene sets (sets below `min_genes` are dropped).
    pub set_names: Vec<String>,
    /// t-value activity scores, one row per cell, one column per set.
    pub scores: Vec<Vec<f64>>,
    /// Raw two-tailed p-values, same layout as `scores`.
    pub p_values: Vec<Vec<f64>>,
    /// Corrected p-values, same layout as `scores`.
    pub p_adjusted: Vec<Vec<f64>>,
}

impl ActivityResult {
    /// Number of scored cells.
    pub fn n_cells(&self) -> usize {
        self.scores.len()
    }

    /// Number of scored gene sets.
    pub fn n_sets(&self) -> usize {
        self.set_names.len()
    }
}

impl Summarizable for ActivityResult {
    fn summary(&self) -> String {
        format!(
            "ActivityResult: {} cells \u{00d7} {} gene sets",
            self.n_cells(),
            self.n_sets(),
        )
    }
}

// ── Scoring entry points ───────────────────────────────────────────────────

/// Multivariate linear model activity scoring.
///
/// `expr` is row-major cells × genes with `n_genes` columns. All gene sets
/// are fit jointly per cell, so correlated pathways compete for variance.
/// Requires `n_genes` to exceed the number of usable sets + 1 (residual
/// degrees of freedom must be positive).
pub fn mlm_activity(
    expr: &[f64],
    n_genes: usize,
    gene_sets: &[WeightedGeneSet],
    config: &ActivityConfig,
) -> Result<ActivityResult> {
    let (n_cells, usable) = validate(expr, n_genes, gene_sets, config)?;

    let n_sets = usable.len();
    if n_genes <= n_sets + 1 {
        return Err(LexomeError::InvalidInput(format!(
            "mlm_activity: {} genes cannot support {} gene sets (need n_genes > n_sets + 1)",
            n_genes, n_sets,
        )));
    }

    // Shared design: genes × (intercept + one weight column per set)
    let mut design = vec![vec![0.0; n_sets + 1]; n_genes];
    for row in design.iter_mut() {
        row[0] = 1.0;
    }
    for (s, gs) in usable.iter().enumerate() {
        for &(g, w) in &gs.genes {
            design[g][s + 1] = w;
        }
    }

    let score_cell = |c: usize| -> Result<(Vec<f64>, Vec<f64>)> {
        let y = &expr[c * n_genes..(c + 1) * n_genes];
        let fit = fit_multi_ols(&design, y)?;
        // Coefficient 0 is the intercept; sets start at 1.
        let scores = fit.t_values[1..].to_vec();
        let pvals = fit.p_values[1..].to_vec();
        Ok((scores, pvals))
    };

    let per_cell = run_cells(n_cells, score_cell)?;
    finish(usable, per_cell, config)
}

/// Univariate linear model activity scoring.
///
/// Each gene set is fit alone (`expression ~ intercept + weight`) per cell;
/// the activity score is the t-value of the weight coefficient. Unlike MLM,
/// correlated pathways do not compete.
pub fn ulm_activity(
    expr: &[f64],
    n_genes: usize,
    gene_sets: &[WeightedGeneSet],
    config: &ActivityConfig,
) -> Result<ActivityResult> {
    let (n_cells, usable) = validate(expr, n_genes, gene_sets, config)?;

    if n_genes <= 2 {
        return Err(LexomeError::InvalidInput(
            "ulm_activity: need more than 2 genes for a univariate fit".into(),
        ));
    }

    // One two-column design per set: intercept + weights
    let designs: Vec<Vec<Vec<f64>>> = usable
        .iter()
        .map(|gs| {
            let mut d = vec![vec![1.0, 0.0]; n_genes];
            for &(g, w) in &gs.genes {
                d[g][1] = w;
            }
            d
        })
        .collect();

    let score_cell = |c: usize| -> Result<(Vec<f64>, Vec<f64>)> {
        let y = &expr[c * n_genes..(c + 1) * n_genes];
        let mut scores = Vec::with_capacity(designs.len());
        let mut pvals = Vec::with_capacity(designs.len());
        for d in &designs {
            let fit = fit_multi_ols(d, y)?;
            scores.push(fit.t_values[1]);
            pvals.push(fit.p_values[1]);
        }
        Ok((scores, pvals))
    };

    let per_cell = run_cells(n_cells, score_cell)?;
    finish(usable, per_cell, config)
}

// ── Internals ──────────────────────────────────────────────────────────────

/// Validate inputs and return `(n_cells, usable gene sets)`.
fn validate<'a>(
    expr: &[f64],
    n_genes: usize,
    gene_sets: &'a [WeightedGeneSet],
    config: &ActivityConfig,
) -> Result<(usize, Vec<&'a WeightedGeneSet>)> {
    if n_genes == 0 {
        return Err(LexomeError::InvalidInput(
            "activity: n_genes must be > 0".into(),
        ));
    }
    if expr.is_empty() || expr.len() % n_genes != 0 {
        return Err(LexomeError::InvalidInput(format!(
            "activity: expression length ({}) is not a multiple of n_genes ({})",
            expr.len(),
            n_genes,
        )));
    }
    if gene_sets.is_empty() {
        return Err(LexomeError::InvalidInput(
            "activity: gene_sets must be non-empty".into(),
        ));
    }
    for gs in gene_sets {
        let mut seen = std::collections::HashSet::new();
        for &(g, _) in &gs.genes {
            if g >= n_genes {
                return Err(LexomeError::InvalidInput(format!(
                    "activity: gene set '{}' contains index {} >= n_genes {}",
                    gs.name, g, n_genes,
                )));
            }
            if !seen.insert(g) {
                return Err(LexomeError::InvalidInput(format!(
                    "activity: gene set '{}' lists gene {} twice",
                    gs.name, g,
                )));
            }
        }
    }

    let usable: Vec<&WeightedGeneSet> = gene_sets
        .iter()
        .filter(|gs| gs.genes.len() >= config.min_genes)
        .collect();
    if usable.is_empty() {
        return Err(LexomeError::InvalidInput(format!(
            "activity: no gene set has at least {} genes",
            config.min_genes,
        )));
    }

    Ok((expr.len() / n_genes, usable))
}

/// Run the per-cell scorer over all cells, in parallel when enabled.
#[cfg(feature = "parallel")]
fn run_cells<F>(n_cells: usize, score_cell: F) -> Result<Vec<(Vec<f64>, Vec<f64>)>>
where
    F: Fn(usize) -> Result<(Vec<f64>, Vec<f64>)> + Sync + Send,
{
    use rayon::prelude::*;
    (0..n_cells).into_par_iter().map(score_cell).collect()
}

#[cfg(not(feature = "parallel"))]
fn run_cells<F>(n_cells: usize, score_cell: F) -> Result<Vec<(Vec<f64>, Vec<f64>)>>
where
    F: Fn(usize) -> Result<(Vec<f64>, Vec<f64>)>,
{
    (0..n_cells).map(score_cell).collect()
}

/// Assemble the result matrices and apply per-cell correction.
fn finish(
    usable: Vec<&WeightedGeneSet>,
    per_cell: Vec<(Vec<f64>, Vec<f64>)>,
    config: &ActivityConfig,
) -> Result<ActivityResult> {
    let set_names: Vec<String> = usable.iter().map(|gs| gs.name.clone()).collect();

    let mut scores = Vec::with_capacity(per_cell.len());
    let mut p_values = Vec::with_capacity(per_cell.len());
    let mut p_adjusted = Vec::with_capacity(per_cell.len());
    for (cell_scores, cell_p) in per_cell {
        let adj = correct(&cell_p, config.correction)?;
        scores.push(cell_scores);
        p_values.push(cell_p);
        p_adjusted.push(adj);
    }

    Ok(ActivityResult {
        set_names,
        scores,
        p_values,
        p_adjusted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 cells × 12 genes; cell 0 expresses the "alpha" program, cell 1 the
    /// "beta" program. Small varied background keeps residuals nonzero.
    fn sample_expr() -> (Vec<f64>, usize) {
        let alpha_cell = vec![
            5.1, 4.9, 5.2, 4.8, 5.0, // alpha program genes
            0.1, 0.2, 0.1, 0.2, 0.1, // beta program genes
            0.05, 0.15, // background
        ];
        let beta_cell = vec![
            0.2, 0.1, 0.2, 0.1, 0.1, //
            4.8, 5.2, 4.9, 5.1, 5.0, //
            0.1, 0.05,
        ];
        let mut expr = alpha_cell;
        expr.extend(beta_cell);
        (expr, 12)
    }

    fn sample_sets() -> Vec<WeightedGeneSet> {
        vec![
            WeightedGeneSet {
                name: "alpha".into(),
                genes: (0..5).map(|g| (g, 1.0)).collect(),
            },
            WeightedGeneSet {
                name: "beta".into(),
                genes: (5..10).map(|g| (g, 1.0)).collect(),
            },
        ]
    }

    #[test]
    fn mlm_scores_track_programs() {
        let (expr, n_genes) = sample_expr();
        let result =
            mlm_activity(&expr, n_genes, &sample_sets(), &ActivityConfig::default()).unwrap();

        assert_eq!(result.set_names, vec!["alpha", "beta"]);
        assert_eq!(result.n_cells(), 2);
        // Cell 0 is the alpha program: alpha score dominates, and vice versa.
        assert!(result.scores[0][0] > result.scores[0][1]);
        assert!(result.scores[1][1] > result.scores[1][0]);
        assert!(result.scores[0][0] > 0.0);
        assert!(result.p_values[0][0] < 0.01, "p={}", result.p_values[0][0]);
    }

    #[test]
    fn ulm_scores_track_programs() {
        let (expr, n_genes) = sample_expr();
        let result =
            ulm_activity(&expr, n_genes, &sample_sets(), &ActivityConfig::default()).unwrap();

        assert!(result.scores[0][0] > result.scores[0][1]);
        assert!(result.scores[1][1] > result.scores[1][0]);
    }

    #[test]
    fn negative_weights_flip_sign() {
        let (expr, n_genes) = sample_expr();
        let sets = vec![WeightedGeneSet {
            name: "alpha_repressed".into(),
            genes: (0..5).map(|g| (g, -1.0)).collect(),
        }];
        let result = ulm_activity(&expr, n_genes, &sets, &ActivityConfig::default()).unwrap();
        // Cell 0 strongly expresses the (negatively weighted) genes → negative activity
        assert!(result.scores[0][0] < 0.0);
    }

    #[test]
    fn adjusted_not_below_raw() {
        let (expr, n_genes) = sample_expr();
        let result =
            mlm_activity(&expr, n_genes, &sample_sets(), &ActivityConfig::default()).unwrap();
        for (row_p, row_adj) in result.p_values.iter().zip(result.p_adjusted.iter()) {
            for (&p, &adj) in row_p.iter().zip(row_adj.iter()) {
                assert!(adj >= p - 1e-15);
            }
        }
    }

    #[test]
    fn min_genes_drops_small_sets() {
        let (expr, n_genes) = sample_expr();
        let mut sets = sample_sets();
        sets.push(WeightedGeneSet {
            name: "tiny".into(),
            genes: vec![(10, 1.0), (11, 1.0)],
        });
        let result =
            mlm_activity(&expr, n_genes, &sets, &ActivityConfig::default()).unwrap();
        assert_eq!(result.set_names, vec!["alpha", "beta"]);
    }

    #[test]
    fn all_sets_below_min_genes_errors() {
        let (expr, n_genes) = sample_expr();
        let sets = vec![WeightedGeneSet {
            name: "tiny".into(),
            genes: vec![(0, 1.0)],
        }];
        assert!(mlm_activity(&expr, n_genes, &sets, &ActivityConfig::default()).is_err());
    }

    #[test]
    fn gene_index_out_of_range_errors() {
        let (expr, n_genes) = sample_expr();
        let sets = vec![WeightedGeneSet {
            name: "bad".into(),
            genes: (0..4).map(|g| (g, 1.0)).chain([(99, 1.0)]).collect(),
        }];
        assert!(mlm_activity(&expr, n_genes, &sets, &ActivityConfig::default()).is_err());
    }

    #[test]
    fn duplicate_gene_in_set_errors() {
        let (expr, n_genes) = sample_expr();
        let sets = vec![WeightedGeneSet {
            name: "dup".into(),
            genes: vec![(0, 1.0), (1, 1.0), (2, 1.0), (3, 1.0), (0, 0.5)],
        }];
        assert!(mlm_activity(&expr, n_genes, &sets, &ActivityConfig::default()).is_err());
    }

    #[test]
    fn expression_length_mismatch_errors() {
        let sets = sample_sets();
        assert!(mlm_activity(&[1.0, 2.0, 3.0], 2, &sets, &ActivityConfig::default()).is_err());
    }

    #[test]
    fn empty_gene_sets_errors() {
        let (expr, n_genes) = sample_expr();
        assert!(mlm_activity(&expr, n_genes, &[], &ActivityConfig::default()).is_err());
    }

    #[test]
    fn too_many_sets_for_gene_count_errors() {
        // 4 genes, 3 sets of 1 gene each (min_genes=1) → df would be 0
        let expr = vec![1.0, 2.0, 3.0, 4.0];
        let sets: Vec<WeightedGeneSet> = (0..3)
            .map(|s| WeightedGeneSet {
                name: format!("s{}", s),
                genes: vec![(s, 1.0)],
            })
            .collect();
        let config = ActivityConfig {
            min_genes: 1,
            ..Default::default()
        };
        assert!(mlm_activity(&expr, 4, &sets, &config).is_err());
    }

    #[test]
    fn summary_format() {
        let (expr, n_genes) = sample_expr();
        let result =
            mlm_activity(&expr, n_genes, &sample_sets(), &ActivityConfig::default()).unwrap();
        assert_eq!(result.summary(), "ActivityResult: 2 cells \u{00d7} 2 gene sets");
    }
}
