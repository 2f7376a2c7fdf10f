//! Tie-aware rank transforms.
//!
//! Two strategies cover everything this workspace needs: [`RankMethod::Average`]
//! feeds Spearman correlation, and [`RankMethod::Ordinal`] gives the strict
//! 1..n ordering that cell-sentence generation relies on (ties broken by
//! original position, deterministically).

/// Strategy for handling tied values when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMethod {
    /// Tied values receive the average of their would-be ranks.
    Average,
    /// Tied values receive sequential ranks; earlier positions rank lower.
    Ordinal,
}

/// Assign ascending ranks (1-based) to `data` using the given [`RankMethod`].
///
/// Returns a `Vec<f64>` of the same length as `data`. Empty input produces
/// empty output.
pub fn rank(data: &[f64], method: RankMethod) -> Vec<f64> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| data[a].total_cmp(&data[b]).then(a.cmp(&b)));

    let mut ranks = vec![0.0; n];
    match method {
        RankMethod::Ordinal => {
            for (pos, &idx) in order.iter().enumerate() {
                ranks[idx] = (pos + 1) as f64;
            }
        }
        RankMethod::Average => {
            let mut i = 0;
            while i < n {
                let mut j = i + 1;
                while j < n && data[order[j]].total_cmp(&data[order[i]]).is_eq() {
                    j += 1;
                }
                // Tie group spans sorted positions i..j, ranks (i+1)..=j.
                let avg = (i + j + 1) as f64 / 2.0;
                for &idx in &order[i..j] {
                    ranks[idx] = avg;
                }
                i = j;
            }
        }
    }

    ranks
}
