//! Drift detection — determinism verification and history comparison.

use mobility_kernel::statistics::StateCounts;
use mobility_kernel::{CauseCounts, Evolution};

use crate::error::{Result, RuntimeError};
use crate::replay;
use crate::run::RunSpec;

/// Rebuild the same run twice and require identical hashes.
/// Returns the agreed hash.
pub fn verify_determinism(spec: &RunSpec, seed: u64) -> Result<String> {
    let first = replay::rebuild_hash(spec, seed)?;
    let second = replay::rebuild_hash(spec, seed)?;
    if first != second {
        return Err(RuntimeError::Determinism { first, second });
    }
    Ok(first)
}

/// Structured comparison of two runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub width_a: usize,
    pub width_b: usize,
    pub generations_a: usize,
    pub generations_b: usize,
    /// First row index at which the histories differ, if any.
    pub first_divergence: Option<usize>,
    /// Cells that differ between the final rows (compared up to the
    /// shorter width).
    pub final_cells_differing: usize,
    pub final_counts_a: StateCounts,
    pub final_counts_b: StateCounts,
    /// `b - a` per state, for the final rows.
    pub final_count_delta: [i64; 3],
    pub cause_totals_a: CauseCounts,
    pub cause_totals_b: CauseCounts,
}

impl DriftReport {
    pub fn is_identical(&self) -> bool {
        self.first_divergence.is_none()
    }
}

pub fn compare_histories(a: &Evolution, b: &Evolution) -> DriftReport {
    let first_divergence = a
        .history
        .iter()
        .zip(&b.history)
        .position(|(ra, rb)| ra != rb)
        .or_else(|| (a.history.len() != b.history.len()).then(|| a.history.len().min(b.history.len())));

    let empty = Vec::new();
    let final_a = a.final_row().unwrap_or(&empty);
    let final_b = b.final_row().unwrap_or(&empty);
    let final_cells_differing = final_a
        .iter()
        .zip(final_b)
        .filter(|(x, y)| x != y)
        .count();

    let final_counts_a = StateCounts::of(final_a);
    let final_counts_b = StateCounts::of(final_b);
    let delta = |get: fn(&StateCounts) -> usize| get(&final_counts_b) as i64 - get(&final_counts_a) as i64;

    DriftReport {
        width_a: a.width(),
        width_b: b.width(),
        generations_a: a.generations(),
        generations_b: b.generations(),
        first_divergence,
        final_cells_differing,
        final_counts_a,
        final_counts_b,
        final_count_delta: [
            delta(|c| c.struggling),
            delta(|c| c.stable),
            delta(|c| c.thriving),
        ],
        cause_totals_a: a.statistics.totals(),
        cause_totals_b: b.statistics.totals(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mobility_kernel::statistics::TransitionStatistics;
    use mobility_kernel::State::*;

    fn evo(history: Vec<Vec<mobility_kernel::State>>) -> Evolution {
        Evolution {
            history,
            statistics: TransitionStatistics::default(),
        }
    }

    #[test]
    fn identical_histories_report_no_drift() {
        let a = evo(vec![vec![Stable, Thriving], vec![Stable, Stable]]);
        let report = compare_histories(&a, &a.clone());
        assert!(report.is_identical());
        assert_eq!(report.final_cells_differing, 0);
        assert_eq!(report.final_count_delta, [0, 0, 0]);
    }

    #[test]
    fn divergence_and_deltas() {
        let a = evo(vec![vec![Stable, Stable], vec![Stable, Stable], vec![Struggling, Stable]]);
        let b = evo(vec![vec![Stable, Stable], vec![Thriving, Stable], vec![Thriving, Thriving]]);
        let report = compare_histories(&a, &b);
        assert_eq!(report.first_divergence, Some(1));
        assert_eq!(report.final_cells_differing, 2);
        assert_eq!(report.final_count_delta, [-1, -1, 2]);
    }

    #[test]
    fn length_mismatch_diverges_at_shorter_end() {
        let a = evo(vec![vec![Stable], vec![Stable]]);
        let b = evo(vec![vec![Stable]]);
        assert_eq!(compare_histories(&a, &b).first_divergence, Some(1));
    }
}
