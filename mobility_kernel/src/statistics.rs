/// Mobility Kernel — Run Statistics
///
/// Derived bookkeeping over a history. Nothing here is authoritative;
/// every figure can be recomputed from the rows (except causes, which
/// the driver records as it resolves).

use serde::{Deserialize, Serialize};

use crate::domain::{CauseCounts, Row, State, TransitionCause};

/// Cause counts for each evolved generation (initial row excluded).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionStatistics {
    pub per_generation: Vec<CauseCounts>,
}

impl TransitionStatistics {
    pub fn push(&mut self, counts: CauseCounts) {
        self.per_generation.push(counts);
    }

    /// Totals over the whole run.
    pub fn totals(&self) -> CauseCounts {
        let mut totals = CauseCounts::default();
        for counts in &self.per_generation {
            totals.random += counts.random;
            totals.inheritance += counts.inheritance;
            totals.intervention += counts.intervention;
            totals.rule += counts.rule;
        }
        totals
    }

    /// Time series for one cause, one value per evolved generation.
    pub fn series(&self, cause: TransitionCause) -> Vec<usize> {
        self.per_generation.iter().map(|c| c.get(cause)).collect()
    }
}

/// Count of cells in each state for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub struggling: usize,
    pub stable: usize,
    pub thriving: usize,
}

impl StateCounts {
    pub fn of(row: &[State]) -> Self {
        let mut counts = Self::default();
        for state in row {
            match state {
                State::Struggling => counts.struggling += 1,
                State::Stable => counts.stable += 1,
                State::Thriving => counts.thriving += 1,
            }
        }
        counts
    }

    pub fn get(&self, state: State) -> usize {
        match state {
            State::Struggling => self.struggling,
            State::Stable => self.stable,
            State::Thriving => self.thriving,
        }
    }
}

/// Per-row state counts, one entry per row in the history.
pub fn state_distribution(history: &[Row]) -> Vec<StateCounts> {
    history.iter().map(|row| StateCounts::of(row)).collect()
}

/// How many cells moved up, moved down or stayed between two rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mobility {
    pub rose: usize,
    pub fell: usize,
    pub unchanged: usize,
}

/// Mobility for each consecutive pair of rows. Rows must share a width.
pub fn mobility(history: &[Row]) -> Vec<Mobility> {
    history
        .windows(2)
        .map(|pair| {
            let mut m = Mobility::default();
            for (before, after) in pair[0].iter().zip(&pair[1]) {
                match after.cmp(before) {
                    std::cmp::Ordering::Greater => m.rose += 1,
                    std::cmp::Ordering::Less => m.fell += 1,
                    std::cmp::Ordering::Equal => m.unchanged += 1,
                }
            }
            m
        })
        .collect()
}
