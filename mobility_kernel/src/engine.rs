/// Mobility Kernel — Evolution Driver
///
/// Generation t+1 is computed from the complete row t, cells resolved
/// in increasing position order. A finished row is pushed onto the
/// history before the next generation reads it.
///
/// Determinism: given the same initial row, table, configuration and
/// random-draw sequence, the history is identical.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use tracing::{debug, trace, warn};

use crate::config::SimulationConfig;
use crate::domain::{CauseCounts, Evolution, Neighborhood, Row, State};
use crate::error::KernelError;
use crate::invariants::validate_run;
use crate::rules::RuleTable;
use crate::statistics::TransitionStatistics;
use crate::transitions::resolve;

/// Validate, then evolve `initial` for `config.generations` rows.
pub fn evolve<R: Rng + ?Sized>(
    initial: &[State],
    table: &RuleTable,
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Evolution, KernelError> {
    let automaton = Automaton::new(initial.to_vec(), *table, *config)?;
    Ok(automaton.run(rng))
}

/// Stateful driver over one run. The table and configuration are
/// fixed at construction.
#[derive(Debug, Clone)]
pub struct Automaton {
    table: RuleTable,
    config: SimulationConfig,
    history: Vec<Row>,
    statistics: TransitionStatistics,
}

impl Automaton {
    /// Validate inputs and seed the history with the initial row.
    pub fn new(
        initial: Row,
        table: RuleTable,
        config: SimulationConfig,
    ) -> Result<Self, KernelError> {
        validate_run(&initial, &config)?;
        let mut history = Vec::with_capacity(config.generations);
        history.push(initial);
        Ok(Self {
            table,
            config,
            history,
            statistics: TransitionStatistics::default(),
        })
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn history(&self) -> &[Row] {
        &self.history
    }

    pub fn statistics(&self) -> &TransitionStatistics {
        &self.statistics
    }

    /// Latest completed row.
    pub fn current(&self) -> &Row {
        // history always holds at least the initial row
        &self.history[self.history.len() - 1]
    }

    /// Number of evolved generations so far (initial row excluded).
    pub fn completed(&self) -> usize {
        self.history.len() - 1
    }

    pub fn is_finished(&self) -> bool {
        self.history.len() >= self.config.generations
    }

    /// Compute one generation. Returns its cause counts, or `None` once
    /// the configured number of generations has been reached.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<CauseCounts> {
        if self.is_finished() {
            return None;
        }
        let (next, counts) = next_row(self.current(), &self.table, &self.config, rng);
        trace!(
            generation = self.history.len(),
            random = counts.random,
            inheritance = counts.inheritance,
            intervention = counts.intervention,
            rule = counts.rule,
            "generation resolved"
        );
        self.history.push(next);
        self.statistics.push(counts);
        Some(counts)
    }

    /// Run to completion.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> Evolution {
        debug!(
            width = self.config.width,
            generations = self.config.generations,
            randomness = self.config.randomness.enabled,
            modifiers = self.config.modifiers_enabled,
            "evolution started"
        );
        while self.step(rng).is_some() {}
        debug!(generations = self.history.len(), "evolution finished");
        self.into_evolution()
    }

    /// Run to completion unless `cancel` is set. The flag is read
    /// between generations only, never mid-row.
    pub fn run_until_cancelled<R: Rng + ?Sized>(
        mut self,
        rng: &mut R,
        cancel: &AtomicBool,
    ) -> Result<Evolution, KernelError> {
        while !self.is_finished() {
            if cancel.load(Ordering::Relaxed) {
                warn!(completed = self.completed(), "evolution cancelled");
                return Err(KernelError::Cancelled {
                    completed: self.completed(),
                });
            }
            self.step(rng);
        }
        Ok(self.into_evolution())
    }

    pub fn into_evolution(self) -> Evolution {
        Evolution {
            history: self.history,
            statistics: self.statistics,
        }
    }
}

fn next_row<R: Rng + ?Sized>(
    current: &[State],
    table: &RuleTable,
    config: &SimulationConfig,
    rng: &mut R,
) -> (Row, CauseCounts) {
    let mut next = Vec::with_capacity(current.len());
    let mut counts = CauseCounts::default();
    for position in 0..current.len() {
        let transition = resolve(Neighborhood::of(current, position), table, config, rng);
        counts.record(transition.cause);
        next.push(transition.state);
    }
    (next, counts)
}
