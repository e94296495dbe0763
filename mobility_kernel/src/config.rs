/// Mobility Kernel — Simulation Configuration
///
/// Configuration is pure data, built once and passed explicitly into
/// every run. Nothing here is ambient or global.

use serde::{Deserialize, Serialize};

/// Default row width of the interactive phase programs.
pub const DEFAULT_WIDTH: usize = 101;
/// Default number of generations, initial row included.
pub const DEFAULT_GENERATIONS: usize = 50;

/// Stochastic override settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RandomnessConfig {
    pub enabled: bool,
    /// Per-cell, per-generation override probability in [0, 1].
    pub probability: f64,
}

impl RandomnessConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            probability: 0.0,
        }
    }

    pub fn with_probability(probability: f64) -> Self {
        Self {
            enabled: true,
            probability,
        }
    }
}

impl Default for RandomnessConfig {
    fn default() -> Self {
        Self::with_probability(0.01)
    }
}

/// Immutable per-run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub width: usize,
    /// Total rows in the history, initial row included. Must be ≥ 1.
    pub generations: usize,
    pub randomness: RandomnessConfig,
    /// Inheritance and intervention overrides.
    pub modifiers_enabled: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::social()
    }
}

impl SimulationConfig {
    /// Table lookup only.
    pub fn basic() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            generations: DEFAULT_GENERATIONS,
            randomness: RandomnessConfig::disabled(),
            modifiers_enabled: false,
        }
    }

    /// Random override, then table lookup.
    pub fn stochastic() -> Self {
        Self {
            randomness: RandomnessConfig::with_probability(0.10),
            ..Self::basic()
        }
    }

    /// Random override, inheritance, intervention, then table lookup.
    pub fn social() -> Self {
        Self {
            randomness: RandomnessConfig::with_probability(0.01),
            modifiers_enabled: true,
            ..Self::basic()
        }
    }

    pub fn with_width(self, width: usize) -> Self {
        Self { width, ..self }
    }

    pub fn with_generations(self, generations: usize) -> Self {
        Self { generations, ..self }
    }

    pub fn with_randomness(self, randomness: RandomnessConfig) -> Self {
        Self { randomness, ..self }
    }

    pub fn with_modifiers(self, modifiers_enabled: bool) -> Self {
        Self {
            modifiers_enabled,
            ..self
        }
    }
}
