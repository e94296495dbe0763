#![forbid(unsafe_code)]

//! Three-state mobility automaton kernel.
//!
//! Rule tables, the transition resolver and the evolution driver.
//! Pure and deterministic: the only source of variation is the random
//! source the caller passes in.

/// Kernel v1. Changes to resolution order or canonical hashing require v2.
pub const KERNEL_VERSION: u32 = 1;

pub mod error;
pub mod domain;
pub mod config;
pub mod state;
pub mod rules;
pub mod transitions;
pub mod statistics;
pub mod invariants;
pub mod hashing;
pub mod engine;

pub use config::{RandomnessConfig, SimulationConfig};
pub use domain::{CauseCounts, Evolution, Neighborhood, Row, State, Transition, TransitionCause};
pub use engine::{evolve, Automaton};
pub use state::InitialRow;
pub use error::KernelError;
pub use rules::{build_rule_table, BehavioralModel, RuleEntry, RulePreset, RuleSource, RuleTable};
pub use transitions::resolve;
