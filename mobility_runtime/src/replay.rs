//! Replay orchestrator — rebuild a run from its specification and seed.
//!
//! Delegates all domain logic to the kernel. Each call owns a fresh
//! `ChaCha8Rng`, so concurrent replays never share generator state.

use std::sync::atomic::AtomicBool;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use mobility_kernel::hashing::canonical_hash;
use mobility_kernel::{build_rule_table, Automaton};

use crate::error::Result;
use crate::run::{RunRecord, RunSpec};

/// Rebuild a run:
///
/// 1. Seed a private ChaCha8 generator
/// 2. Build the rule table, then the initial row
/// 3. Evolve and hash
pub fn rebuild(spec: &RunSpec, seed: u64) -> Result<RunRecord> {
    rebuild_cancellable(spec, seed, &AtomicBool::new(false))
}

/// As [`rebuild`], checking `cancel` between generations.
pub fn rebuild_cancellable(spec: &RunSpec, seed: u64, cancel: &AtomicBool) -> Result<RunRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let table = build_rule_table(&spec.rules, &mut rng)?;
    let initial = spec.initial.build(spec.config.width, &mut rng)?;
    let automaton = Automaton::new(initial, table, spec.config)?;
    let evolution = automaton.run_until_cancelled(&mut rng, cancel)?;
    let hash = canonical_hash(&evolution);
    debug!(seed, hash = %hash, "run rebuilt");
    Ok(RunRecord {
        seed,
        table,
        evolution,
        hash,
    })
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(spec: &RunSpec, seed: u64) -> Result<String> {
    Ok(rebuild(spec, seed)?.hash)
}
