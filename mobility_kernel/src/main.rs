/// Mobility Kernel — Scenario Harness
///
/// Loads scenario fixtures, runs each one twice from its seed and
/// compares canonical hashes: run 1 against run 2 (determinism) and
/// against the recorded hash when the fixture carries one.
///
/// Usage: mobility_kernel [scenarios.json]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing::{info, warn};

use mobility_kernel::hashing::{canonical_hash, table_hash};
use mobility_kernel::{build_rule_table, evolve, InitialRow, RuleSource, SimulationConfig};

const DEFAULT_FIXTURES: [&str; 3] = [
    "scenarios.json",
    "tests/golden/scenarios.json",
    "mobility_kernel/tests/golden/scenarios.json",
];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Scenario {
    name: String,
    seed: u64,
    rules: RuleSource,
    #[serde(default)]
    initial: InitialRow,
    config: SimulationConfig,
    #[serde(default)]
    expected_hash: Option<String>,
}

struct Outcome {
    hash: String,
    table: String,
    thriving_final: usize,
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn run() -> Result<bool> {
    let path = fixture_path()?;
    info!(path = %path.display(), "loading scenarios");
    let data = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let scenarios: Vec<Scenario> =
        serde_json::from_str(&data).context("parsing scenario fixtures")?;

    let mut passed = 0;
    for scenario in &scenarios {
        let first = run_scenario(scenario)?;
        let second = run_scenario(scenario)?;

        let deterministic = first.hash == second.hash;
        let golden = scenario
            .expected_hash
            .as_deref()
            .map_or(true, |expected| expected == first.hash);

        if deterministic && golden {
            passed += 1;
            println!(
                "[PASS] {}: hash={} table={} thriving_final={}",
                scenario.name, first.hash, &first.table[..12], first.thriving_final
            );
        } else {
            println!("[FAIL] {}:", scenario.name);
            if !deterministic {
                println!("  Determinism fail: run1={} run2={}", first.hash, second.hash);
            }
            if let (false, Some(expected)) = (golden, &scenario.expected_hash) {
                println!("  Hash mismatch: got={} expected={}", first.hash, expected);
            }
        }
    }

    println!("\n===========================================");
    println!("Results: {}/{} passed", passed, scenarios.len());
    if passed != scenarios.len() {
        warn!("some scenarios failed");
    }
    Ok(passed == scenarios.len())
}

/// Rule table first, then the initial row, then evolution, all from
/// one seeded source.
fn run_scenario(scenario: &Scenario) -> Result<Outcome> {
    let mut rng = ChaCha8Rng::seed_from_u64(scenario.seed);
    let table = build_rule_table(&scenario.rules, &mut rng)?;
    let initial = scenario.initial.build(scenario.config.width, &mut rng)?;
    let evolution = evolve(&initial, &table, &scenario.config, &mut rng)?;

    let thriving_final = evolution
        .final_row()
        .map(|row| row.iter().filter(|s| **s == mobility_kernel::State::Thriving).count())
        .unwrap_or(0);

    Ok(Outcome {
        hash: canonical_hash(&evolution),
        table: table_hash(&table),
        thriving_final,
    })
}

fn fixture_path() -> Result<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(PathBuf::from(arg));
    }
    match DEFAULT_FIXTURES.iter().map(Path::new).find(|p| p.exists()) {
        Some(p) => Ok(p.to_path_buf()),
        None => bail!(
            "no scenario fixtures found; pass a path or create one of {:?}",
            DEFAULT_FIXTURES
        ),
    }
}
