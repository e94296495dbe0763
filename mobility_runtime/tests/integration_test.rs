//! Integration tests for mobility_runtime.
//!
//! File tests use temporary directories for isolation.

use std::fs;
use std::sync::atomic::AtomicBool;

use proptest::prelude::*;
use tempfile::tempdir;

use mobility_kernel::{
    InitialRow, KernelError, RandomnessConfig, Row, RulePreset, RuleSource, SimulationConfig,
    State,
};

use mobility_runtime::drift::{compare_histories, verify_determinism};
use mobility_runtime::export::{export_to_file, import_from_file, read_history, write_history};
use mobility_runtime::replay;
use mobility_runtime::{RunSpec, RuntimeError, Session, SharedSession};

/// Golden hash of the kernel's basic single-center scenario (101 x 50).
const GOLDEN_HASH: &str = "21cb893618b92cc7306faf867f1658f517902bff0cef8605698224c049254ea0";

fn basic_spec() -> RunSpec {
    RunSpec::new(
        RuleSource::Preset { preset: RulePreset::Basic },
        InitialRow::SingleCenter { seed: State::Thriving },
        SimulationConfig::basic(),
    )
}

fn stochastic_spec(seed: u64) -> RunSpec {
    RunSpec::new(
        RuleSource::Model { name: "balanced".to_string() },
        InitialRow::Random,
        SimulationConfig::social()
            .with_width(80)
            .with_generations(60)
            .with_randomness(RandomnessConfig::with_probability(0.1)),
    )
    .with_seed(seed)
}

// ─────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────

#[test]
fn replay_matches_golden_hash() {
    let record = replay::rebuild(&basic_spec(), 0).expect("rebuild");
    assert_eq!(record.hash, GOLDEN_HASH, "Runtime replay hash does not match golden hash");
}

#[test]
fn seeded_replay_is_deterministic() {
    let spec = stochastic_spec(42);
    let hash = verify_determinism(&spec, 42).expect("deterministic");
    assert_eq!(hash, replay::rebuild_hash(&spec, 42).unwrap());
    assert_ne!(hash, replay::rebuild_hash(&spec, 43).unwrap());
}

#[test]
fn cancelled_replay_reports_progress() {
    let cancel = AtomicBool::new(true);
    match replay::rebuild_cancellable(&basic_spec(), 0, &cancel) {
        Err(RuntimeError::Kernel(KernelError::Cancelled { completed })) => {
            assert_eq!(completed, 0)
        }
        other => panic!("expected cancellation, got {:?}", other.map(|r| r.hash)),
    }
}

// ─────────────────────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────────────────────

#[test]
fn sessions_are_isolated() {
    let mut a = Session::new("session_a", stochastic_spec(1));
    let mut b = Session::new("session_b", stochastic_spec(2));

    let hash_a = a.run().expect("run a").hash.clone();
    let hash_b = b.run().expect("run b").hash.clone();
    assert_ne!(hash_a, hash_b);

    // rerunning a fixed seed reproduces the same history
    assert_eq!(a.run().unwrap().hash, hash_a);
    assert_eq!(a.run_count(), 2);
    assert_eq!(b.run_count(), 1);
}

#[test]
fn unseeded_session_records_the_seed_it_drew() {
    let mut spec = stochastic_spec(0);
    spec.seed = None;
    let mut session = Session::new("unseeded", spec.clone());
    let record = session.run().expect("run").clone();
    let replayed = replay::rebuild(&spec, record.seed).expect("replay");
    assert_eq!(replayed.hash, record.hash);
}

#[test]
fn failed_run_keeps_previous_record() {
    let mut session = Session::new("failing", basic_spec());
    session.run().expect("first run");
    let before = session.current_hash().map(str::to_string);

    let mut bad = basic_spec();
    bad.initial = InitialRow::Values { values: vec![0, 1, 2] };
    session.set_spec(bad);
    assert!(matches!(
        session.run(),
        Err(RuntimeError::Kernel(KernelError::InvalidInput(_)))
    ));
    assert_eq!(session.current_hash().map(str::to_string), before);
}

#[test]
fn shared_session_runs_under_lock() {
    let shared = SharedSession::new(Session::new("shared", basic_spec().with_seed(0)));
    assert_eq!(shared.current_hash(), None);
    let hash = shared.run().expect("run");
    assert_eq!(hash, GOLDEN_HASH);
    assert_eq!(shared.current_hash().as_deref(), Some(GOLDEN_HASH));
    assert_eq!(shared.run_count(), 1);
}

#[test]
fn cancel_raised_before_run_stops_it() {
    let shared = SharedSession::new(Session::new("cancelled", basic_spec().with_seed(0)));
    shared.cancel();
    match shared.run() {
        Err(RuntimeError::Kernel(KernelError::Cancelled { completed })) => assert_eq!(completed, 0),
        other => panic!("expected cancellation, got {:?}", other),
    }
    assert_eq!(shared.current_hash(), None);
    assert_eq!(shared.run_count(), 0);

    // the flag is consumed by the cancelled run
    assert_eq!(shared.run().expect("run"), GOLDEN_HASH);
}

#[test]
fn cancel_handle_stops_next_session_run() {
    let mut session = Session::new("handle", basic_spec().with_seed(0));
    session.run().expect("first run");
    session
        .cancel_handle()
        .store(true, std::sync::atomic::Ordering::Relaxed);
    assert!(matches!(
        session.run(),
        Err(RuntimeError::Kernel(KernelError::Cancelled { .. }))
    ));
    assert_eq!(session.current_hash(), Some(GOLDEN_HASH));
    assert_eq!(session.run_count(), 1);
}

// ─────────────────────────────────────────────────────────────
// Drift
// ─────────────────────────────────────────────────────────────

#[test]
fn drift_between_models() {
    let a = replay::rebuild(&stochastic_spec(5), 5).unwrap();
    let b = replay::rebuild(&stochastic_spec(5), 5).unwrap();
    assert!(compare_histories(&a.evolution, &b.evolution).is_identical());

    let mut pessimistic = stochastic_spec(5);
    pessimistic.rules = RuleSource::Model { name: "pessimistic".to_string() };
    let c = replay::rebuild(&pessimistic, 5).unwrap();
    let report = compare_histories(&a.evolution, &c.evolution);
    assert!(!report.is_identical());
    assert_eq!(report.width_a, 80);
    assert_eq!(report.generations_b, 60);
}

// ─────────────────────────────────────────────────────────────
// Tabular export
// ─────────────────────────────────────────────────────────────

#[test]
fn export_round_trip_reproduces_history() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("exports").join("history.csv");
    let record = replay::rebuild(&stochastic_spec(9), 9).unwrap();

    export_to_file(&record.evolution.history, &path).expect("export");
    let loaded = import_from_file(&path).expect("import");
    assert_eq!(loaded, record.evolution.history);
}

#[test]
fn truncated_export_is_detected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("history.csv");
    let record = replay::rebuild(&basic_spec(), 0).unwrap();
    export_to_file(&record.evolution.history, &path).expect("export");

    // cut the last line mid-row
    let data = fs::read_to_string(&path).unwrap();
    fs::write(&path, &data[..data.len() - 10]).unwrap();

    assert!(matches!(
        import_from_file(&path),
        Err(RuntimeError::Format { .. })
    ));
}

#[test]
fn export_cut_after_header_is_detected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("history.csv");
    let record = replay::rebuild(&basic_spec(), 0).unwrap();
    export_to_file(&record.evolution.history, &path).expect("export");

    let data = fs::read_to_string(&path).unwrap();
    let header_end = data.find('\n').unwrap() + 1;
    fs::write(&path, &data[..header_end]).unwrap();

    match import_from_file(&path) {
        Err(RuntimeError::Format { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected format error, got {:?}", other),
    }
}

fn history() -> impl Strategy<Value = Vec<Row>> {
    let state = prop::sample::select(State::ALL.to_vec());
    (1usize..24, 1usize..16).prop_flat_map(move |(width, generations)| {
        prop::collection::vec(prop::collection::vec(state.clone(), width), generations)
    })
}

proptest! {
    #[test]
    fn any_history_survives_export_and_import(rows in history()) {
        let mut buf = Vec::new();
        write_history(&rows, &mut buf).unwrap();
        let loaded = read_history(buf.as_slice()).unwrap();
        prop_assert_eq!(loaded, rows);
    }
}
