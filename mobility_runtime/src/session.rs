//! Session manager — one run specification, its latest result, and a
//! cancellation flag.
//!
//! Each run gets its own random source. The latest record is kept
//! until the next run supersedes it; a failed or cancelled run leaves
//! the previous record in place.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rand::Rng;
use tracing::info;

use crate::error::Result;
use crate::replay;
use crate::run::{RunRecord, RunSpec};

/// An isolated simulation session.
pub struct Session {
    session_id: String,
    spec: RunSpec,
    cancel: Arc<AtomicBool>,
    last: Option<RunRecord>,
    runs: u64,
}

impl Session {
    pub fn new(session_id: &str, spec: RunSpec) -> Self {
        Self {
            session_id: session_id.to_string(),
            spec,
            cancel: Arc::new(AtomicBool::new(false)),
            last: None,
            runs: 0,
        }
    }

    /// Run the current specification.
    ///
    /// The seed is the spec's fixed seed, or a fresh one from the process
    /// RNG. A cancel raised before the run starts stops it before its
    /// first generation. The flag is cleared once the run ends, whatever
    /// the outcome.
    pub fn run(&mut self) -> Result<&RunRecord> {
        let seed = self.spec.seed.unwrap_or_else(|| rand::rng().random());

        let outcome = replay::rebuild_cancellable(&self.spec, seed, &self.cancel);
        self.cancel.store(false, Ordering::Relaxed);
        let record = outcome?;
        self.runs += 1;
        info!(
            session = %self.session_id,
            run = self.runs,
            seed,
            generations = record.evolution.generations(),
            hash = %record.hash,
            "run completed"
        );
        Ok(self.last.insert(record))
    }

    /// Handle another thread can set to cancel the run in progress.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Replace the specification. The previous record stays until the
    /// next run.
    pub fn set_spec(&mut self, spec: RunSpec) {
        self.spec = spec;
    }

    pub fn spec(&self) -> &RunSpec {
        &self.spec
    }

    pub fn last_run(&self) -> Option<&RunRecord> {
        self.last.as_ref()
    }

    /// Canonical hash of the latest run, if any.
    pub fn current_hash(&self) -> Option<&str> {
        self.last.as_ref().map(|r| r.hash.as_str())
    }

    /// Number of completed runs.
    pub fn run_count(&self) -> u64 {
        self.runs
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Thread-safe session handle using Mutex.
///
/// The cancellation flag lives outside the lock, so it can be raised
/// while a run holds the session.
pub struct SharedSession {
    inner: Mutex<Session>,
    cancel: Arc<AtomicBool>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        let cancel = session.cancel_handle();
        Self {
            inner: Mutex::new(session),
            cancel,
        }
    }

    /// Run under lock and return the new canonical hash.
    pub fn run(&self) -> Result<String> {
        let mut session = self.lock();
        Ok(session.run()?.hash.clone())
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Get current hash under lock.
    pub fn current_hash(&self) -> Option<String> {
        self.lock().current_hash().map(str::to_string)
    }

    pub fn run_count(&self) -> u64 {
        self.lock().run_count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Session> {
        // a panic mid-run leaves no partial state behind: runs publish
        // their record only on success
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
