#![forbid(unsafe_code)]

//! Mobility Runtime
//!
//! Wraps the kernel with seeded run sessions, cancellation, replay,
//! drift detection and tabular export.
//!
//! No domain logic lives here; resolution and evolution are delegated
//! to the kernel.

pub mod error;
pub mod run;
pub mod replay;
pub mod session;
pub mod drift;
pub mod export;

pub use error::{Result, RuntimeError};
pub use run::{RunRecord, RunSpec};
pub use session::{Session, SharedSession};
