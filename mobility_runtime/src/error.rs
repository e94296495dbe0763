//! Runtime error type — wraps kernel, I/O and decoding failures.

use std::io;

use thiserror::Error;

use mobility_kernel::KernelError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("bad run specification: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed tabular export, with its 1-based line number.
    #[error("tabular format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// Two runs from the same specification and seed disagreed.
    #[error("determinism failure: run 1 hashed to {first}, run 2 to {second}")]
    Determinism { first: String, second: String },
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
