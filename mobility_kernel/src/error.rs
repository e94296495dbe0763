/// Mobility Kernel — Error Types
///
/// Every fallible kernel entry point returns `Result<_, KernelError>`.
/// Validation happens once, at the boundary; nothing past it can fail.

use thiserror::Error;

/// All kernel failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    /// Malformed row, configuration value, rule number or raw state.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A rule table decoded in strict mode lacks one or more triples.
    #[error("incomplete rule table: {missing} of 27 neighborhoods have no entry")]
    IncompleteTable { missing: usize },

    /// The caller's cancellation flag was observed between generations.
    #[error("run cancelled after {completed} completed generations")]
    Cancelled { completed: usize },
}

impl KernelError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        KernelError::InvalidInput(message.into())
    }
}
