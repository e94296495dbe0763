/// Mobility Kernel — Entry Validation
///
/// Every check returns `Err(InvalidInput)` on the first failure.
/// Runs once, before the first generation; the driver assumes all of
/// it afterwards.

use crate::config::{RandomnessConfig, SimulationConfig};
use crate::domain::State;
use crate::error::KernelError;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Validate a configuration together with the initial row it will run on.
pub fn validate_run(initial: &[State], config: &SimulationConfig) -> Result<(), KernelError> {
    validate_config(config)?;
    check_row_width(initial, config.width)?;
    Ok(())
}

/// Validate a configuration on its own.
pub fn validate_config(config: &SimulationConfig) -> Result<(), KernelError> {
    check_width(config.width)?;
    check_generations(config.generations)?;
    check_randomness(&config.randomness)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_width(width: usize) -> Result<(), KernelError> {
    if width == 0 {
        return Err(KernelError::invalid("row width must be at least 1"));
    }
    Ok(())
}

fn check_generations(generations: usize) -> Result<(), KernelError> {
    if generations == 0 {
        return Err(KernelError::invalid("generations must be at least 1"));
    }
    Ok(())
}

/// The probability is checked even when randomness is disabled, so a
/// bad value never hides behind the flag.
fn check_randomness(randomness: &RandomnessConfig) -> Result<(), KernelError> {
    let p = randomness.probability;
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(KernelError::invalid(format!(
            "randomness probability {} is outside [0, 1]",
            p
        )));
    }
    Ok(())
}

fn check_row_width(initial: &[State], width: usize) -> Result<(), KernelError> {
    if initial.len() != width {
        return Err(KernelError::invalid(format!(
            "initial row has {} cells, configured width is {}",
            initial.len(),
            width
        )));
    }
    Ok(())
}
