/// Mobility Kernel — Initial Row Construction

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::{Row, State};
use crate::error::KernelError;

/// How a run's first row is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialRow {
    /// All Struggling except one cell at the center.
    SingleCenter { seed: State },
    /// Uniform random states; consumes one draw per cell.
    Random,
    /// Literal state values, one per cell.
    Values { values: Vec<u8> },
}

impl Default for InitialRow {
    fn default() -> Self {
        InitialRow::SingleCenter {
            seed: State::Thriving,
        }
    }
}

impl InitialRow {
    pub fn build<R: Rng + ?Sized>(&self, width: usize, rng: &mut R) -> Result<Row, KernelError> {
        match self {
            InitialRow::SingleCenter { seed } => single_center(width, *seed),
            InitialRow::Random => random_row(width, rng),
            InitialRow::Values { values } => row_from_values(values),
        }
    }
}

/// All Struggling except one `seed` cell at `width / 2`.
pub fn single_center(width: usize, seed: State) -> Result<Row, KernelError> {
    if width == 0 {
        return Err(KernelError::invalid("row width must be at least 1"));
    }
    let mut row = vec![State::Struggling; width];
    row[width / 2] = seed;
    Ok(row)
}

/// Every cell drawn uniformly from the three states, left to right.
pub fn random_row<R: Rng + ?Sized>(width: usize, rng: &mut R) -> Result<Row, KernelError> {
    if width == 0 {
        return Err(KernelError::invalid("row width must be at least 1"));
    }
    Ok((0..width)
        .map(|_| State::ALL[rng.random_range(0..State::ALL.len())])
        .collect())
}

/// Convert literal values into a row, rejecting anything outside 0..=2.
pub fn row_from_values(values: &[u8]) -> Result<Row, KernelError> {
    if values.is_empty() {
        return Err(KernelError::invalid("row width must be at least 1"));
    }
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            State::try_from(*v).map_err(|_| {
                KernelError::invalid(format!("cell {} has state value {}, expected 0..=2", i, v))
            })
        })
        .collect()
}
