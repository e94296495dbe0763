/// Mobility Kernel — Core Domain Types
///
/// Pure data plus the handful of total functions that define it
/// (ordering, stepping, neighborhood indexing). No transition logic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::KernelError;
use crate::statistics::TransitionStatistics;

// ── Cell state ─────────────────────────────────────────────────────

/// Per-cell status. Totally ordered: Struggling < Stable < Thriving.
///
/// Serialized as the literal integer value (0, 1, 2). Any other
/// integer is rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum State {
    Struggling = 0,
    Stable = 1,
    Thriving = 2,
}

impl State {
    /// All states in ascending order.
    pub const ALL: [State; 3] = [State::Struggling, State::Stable, State::Thriving];

    /// Literal integer value.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// One step toward Thriving, clamped.
    pub fn rise(self) -> State {
        match self {
            State::Struggling => State::Stable,
            State::Stable | State::Thriving => State::Thriving,
        }
    }

    /// One step toward Struggling, clamped.
    pub fn fall(self) -> State {
        match self {
            State::Thriving => State::Stable,
            State::Stable | State::Struggling => State::Struggling,
        }
    }

    /// Fixed display color for the presentation layer.
    pub fn display_color(self) -> &'static str {
        match self {
            State::Struggling => "blue",
            State::Stable => "gold",
            State::Thriving => "green",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            State::Struggling => "Struggling",
            State::Stable => "Stable",
            State::Thriving => "Thriving",
        }
    }
}

impl TryFrom<u8> for State {
    type Error = KernelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(State::Struggling),
            1 => Ok(State::Stable),
            2 => Ok(State::Thriving),
            other => Err(KernelError::invalid(format!(
                "state value {} is outside 0..=2",
                other
            ))),
        }
    }
}

impl From<State> for u8 {
    fn from(state: State) -> u8 {
        state.value()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// One generation of cells, in spatial order.
pub type Row = Vec<State>;

// ── Neighborhood ───────────────────────────────────────────────────

/// Number of distinct (left, center, right) triples.
pub const NEIGHBORHOOD_COUNT: usize = 27;

/// The (left, center, right) triple a cell's next state is decided from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[State; 3]", into = "[State; 3]")]
pub struct Neighborhood {
    pub left: State,
    pub center: State,
    pub right: State,
}

impl Neighborhood {
    pub fn new(left: State, center: State, right: State) -> Self {
        Self { left, center, right }
    }

    /// Dense index in `0..27`, lexicographic over (left, center, right).
    pub fn index(&self) -> usize {
        9 * self.left as usize + 3 * self.center as usize + self.right as usize
    }

    /// Inverse of [`Neighborhood::index`]. `None` for indexes ≥ 27.
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= NEIGHBORHOOD_COUNT {
            return None;
        }
        Some(Self {
            left: State::ALL[index / 9],
            center: State::ALL[(index / 3) % 3],
            right: State::ALL[index % 3],
        })
    }

    /// All 27 neighborhoods in index order.
    pub fn all() -> impl Iterator<Item = Neighborhood> {
        (0..NEIGHBORHOOD_COUNT).filter_map(Neighborhood::from_index)
    }

    /// Neighborhood of `position` in `row`. Cells outside the row are
    /// Struggling; there is no wrap-around.
    pub fn of(row: &[State], position: usize) -> Self {
        let left = if position > 0 {
            row[position - 1]
        } else {
            State::Struggling
        };
        let right = row.get(position + 1).copied().unwrap_or(State::Struggling);
        Self {
            left,
            center: row[position],
            right,
        }
    }

    /// Sum of the three literal values, `0..=6`.
    pub fn total(&self) -> usize {
        self.left as usize + self.center as usize + self.right as usize
    }
}

impl From<[State; 3]> for Neighborhood {
    fn from([left, center, right]: [State; 3]) -> Self {
        Self { left, center, right }
    }
}

impl From<Neighborhood> for [State; 3] {
    fn from(n: Neighborhood) -> Self {
        [n.left, n.center, n.right]
    }
}

impl fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.left, self.center, self.right)
    }
}

// ── Transition provenance ──────────────────────────────────────────

/// Which mechanism produced a cell's new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    Random,
    Inheritance,
    Intervention,
    Rule,
}

impl TransitionCause {
    pub const ALL: [TransitionCause; 4] = [
        TransitionCause::Random,
        TransitionCause::Inheritance,
        TransitionCause::Intervention,
        TransitionCause::Rule,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransitionCause::Random => "random",
            TransitionCause::Inheritance => "inheritance",
            TransitionCause::Intervention => "intervention",
            TransitionCause::Rule => "rule",
        }
    }
}

/// Resolved next state of one cell, tagged with its cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: State,
    pub cause: TransitionCause,
}

/// Per-generation count of cells by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CauseCounts {
    pub random: usize,
    pub inheritance: usize,
    pub intervention: usize,
    pub rule: usize,
}

impl CauseCounts {
    pub fn record(&mut self, cause: TransitionCause) {
        match cause {
            TransitionCause::Random => self.random += 1,
            TransitionCause::Inheritance => self.inheritance += 1,
            TransitionCause::Intervention => self.intervention += 1,
            TransitionCause::Rule => self.rule += 1,
        }
    }

    pub fn get(&self, cause: TransitionCause) -> usize {
        match cause {
            TransitionCause::Random => self.random,
            TransitionCause::Inheritance => self.inheritance,
            TransitionCause::Intervention => self.intervention,
            TransitionCause::Rule => self.rule,
        }
    }

    pub fn total(&self) -> usize {
        self.random + self.inheritance + self.intervention + self.rule
    }
}

// ── Run output ─────────────────────────────────────────────────────

/// Complete output of one run: the row history (initial row first)
/// and the per-generation cause bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Evolution {
    pub history: Vec<Row>,
    pub statistics: TransitionStatistics,
}

impl Evolution {
    pub fn width(&self) -> usize {
        self.history.first().map(Vec::len).unwrap_or(0)
    }

    pub fn generations(&self) -> usize {
        self.history.len()
    }

    pub fn final_row(&self) -> Option<&Row> {
        self.history.last()
    }
}
