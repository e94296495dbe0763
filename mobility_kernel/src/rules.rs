/// Mobility Kernel — Rule Tables
///
/// A `RuleTable` maps every one of the 27 neighborhoods to a result
/// state. Storage is dense, so a constructed table is always total;
/// partial inputs are completed with the center-preserving default
/// at construction time, never at lookup time.

use std::fmt;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{Neighborhood, State, NEIGHBORHOOD_COUNT};
use crate::error::KernelError;

/// Largest totalistic rule number (3^7 - 1).
pub const MAX_TOTALISTIC_RULE: u16 = 2186;

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// One explicit `neighborhood -> result` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    pub neighborhood: Neighborhood,
    pub result: State,
}

impl RuleEntry {
    pub fn new(left: State, center: State, right: State, result: State) -> Self {
        Self {
            neighborhood: Neighborhood::new(left, center, right),
            result,
        }
    }
}

/// Total mapping from neighborhood to next state.
///
/// Serialized as the full list of 27 entries; decoding a list that
/// does not cover every neighborhood fails with `IncompleteTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<RuleEntry>", try_from = "Vec<RuleEntry>")]
pub struct RuleTable {
    slots: [State; NEIGHBORHOOD_COUNT],
}

impl RuleTable {
    /// Every neighborhood keeps its center value.
    pub fn center_preserving() -> Self {
        let mut slots = [State::Struggling; NEIGHBORHOOD_COUNT];
        for n in Neighborhood::all() {
            slots[n.index()] = n.center;
        }
        Self { slots }
    }

    /// Explicit entries over the center-preserving default.
    ///
    /// Listing the same neighborhood twice with different results is
    /// rejected; an identical repeat is accepted.
    pub fn explicit<I>(entries: I) -> Result<Self, KernelError>
    where
        I: IntoIterator<Item = RuleEntry>,
    {
        let mut table = Self::center_preserving();
        let mut seen = [false; NEIGHBORHOOD_COUNT];
        for entry in entries {
            let idx = entry.neighborhood.index();
            if seen[idx] && table.slots[idx] != entry.result {
                return Err(KernelError::invalid(format!(
                    "conflicting entries for neighborhood {}",
                    entry.neighborhood
                )));
            }
            seen[idx] = true;
            table.slots[idx] = entry.result;
        }
        Ok(table)
    }

    /// Strict construction: every neighborhood must be listed.
    pub fn complete<I>(entries: I) -> Result<Self, KernelError>
    where
        I: IntoIterator<Item = RuleEntry>,
    {
        let entries: Vec<RuleEntry> = entries.into_iter().collect();
        let mut covered = [false; NEIGHBORHOOD_COUNT];
        for entry in &entries {
            covered[entry.neighborhood.index()] = true;
        }
        let missing = covered.iter().filter(|c| !**c).count();
        if missing > 0 {
            return Err(KernelError::IncompleteTable { missing });
        }
        Self::explicit(entries)
    }

    /// Sample every neighborhood, in index order, from the model's
    /// categorical distribution. One uniform draw per neighborhood.
    pub fn generate<R: Rng + ?Sized>(
        model: BehavioralModel,
        rng: &mut R,
    ) -> Result<Self, KernelError> {
        let distribution = WeightedIndex::new(model.weights()).map_err(|e| {
            KernelError::invalid(format!("model {} has unusable weights: {}", model, e))
        })?;
        let mut slots = [State::Struggling; NEIGHBORHOOD_COUNT];
        for slot in slots.iter_mut() {
            *slot = State::ALL[distribution.sample(rng)];
        }
        Ok(Self { slots })
    }

    /// Totalistic rule: the result depends only on `left + center + right`.
    ///
    /// The rule number is read as 7 base-3 digits, most significant
    /// first; digit `s` is the result for neighborhood sum `s`.
    pub fn totalistic(rule_number: u16) -> Result<Self, KernelError> {
        if rule_number > MAX_TOTALISTIC_RULE {
            return Err(KernelError::invalid(format!(
                "totalistic rule {} exceeds {}",
                rule_number, MAX_TOTALISTIC_RULE
            )));
        }
        let mut digits = [State::Struggling; 7];
        let mut rest = rule_number;
        for digit in digits.iter_mut().rev() {
            *digit = State::ALL[(rest % 3) as usize];
            rest /= 3;
        }
        let mut slots = [State::Struggling; NEIGHBORHOOD_COUNT];
        for n in Neighborhood::all() {
            slots[n.index()] = digits[n.total()];
        }
        Ok(Self { slots })
    }

    /// Built-in tables of the early deterministic programs.
    pub fn preset(preset: RulePreset) -> Self {
        use State::*;
        let mut entries = vec![
            RuleEntry::new(Thriving, Thriving, Thriving, Thriving),
            RuleEntry::new(Struggling, Thriving, Struggling, Stable),
            RuleEntry::new(Stable, Stable, Stable, Stable),
            RuleEntry::new(Struggling, Stable, Struggling, Struggling),
        ];
        match preset {
            RulePreset::CenterPreserving => return Self::center_preserving(),
            RulePreset::Basic => {}
            RulePreset::Deterministic => entries.extend([
                RuleEntry::new(Stable, Thriving, Struggling, Stable),
                RuleEntry::new(Struggling, Struggling, Thriving, Stable),
                RuleEntry::new(Thriving, Struggling, Stable, Stable),
            ]),
        }
        let mut table = Self::center_preserving();
        for entry in entries {
            table.slots[entry.neighborhood.index()] = entry.result;
        }
        table
    }

    pub fn lookup(&self, neighborhood: Neighborhood) -> State {
        self.slots[neighborhood.index()]
    }

    /// All 27 entries in neighborhood index order.
    pub fn entries(&self) -> impl Iterator<Item = RuleEntry> + '_ {
        Neighborhood::all().map(move |n| RuleEntry {
            neighborhood: n,
            result: self.slots[n.index()],
        })
    }

    /// Entries whose result differs from the neighborhood's center.
    pub fn changing_entries(&self) -> impl Iterator<Item = RuleEntry> + '_ {
        self.entries().filter(|e| e.result != e.neighborhood.center)
    }

    /// Result values in index order, as literal integers.
    pub fn as_values(&self) -> [u8; NEIGHBORHOOD_COUNT] {
        self.slots.map(State::value)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::center_preserving()
    }
}

impl From<RuleTable> for Vec<RuleEntry> {
    fn from(table: RuleTable) -> Self {
        table.entries().collect()
    }
}

impl TryFrom<Vec<RuleEntry>> for RuleTable {
    type Error = KernelError;

    fn try_from(entries: Vec<RuleEntry>) -> Result<Self, Self::Error> {
        RuleTable::complete(entries)
    }
}

// ---------------------------------------------------------------------------
// Behavioral models
// ---------------------------------------------------------------------------

/// Named weighting profile over [Struggling, Stable, Thriving].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehavioralModel {
    Balanced,
    Pessimistic,
    Optimistic,
    Uniform,
}

impl BehavioralModel {
    pub const ALL: [BehavioralModel; 4] = [
        BehavioralModel::Balanced,
        BehavioralModel::Pessimistic,
        BehavioralModel::Optimistic,
        BehavioralModel::Uniform,
    ];

    pub fn weights(self) -> [f64; 3] {
        match self {
            BehavioralModel::Balanced => [0.30, 0.50, 0.20],
            BehavioralModel::Pessimistic => [0.45, 0.45, 0.10],
            BehavioralModel::Optimistic => [0.15, 0.50, 0.35],
            BehavioralModel::Uniform => [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BehavioralModel::Balanced => "balanced",
            BehavioralModel::Pessimistic => "pessimistic",
            BehavioralModel::Optimistic => "optimistic",
            BehavioralModel::Uniform => "uniform",
        }
    }

    /// Strict lookup. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
    }

    /// Lenient lookup: unknown names degrade to `Uniform` with a warning.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            warn!(model = name, "unrecognized behavioral model, using uniform");
            BehavioralModel::Uniform
        })
    }
}

impl fmt::Display for BehavioralModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Construction entry point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePreset {
    CenterPreserving,
    Basic,
    Deterministic,
}

/// How a run's rule table is obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSource {
    /// Partial table; unlisted neighborhoods keep their center.
    Explicit { entries: Vec<RuleEntry> },
    /// Weighted generation from a named model (unknown names → uniform).
    Model { name: String },
    Totalistic { rule_number: u16 },
    Preset { preset: RulePreset },
}

/// Build the rule table for one run. Only model generation consumes
/// randomness.
pub fn build_rule_table<R: Rng + ?Sized>(
    source: &RuleSource,
    rng: &mut R,
) -> Result<RuleTable, KernelError> {
    match source {
        RuleSource::Explicit { entries } => RuleTable::explicit(entries.iter().copied()),
        RuleSource::Model { name } => RuleTable::generate(BehavioralModel::from_name(name), rng),
        RuleSource::Totalistic { rule_number } => RuleTable::totalistic(*rule_number),
        RuleSource::Preset { preset } => Ok(RuleTable::preset(*preset)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use State::*;

    #[test]
    fn test_unlisted_triples_keep_center() {
        let table = RuleTable::explicit([RuleEntry::new(Struggling, Thriving, Struggling, Stable)])
            .unwrap();
        for n in Neighborhood::all() {
            let expected = if n == Neighborhood::new(Struggling, Thriving, Struggling) {
                Stable
            } else {
                n.center
            };
            assert_eq!(table.lookup(n), expected, "neighborhood {}", n);
        }
    }

    #[test]
    fn test_conflicting_explicit_entries_rejected() {
        let result = RuleTable::explicit([
            RuleEntry::new(Stable, Stable, Stable, Stable),
            RuleEntry::new(Stable, Stable, Stable, Thriving),
        ]);
        assert!(matches!(result, Err(KernelError::InvalidInput(_))));

        let repeated = RuleTable::explicit([
            RuleEntry::new(Stable, Stable, Stable, Thriving),
            RuleEntry::new(Stable, Stable, Stable, Thriving),
        ]);
        assert!(repeated.is_ok());
    }

    #[test]
    fn test_complete_reports_missing_count() {
        let partial: Vec<RuleEntry> = RuleTable::center_preserving().entries().take(20).collect();
        assert_eq!(
            RuleTable::complete(partial),
            Err(KernelError::IncompleteTable { missing: 7 })
        );
    }

    #[test]
    fn test_generate_has_27_entries_for_every_model() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for name in ["balanced", "pessimistic", "optimistic", "uniform", "nonsense", ""] {
            let table = RuleTable::generate(BehavioralModel::from_name(name), &mut rng).unwrap();
            assert_eq!(table.entries().count(), NEIGHBORHOOD_COUNT);
        }
    }

    #[test]
    fn test_generate_is_reproducible_under_seed() {
        let a = RuleTable::generate(BehavioralModel::Balanced, &mut ChaCha8Rng::seed_from_u64(99)).unwrap();
        let b = RuleTable::generate(BehavioralModel::Balanced, &mut ChaCha8Rng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_model_weights_sum_to_one() {
        for model in BehavioralModel::ALL {
            let sum: f64 = model.weights().iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "{} sums to {}", model, sum);
        }
    }

    #[test]
    fn test_pessimistic_model_skews_toward_struggling() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut struggling = 0;
        let mut thriving = 0;
        for _ in 0..200 {
            let table = RuleTable::generate(BehavioralModel::Pessimistic, &mut rng).unwrap();
            for entry in table.entries() {
                match entry.result {
                    Struggling => struggling += 1,
                    Thriving => thriving += 1,
                    Stable => {}
                }
            }
        }
        assert!(struggling > thriving * 2);
    }

    #[test]
    fn test_model_name_lookup() {
        assert_eq!(BehavioralModel::parse(" Optimistic "), Some(BehavioralModel::Optimistic));
        assert_eq!(BehavioralModel::parse("cheerful"), None);
        assert_eq!(BehavioralModel::from_name("cheerful"), BehavioralModel::Uniform);
    }

    #[test]
    fn test_totalistic_digits() {
        // 1077 = 1110220 in base 3
        let table = RuleTable::totalistic(1077).unwrap();
        let expected = [Stable, Stable, Stable, Struggling, Thriving, Thriving, Struggling];
        for n in Neighborhood::all() {
            assert_eq!(table.lookup(n), expected[n.total()]);
        }
        assert!(RuleTable::totalistic(MAX_TOTALISTIC_RULE).is_ok());
        assert!(RuleTable::totalistic(MAX_TOTALISTIC_RULE + 1).is_err());
    }

    #[test]
    fn test_presets() {
        let basic = RuleTable::preset(RulePreset::Basic);
        assert_eq!(basic.changing_entries().count(), 2);
        assert_eq!(basic.lookup(Neighborhood::new(Struggling, Thriving, Struggling)), Stable);

        let deterministic = RuleTable::preset(RulePreset::Deterministic);
        assert_eq!(deterministic.lookup(Neighborhood::new(Thriving, Struggling, Stable)), Stable);
        assert_eq!(deterministic.changing_entries().count(), 5);
    }

    #[test]
    fn test_table_serde_requires_all_entries() {
        let table = RuleTable::preset(RulePreset::Deterministic);
        let json = serde_json::to_string(&table).unwrap();
        let back: RuleTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);

        let short = r#"[{"neighborhood":[0,0,0],"result":1}]"#;
        assert!(serde_json::from_str::<RuleTable>(short).is_err());
    }

    #[test]
    fn test_build_rule_table_sources() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let source: RuleSource =
            serde_json::from_str(r#"{"kind":"model","name":"pessimistic"}"#).unwrap();
        assert!(build_rule_table(&source, &mut rng).is_ok());

        let source = RuleSource::Totalistic { rule_number: 5000 };
        assert!(build_rule_table(&source, &mut rng).is_err());

        let source: RuleSource =
            serde_json::from_str(r#"{"kind":"preset","preset":"basic"}"#).unwrap();
        assert_eq!(
            build_rule_table(&source, &mut rng).unwrap(),
            RuleTable::preset(RulePreset::Basic)
        );
    }
}
