/// Mobility Kernel — Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 hashing of a run.
///
/// Rules:
///   - Fixed top-level field order: kernel_version, width, generations,
///     rows, cause_counts
///   - States as literal integers, cause counts in fixed field order
///   - UTF-8 JSON, no whitespace, no float

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{CauseCounts, Evolution};
use crate::rules::RuleTable;
use crate::KERNEL_VERSION;

/// Canonical serialization of a run to UTF-8 JSON bytes.
pub fn canonical_serialize(evolution: &Evolution) -> Vec<u8> {
    // Value built from integers, strings and arrays only; cannot fail.
    build_canonical_value(evolution).to_string().into_bytes()
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash(evolution: &Evolution) -> String {
    hex_digest(&canonical_serialize(evolution))
}

/// Fingerprint of a rule table: SHA-256 over its 27 result digits in
/// neighborhood index order.
pub fn table_hash(table: &RuleTable) -> String {
    let digits: String = table
        .as_values()
        .iter()
        .map(|v| char::from(b'0' + v))
        .collect();
    hex_digest(digits.as_bytes())
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn build_canonical_value(evolution: &Evolution) -> Value {
    let rows: Vec<Value> = evolution
        .history
        .iter()
        .map(|row| Value::Array(row.iter().map(|s| Value::from(s.value())).collect()))
        .collect();

    let causes: Vec<Value> = evolution
        .statistics
        .per_generation
        .iter()
        .map(cause_counts_value)
        .collect();

    // kernel_version MUST be first.
    let mut root = Map::new();
    root.insert("kernel_version".to_string(), Value::from(KERNEL_VERSION));
    root.insert("width".to_string(), Value::from(evolution.width() as u64));
    root.insert(
        "generations".to_string(),
        Value::from(evolution.generations() as u64),
    );
    root.insert("rows".to_string(), Value::Array(rows));
    root.insert("cause_counts".to_string(), Value::Array(causes));
    Value::Object(root)
}

fn cause_counts_value(counts: &CauseCounts) -> Value {
    let mut map = Map::new();
    map.insert("random".to_string(), Value::from(counts.random as u64));
    map.insert("inheritance".to_string(), Value::from(counts.inheritance as u64));
    map.insert("intervention".to_string(), Value::from(counts.intervention as u64));
    map.insert("rule".to_string(), Value::from(counts.rule as u64));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::State;
    use crate::statistics::TransitionStatistics;

    fn tiny() -> Evolution {
        Evolution {
            history: vec![
                vec![State::Struggling, State::Thriving],
                vec![State::Stable, State::Stable],
            ],
            statistics: TransitionStatistics {
                per_generation: vec![CauseCounts { random: 0, inheritance: 1, intervention: 0, rule: 1 }],
            },
        }
    }

    #[test]
    fn test_canonical_layout() {
        let json = String::from_utf8(canonical_serialize(&tiny())).unwrap();
        assert_eq!(
            json,
            r#"{"kernel_version":1,"width":2,"generations":2,"rows":[[0,2],[1,1]],"cause_counts":[{"random":0,"inheritance":1,"intervention":0,"rule":1}]}"#
        );
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let h = canonical_hash(&tiny());
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(h, canonical_hash(&tiny()));
    }

    #[test]
    fn test_table_hash_distinguishes_tables() {
        use crate::rules::RulePreset;
        let a = table_hash(&RuleTable::preset(RulePreset::Basic));
        let b = table_hash(&RuleTable::preset(RulePreset::Deterministic));
        assert_ne!(a, b);
    }
}
