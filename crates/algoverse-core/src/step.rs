//! The atomic unit of trace data.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::snapshot::StateSnapshot;
use crate::value::Value;

/// What happened at a step.
///
/// The first record of every run is `Start`, the terminal record is
/// `Outcome`. In between, comparisons are `Compare`; swaps, inserts, writes
/// and relaxations are `Mutate`; branches, splits and backtracks are
/// `Decide`; graph vertex visits are `Visit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Start,
    Compare,
    Mutate,
    Decide,
    Visit,
    Outcome,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Start => "start",
            StepKind::Compare => "compare",
            StepKind::Mutate => "mutate",
            StepKind::Decide => "decide",
            StepKind::Visit => "visit",
            StepKind::Outcome => "outcome",
        };
        f.write_str(name)
    }
}

/// One recorded step of an algorithm run.
///
/// Produced once by the recorder and never mutated afterwards; a
/// [`TraceRun`](crate::TraceRun) only hands out shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Position in the run, assigned at emission. Runs are gapless from 0.
    pub sequence_index: usize,
    pub kind: StepKind,
    /// Human-readable summary of what happened.
    pub description: String,
    /// Deep copy of the working data at the moment of the step.
    pub snapshot: StateSnapshot,
    /// Indices or vertex ids the renderer should emphasize.
    #[serde(default)]
    pub highlights: BTreeSet<usize>,
    /// Auxiliary named values, in insertion order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: IndexMap<String, Value>,
    /// True only on the final record of a run.
    pub terminal: bool,
}

impl StepRecord {
    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        self.highlights.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StepRecord {
        let mut annotations = IndexMap::new();
        annotations.insert("low".to_string(), Value::Int(0));
        annotations.insert("high".to_string(), Value::Int(9));
        StepRecord {
            sequence_index: 3,
            kind: StepKind::Compare,
            description: "Comparing 7 with 5".into(),
            snapshot: StateSnapshot::sequence(&[1, 5, 7]),
            highlights: [1].into_iter().collect(),
            annotations,
            terminal: false,
        }
    }

    #[test]
    fn annotations_keep_insertion_order() {
        let step = sample();
        let keys: Vec<&str> = step.annotations.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["low", "high"]);
        assert_eq!(step.annotation("high"), Some(&Value::Int(9)));
        assert!(step.is_highlighted(1));
        assert!(!step.is_highlighted(0));
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["sequenceIndex"], 3);
        assert_eq!(json["kind"], "compare");
        assert_eq!(json["highlights"][0], 1);
        assert_eq!(json["snapshot"]["type"], "sequence");
        assert_eq!(json["terminal"], false);
    }

    #[test]
    fn empty_annotations_are_omitted() {
        let mut step = sample();
        step.annotations.clear();
        let json = serde_json::to_value(&step).unwrap();
        assert!(json.get("annotations").is_none());
        let back: StepRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn kind_display() {
        assert_eq!(StepKind::Outcome.to_string(), "outcome");
        assert_eq!(StepKind::Visit.to_string(), "visit");
    }
}
