//! The ordered step log for one (algorithm, input) pair.
//!
//! # Invariants
//!
//! A well-formed [`TraceRun`] satisfies, and [`TraceRun::validate`] checks:
//!
//! - it contains at least one step (the initial state);
//! - `sequence_index` values are exactly `0..N-1`, in order;
//! - exactly one step is terminal, and it is the last one.
//!
//! Runs built by the recorder are well-formed by construction. Runs read
//! back from JSON are not, so consumers that accept external traces should
//! validate them first.

use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::step::{StepKind, StepRecord};

/// Complete, ordered trace of one algorithm execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRun {
    /// Catalog id of the algorithm that produced the run.
    pub algorithm: String,
    steps: Vec<StepRecord>,
}

/// Step counts by kind, the trace-level counterpart of the visualizer's
/// comparison/swap counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStats {
    pub total: usize,
    pub comparisons: usize,
    pub mutations: usize,
    pub decisions: usize,
    pub visits: usize,
}

impl TraceRun {
    /// Wraps a step log without checking it. See [`TraceRun::validate`].
    pub fn new(algorithm: impl Into<String>, steps: Vec<StepRecord>) -> Self {
        TraceRun {
            algorithm: algorithm.into(),
            steps,
        }
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepRecord> {
        self.steps.get(index)
    }

    /// The terminal step, if the run is non-empty.
    pub fn final_step(&self) -> Option<&StepRecord> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StepRecord> {
        self.steps.iter()
    }

    pub fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }

    /// Checks the ordering and terminal invariants.
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.steps.is_empty() {
            return Err(TraceError::MalformedTrace {
                reason: "trace contains no steps".into(),
            });
        }

        for (position, step) in self.steps.iter().enumerate() {
            if step.sequence_index != position {
                return Err(TraceError::MalformedTrace {
                    reason: format!(
                        "step at position {} has sequence index {}",
                        position, step.sequence_index
                    ),
                });
            }
        }

        let last = self.steps.len() - 1;
        if let Some(position) = self.steps[..last].iter().position(|s| s.terminal) {
            return Err(TraceError::MalformedTrace {
                reason: format!("non-final step {} is marked terminal", position),
            });
        }
        if !self.steps[last].terminal {
            return Err(TraceError::MalformedTrace {
                reason: "final step is not marked terminal".into(),
            });
        }

        Ok(())
    }

    /// Deterministic content hash of the run's steps.
    ///
    /// Two runs with equal fingerprints have identical descriptions,
    /// snapshots, highlights and annotations. Each step is serialized with
    /// `serde_json::to_vec`, which is canonical here because steps hold no
    /// `HashMap` (annotations are an `IndexMap`, highlights a `BTreeSet`).
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.algorithm.as_bytes());
        hasher.update(&(self.steps.len() as u64).to_le_bytes());
        for step in &self.steps {
            let bytes =
                serde_json::to_vec(step).expect("StepRecord serialization should never fail");
            hasher.update(&(bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);
        }
        hasher.finalize()
    }

    /// Counts steps by kind.
    pub fn stats(&self) -> TraceStats {
        let mut stats = TraceStats {
            total: self.steps.len(),
            ..TraceStats::default()
        };
        for step in &self.steps {
            match step.kind {
                StepKind::Compare => stats.comparisons += 1,
                StepKind::Mutate => stats.mutations += 1,
                StepKind::Decide => stats.decisions += 1,
                StepKind::Visit => stats.visits += 1,
                StepKind::Start | StepKind::Outcome => {}
            }
        }
        stats
    }
}

impl<'a> IntoIterator for &'a TraceRun {
    type Item = &'a StepRecord;
    type IntoIter = std::slice::Iter<'a, StepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::StateSnapshot;
    use indexmap::IndexMap;

    fn step(index: usize, kind: StepKind, terminal: bool) -> StepRecord {
        StepRecord {
            sequence_index: index,
            kind,
            description: format!("step {}", index),
            snapshot: StateSnapshot::sequence(&[index as i64]),
            highlights: Default::default(),
            annotations: IndexMap::new(),
            terminal,
        }
    }

    fn well_formed(len: usize) -> TraceRun {
        let steps = (0..len)
            .map(|i| {
                let kind = match i {
                    0 => StepKind::Start,
                    i if i + 1 == len => StepKind::Outcome,
                    _ => StepKind::Compare,
                };
                step(i, kind, i + 1 == len)
            })
            .collect();
        TraceRun::new("test", steps)
    }

    #[test]
    fn well_formed_run_validates() {
        assert!(well_formed(1).validate().is_ok());
        assert!(well_formed(5).validate().is_ok());
    }

    #[test]
    fn empty_run_is_malformed() {
        let run = TraceRun::new("test", vec![]);
        assert!(run.is_empty());
        assert!(matches!(
            run.validate(),
            Err(TraceError::MalformedTrace { .. })
        ));
    }

    #[test]
    fn gap_in_sequence_is_malformed() {
        let run = TraceRun::new(
            "test",
            vec![step(0, StepKind::Start, false), step(2, StepKind::Outcome, true)],
        );
        let err = run.validate().unwrap_err();
        assert!(err.to_string().contains("position 1"), "got: {}", err);
    }

    #[test]
    fn early_terminal_is_malformed() {
        let run = TraceRun::new(
            "test",
            vec![step(0, StepKind::Start, true), step(1, StepKind::Outcome, true)],
        );
        assert!(run.validate().is_err());
    }

    #[test]
    fn missing_terminal_is_malformed() {
        let run = TraceRun::new(
            "test",
            vec![step(0, StepKind::Start, false), step(1, StepKind::Compare, false)],
        );
        let err = run.validate().unwrap_err();
        assert!(err.to_string().contains("not marked terminal"));
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let a = well_formed(4);
        let b = well_formed(4);
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut steps = b.into_steps();
        steps[2].description.push('!');
        let c = TraceRun::new("test", steps);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn stats_count_by_kind() {
        let run = TraceRun::new(
            "test",
            vec![
                step(0, StepKind::Start, false),
                step(1, StepKind::Compare, false),
                step(2, StepKind::Mutate, false),
                step(3, StepKind::Compare, false),
                step(4, StepKind::Outcome, true),
            ],
        );
        let stats = run.stats();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.comparisons, 2);
        assert_eq!(stats.mutations, 1);
        assert_eq!(stats.decisions, 0);
    }

    #[test]
    fn json_roundtrip_keeps_fingerprint() {
        let run = well_formed(3);
        let json = serde_json::to_string(&run).unwrap();
        let back: TraceRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fingerprint(), run.fingerprint());
        assert_eq!(back.final_step().map(|s| s.terminal), Some(true));
    }
}
