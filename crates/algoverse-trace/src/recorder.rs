//! Trace recorder: the `emit` primitive and the `instrument` contract.
//!
//! Generators never assign sequence indices or terminal flags. They push
//! intermediate [`Emission`]s through [`Recorder::emit`] and return the
//! terminal emission from the closure passed to [`instrument`], which
//! appends it as the one and only terminal step. A run produced this way is
//! always non-empty, gapless and terminated exactly once.
//!
//! Snapshots are taken eagerly: an [`Emission`] owns its
//! [`StateSnapshot`], so the working data is copied at the moment of the
//! call.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use algoverse_core::{StateSnapshot, StepKind, StepRecord, TraceError, TraceRun, Value};

/// Configuration for the recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Maximum number of steps in a run, terminal step included.
    /// Default: 100_000.
    pub max_steps: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        RecorderConfig { max_steps: 100_000 }
    }
}

/// A step waiting to be recorded.
#[derive(Debug, Clone)]
pub struct Emission {
    kind: StepKind,
    description: String,
    snapshot: StateSnapshot,
    highlights: BTreeSet<usize>,
    annotations: IndexMap<String, Value>,
}

impl Emission {
    pub fn new(kind: StepKind, description: impl Into<String>, snapshot: StateSnapshot) -> Self {
        Emission {
            kind,
            description: description.into(),
            snapshot,
            highlights: BTreeSet::new(),
            annotations: IndexMap::new(),
        }
    }

    pub fn start(description: impl Into<String>, snapshot: StateSnapshot) -> Self {
        Self::new(StepKind::Start, description, snapshot)
    }

    pub fn compare(description: impl Into<String>, snapshot: StateSnapshot) -> Self {
        Self::new(StepKind::Compare, description, snapshot)
    }

    pub fn mutate(description: impl Into<String>, snapshot: StateSnapshot) -> Self {
        Self::new(StepKind::Mutate, description, snapshot)
    }

    pub fn decide(description: impl Into<String>, snapshot: StateSnapshot) -> Self {
        Self::new(StepKind::Decide, description, snapshot)
    }

    pub fn visit(description: impl Into<String>, snapshot: StateSnapshot) -> Self {
        Self::new(StepKind::Visit, description, snapshot)
    }

    pub fn outcome(description: impl Into<String>, snapshot: StateSnapshot) -> Self {
        Self::new(StepKind::Outcome, description, snapshot)
    }

    /// Adds indices to the highlight set.
    pub fn highlight(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.highlights.extend(indices);
        self
    }

    /// Adds (or replaces) a named annotation.
    pub fn annotate(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.to_string(), value.into());
        self
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    fn into_record(self, sequence_index: usize, terminal: bool) -> StepRecord {
        StepRecord {
            sequence_index,
            kind: self.kind,
            description: self.description,
            snapshot: self.snapshot,
            highlights: self.highlights,
            annotations: self.annotations,
            terminal,
        }
    }
}

/// Buffers the steps of one run.
#[derive(Debug)]
pub struct Recorder {
    steps: Vec<StepRecord>,
    max_steps: usize,
}

impl Recorder {
    fn new(config: &RecorderConfig) -> Self {
        Recorder {
            steps: Vec::new(),
            max_steps: config.max_steps,
        }
    }

    /// Records an intermediate step.
    ///
    /// One slot is always kept free for the terminal step, so this fails
    /// with [`TraceError::StepLimitExceeded`] once `max_steps - 1`
    /// intermediate steps exist.
    pub fn emit(&mut self, emission: Emission) -> Result<(), TraceError> {
        if self.steps.len() + 2 > self.max_steps {
            return Err(TraceError::StepLimitExceeded {
                limit: self.max_steps,
            });
        }
        let index = self.steps.len();
        self.steps.push(emission.into_record(index, false));
        Ok(())
    }

    /// Number of steps recorded so far.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn finish(mut self, algorithm: &str, terminal: Emission) -> TraceRun {
        let index = self.steps.len();
        self.steps.push(terminal.into_record(index, true));
        TraceRun::new(algorithm, self.steps)
    }
}

/// Runs `body` against a fresh recorder and seals the result into a
/// [`TraceRun`].
///
/// `body` emits the intermediate steps and returns the terminal emission.
/// On error nothing is returned: a run is either complete or absent.
pub fn instrument<F>(
    algorithm: &str,
    config: &RecorderConfig,
    body: F,
) -> Result<TraceRun, TraceError>
where
    F: FnOnce(&mut Recorder) -> Result<Emission, TraceError>,
{
    let mut recorder = Recorder::new(config);
    let terminal = body(&mut recorder)?;
    Ok(recorder.finish(algorithm, terminal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        assert_eq!(RecorderConfig::default().max_steps, 100_000);
    }

    #[test]
    fn instrument_appends_single_terminal() {
        let run = instrument("demo", &RecorderConfig::default(), |rec| {
            rec.emit(Emission::start("begin", StateSnapshot::sequence(&[1])))?;
            rec.emit(Emission::compare("look", StateSnapshot::sequence(&[1])).highlight([0]))?;
            Ok(Emission::outcome("done", StateSnapshot::sequence(&[1])).annotate("found", true))
        })
        .unwrap();

        assert_eq!(run.len(), 3);
        assert_eq!(run.algorithm, "demo");
        assert!(run.validate().is_ok());
        let last = run.final_step().unwrap();
        assert!(last.terminal);
        assert_eq!(last.kind, StepKind::Outcome);
        assert_eq!(last.annotation("found"), Some(&Value::Bool(true)));
        assert!(run.get(1).unwrap().is_highlighted(0));
    }

    #[test]
    fn terminal_only_run_is_valid() {
        let run = instrument("demo", &RecorderConfig::default(), |_| {
            Ok(Emission::outcome("nothing to do", StateSnapshot::sequence(&[])))
        })
        .unwrap();
        assert_eq!(run.len(), 1);
        assert!(run.validate().is_ok());
    }

    #[test]
    fn snapshot_is_not_affected_by_later_mutation() {
        let run = instrument("demo", &RecorderConfig::default(), |rec| {
            let mut working = vec![3, 2, 1];
            rec.emit(Emission::start("initial", StateSnapshot::sequence(&working)))?;
            working.swap(0, 2);
            working[1] = 99;
            Ok(Emission::outcome("mutated", StateSnapshot::sequence(&working)))
        })
        .unwrap();

        assert_eq!(
            run.get(0).unwrap().snapshot.as_sequence(),
            Some(&[3i64, 2, 1][..])
        );
        assert_eq!(
            run.get(1).unwrap().snapshot.as_sequence(),
            Some(&[1i64, 99, 3][..])
        );
    }

    #[test]
    fn step_limit_reserves_terminal_slot() {
        let config = RecorderConfig { max_steps: 3 };
        let run = instrument("demo", &config, |rec| {
            rec.emit(Emission::start("a", StateSnapshot::sequence(&[])))?;
            rec.emit(Emission::decide("b", StateSnapshot::sequence(&[])))?;
            Ok(Emission::outcome("c", StateSnapshot::sequence(&[])))
        })
        .unwrap();
        assert_eq!(run.len(), 3);

        let err = instrument("demo", &config, |rec| {
            for _ in 0..3 {
                rec.emit(Emission::decide("x", StateSnapshot::sequence(&[])))?;
            }
            Ok(Emission::outcome("never", StateSnapshot::sequence(&[])))
        })
        .unwrap_err();
        assert_eq!(err, TraceError::StepLimitExceeded { limit: 3 });
    }

    #[test]
    fn annotate_replaces_existing_key() {
        let emission = Emission::decide("x", StateSnapshot::sequence(&[]))
            .annotate("low", 0usize)
            .annotate("low", 4usize);
        let run = instrument("demo", &RecorderConfig::default(), |_| Ok(emission)).unwrap();
        let step = run.final_step().unwrap();
        assert_eq!(step.annotation("low"), Some(&Value::Int(4)));
        assert_eq!(step.annotations.len(), 1);
        // The returned emission is terminal regardless of its kind.
        assert_eq!(step.kind, StepKind::Decide);
    }
}
