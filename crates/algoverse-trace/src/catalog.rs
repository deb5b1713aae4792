//! Registry of traceable algorithms.
//!
//! Each [`AlgorithmDescriptor`] pairs a catalog id with the input contract
//! it declares and a typed generator. [`Catalog::record_with`] validates the
//! input against the contract, copies it into the generator's argument
//! types and runs the generator under [`instrument`].

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use algoverse_core::{AlgorithmInput, InputShape, SequenceInput, TraceError, TraceRun};

use crate::algorithms;
use crate::network::Network;
use crate::recorder::{instrument, Emission, Recorder, RecorderConfig};

/// Generator over a plain sequence.
pub type SequenceFn = fn(&mut Recorder, &[i64]) -> Result<Emission, TraceError>;
/// Generator over a sequence and a target value.
pub type SearchFn = fn(&mut Recorder, &[i64], i64) -> Result<Emission, TraceError>;
/// Generator over a validated graph.
pub type GraphFn = fn(&mut Recorder, &Network) -> Result<Emission, TraceError>;
/// Generator over a text and a pattern.
pub type TextFn = fn(&mut Recorder, &str, &str) -> Result<Emission, TraceError>;
/// Generator over a single non-negative scalar.
pub type ScalarFn = fn(&mut Recorder, usize) -> Result<Emission, TraceError>;

/// A typed generator entry point.
#[derive(Debug, Clone, Copy)]
pub enum Generator {
    Sequence(SequenceFn),
    Search(SearchFn),
    Graph(GraphFn),
    Text(TextFn),
    Scalar(ScalarFn),
}

/// Algorithm family, used for grouping in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Searching,
    Sorting,
    Graph,
    String,
    DynamicProgramming,
    Greedy,
    Backtracking,
    DivideAndConquer,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Searching => "searching",
            Category::Sorting => "sorting",
            Category::Graph => "graph",
            Category::String => "string",
            Category::DynamicProgramming => "dynamic-programming",
            Category::Greedy => "greedy",
            Category::Backtracking => "backtracking",
            Category::DivideAndConquer => "divide-and-conquer",
        };
        f.write_str(name)
    }
}

/// A registered algorithm.
#[derive(Debug, Clone)]
pub struct AlgorithmDescriptor {
    /// Kebab-case catalog id, e.g. `binary-search`.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    pub category: Category,
    /// Input contract checked before the generator runs.
    pub shape: InputShape,
    pub generator: Generator,
}

impl AlgorithmDescriptor {
    pub fn new(
        id: &'static str,
        name: &'static str,
        category: Category,
        shape: InputShape,
        generator: Generator,
    ) -> Self {
        AlgorithmDescriptor {
            id,
            name,
            category,
            shape,
            generator,
        }
    }

    fn invalid_input(&self, reason: impl Into<String>) -> TraceError {
        TraceError::InvalidInput {
            algorithm: self.id.to_string(),
            expected_shape: self.shape.to_string(),
            reason: reason.into(),
        }
    }
}

/// Id-keyed registry of algorithm descriptors, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: IndexMap<&'static str, AlgorithmDescriptor>,
}

impl Catalog {
    pub fn empty() -> Self {
        Catalog::default()
    }

    /// The full algorithm library.
    pub fn standard() -> Self {
        let mut catalog = Catalog::empty();
        algorithms::register_all(&mut catalog);
        catalog
    }

    /// Registers a descriptor, returning the one it replaced (if any).
    pub fn register(&mut self, descriptor: AlgorithmDescriptor) -> Option<AlgorithmDescriptor> {
        self.entries.insert(descriptor.id, descriptor)
    }

    pub fn get(&self, id: &str) -> Option<&AlgorithmDescriptor> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &AlgorithmDescriptor> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses `json` as the input `id` expects and records a run.
    ///
    /// Malformed JSON, such as a fractional or non-numeric sequence
    /// element, is reported as [`TraceError::InvalidInput`] naming the
    /// expected shape.
    pub fn record_json(
        &self,
        id: &str,
        json: &str,
        config: &RecorderConfig,
    ) -> Result<TraceRun, TraceError> {
        let descriptor = self
            .get(id)
            .ok_or_else(|| TraceError::UnknownAlgorithm { id: id.to_string() })?;
        let input = descriptor
            .shape
            .parse_json(json)
            .map_err(|reason| descriptor.invalid_input(reason))?;
        self.record_with(id, &input, config)
    }

    /// Records a run with the default [`RecorderConfig`].
    pub fn record(&self, id: &str, input: &AlgorithmInput) -> Result<TraceRun, TraceError> {
        self.record_with(id, input, &RecorderConfig::default())
    }

    /// Validates `input`, runs the generator to completion and returns the
    /// buffered trace.
    ///
    /// Errors are reported before any step is recorded for unknown ids and
    /// malformed inputs; a run that hits the step limit returns no partial
    /// trace.
    pub fn record_with(
        &self,
        id: &str,
        input: &AlgorithmInput,
        config: &RecorderConfig,
    ) -> Result<TraceRun, TraceError> {
        let descriptor = self
            .get(id)
            .ok_or_else(|| TraceError::UnknownAlgorithm { id: id.to_string() })?;

        descriptor
            .shape
            .validate(input)
            .map_err(|reason| descriptor.invalid_input(reason))?;

        let run = match (descriptor.generator, input) {
            (Generator::Sequence(generate), AlgorithmInput::Sequence(s)) => {
                let values = s.sequence.clone();
                instrument(descriptor.id, config, |rec| generate(rec, &values))?
            }
            (
                Generator::Search(generate),
                AlgorithmInput::Sequence(SequenceInput {
                    sequence,
                    target: Some(target),
                }),
            ) => {
                let values = sequence.clone();
                let target = *target;
                instrument(descriptor.id, config, |rec| generate(rec, &values, target))?
            }
            (Generator::Graph(generate), AlgorithmInput::Graph(g)) => {
                let network = Network::from_input(g);
                instrument(descriptor.id, config, |rec| generate(rec, &network))?
            }
            (Generator::Text(generate), AlgorithmInput::Text(t)) => {
                let (text, pattern) = (t.text.clone(), t.pattern.clone());
                instrument(descriptor.id, config, |rec| generate(rec, &text, &pattern))?
            }
            (Generator::Scalar(generate), AlgorithmInput::Scalar(s)) => {
                instrument(descriptor.id, config, |rec| generate(rec, s.n))?
            }
            (_, other) => {
                return Err(descriptor.invalid_input(format!("got {} input", other.shape_name())))
            }
        };

        debug!(algorithm = id, steps = run.len(), "recorded trace");
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoverse_core::StateSnapshot;

    fn echo(rec: &mut Recorder, values: &[i64]) -> Result<Emission, TraceError> {
        rec.emit(Emission::start("echo", StateSnapshot::sequence(values)))?;
        Ok(Emission::outcome("done", StateSnapshot::sequence(values)))
    }

    fn tiny_catalog() -> Catalog {
        let mut catalog = Catalog::empty();
        catalog.register(AlgorithmDescriptor::new(
            "echo",
            "Echo",
            Category::Sorting,
            InputShape::Sequence,
            Generator::Sequence(echo),
        ));
        catalog
    }

    #[test]
    fn unknown_algorithm_is_reported() {
        let err = tiny_catalog()
            .record("bogo-sort", &AlgorithmInput::sequence(vec![1]))
            .unwrap_err();
        assert_eq!(
            err,
            TraceError::UnknownAlgorithm {
                id: "bogo-sort".into()
            }
        );
    }

    #[test]
    fn wrong_shape_names_expected_shape() {
        let err = tiny_catalog()
            .record("echo", &AlgorithmInput::scalar(3))
            .unwrap_err();
        match err {
            TraceError::InvalidInput {
                algorithm,
                expected_shape,
                reason,
            } => {
                assert_eq!(algorithm, "echo");
                assert_eq!(expected_shape, "{sequence: number[]}");
                assert_eq!(reason, "got scalar input");
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn json_input_errors_name_expected_shape() {
        let config = RecorderConfig::default();
        let err = tiny_catalog()
            .record_json("echo", r#"{"sequence": [1.5]}"#, &config)
            .unwrap_err();
        match err {
            TraceError::InvalidInput {
                algorithm,
                expected_shape,
                reason,
            } => {
                assert_eq!(algorithm, "echo");
                assert_eq!(expected_shape, "{sequence: number[]}");
                assert!(reason.contains("1.5"), "got: {}", reason);
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }

        let run = tiny_catalog()
            .record_json("echo", r#"{"sequence": [3, 1]}"#, &config)
            .unwrap();
        assert_eq!(run.len(), 2);

        let err = tiny_catalog()
            .record_json("nope", "not json", &config)
            .unwrap_err();
        assert_eq!(err, TraceError::UnknownAlgorithm { id: "nope".into() });
    }

    #[test]
    fn register_replaces_existing_id() {
        let mut catalog = tiny_catalog();
        let replaced = catalog.register(AlgorithmDescriptor::new(
            "echo",
            "Echo 2",
            Category::Searching,
            InputShape::Sequence,
            Generator::Sequence(echo),
        ));
        assert_eq!(replaced.map(|d| d.name), Some("Echo"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("echo").map(|d| d.name), Some("Echo 2"));
    }

    #[test]
    fn record_runs_generator_on_a_copy() {
        let input = AlgorithmInput::sequence(vec![4, 2]);
        let run = tiny_catalog().record("echo", &input).unwrap();
        assert_eq!(run.len(), 2);
        assert_eq!(input, AlgorithmInput::sequence(vec![4, 2]));
    }

    #[test]
    fn standard_catalog_covers_every_category() {
        let catalog = Catalog::standard();
        for category in [
            Category::Searching,
            Category::Sorting,
            Category::Graph,
            Category::String,
            Category::DynamicProgramming,
            Category::Greedy,
            Category::Backtracking,
            Category::DivideAndConquer,
        ] {
            assert!(
                catalog.descriptors().any(|d| d.category == category),
                "no algorithm registered for {}",
                category
            );
        }
    }

    #[test]
    fn category_display_matches_serde() {
        let json = serde_json::to_string(&Category::DynamicProgramming).unwrap();
        assert_eq!(json, "\"dynamic-programming\"");
        assert_eq!(Category::DivideAndConquer.to_string(), "divide-and-conquer");
    }
}
