//! Data model for algorithm step traces.
//!
//! A trace is a flat, ordered log of [`StepRecord`]s produced by running one
//! reference algorithm over one input. This crate holds the types shared by
//! the recorder, the playback controller and any presentation layer:
//!
//! - [`StepRecord`] / [`StepKind`]: one immutable step of a run.
//! - [`TraceRun`]: the complete, validated step log for a run.
//! - [`StateSnapshot`]: deep copies of the algorithm's working data.
//! - [`AlgorithmInput`] / [`InputShape`]: caller inputs and their contracts.
//! - [`TraceError`]: the error taxonomy shared across crates.

pub mod error;
pub mod input;
pub mod snapshot;
pub mod step;
pub mod trace;
pub mod value;

// Re-export commonly used types
pub use error::TraceError;
pub use input::{
    AlgorithmInput, EdgeInput, GraphInput, InputShape, ScalarInput, SequenceInput, TextInput,
    WeightRule, MAX_EDGES, MAX_EDGE_WEIGHT, MAX_SEQUENCE_LEN, MAX_TEXT_LEN, MAX_VERTICES,
};
pub use snapshot::{Distance, GraphState, StateSnapshot, WeightedEdge};
pub use step::{StepKind, StepRecord};
pub use trace::{TraceRun, TraceStats};
pub use value::Value;
