//! Trace recording for algorithm visualization.
//!
//! - [`recorder`]: the `emit` primitive and the [`instrument`] wrapper
//!   that turns a generator into a complete [`TraceRun`]
//! - [`catalog`]: id-keyed registry with input validation
//! - [`algorithms`]: the generator library
//! - [`property`]: seeded determinism and well-formedness checks
//! - [`benchmark`]: timing and trace-size measurements

pub mod algorithms;
pub mod benchmark;
pub mod catalog;
pub mod network;
pub mod property;
pub mod recorder;

use std::sync::OnceLock;

use algoverse_core::{AlgorithmInput, TraceError, TraceRun};

pub use benchmark::{run_benchmark, BenchmarkConfig, BenchmarkResult};
pub use catalog::{AlgorithmDescriptor, Catalog, Category, Generator};
pub use network::Network;
pub use property::{check_properties, PropertyCheckConfig, PropertyCheckResult, PropertyFailure};
pub use recorder::{instrument, Emission, Recorder, RecorderConfig};

/// The process-wide standard catalog, built on first use.
pub fn standard_catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(Catalog::standard)
}

/// Records one run of the algorithm registered under `id`.
///
/// The input is validated against the algorithm's declared shape before
/// any step is produced. Never returns a partial trace.
pub fn record(id: &str, input: &AlgorithmInput) -> Result<TraceRun, TraceError> {
    standard_catalog().record(id, input)
}
