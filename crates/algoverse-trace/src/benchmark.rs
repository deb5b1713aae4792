//! Wall-clock and size measurements for trace generation.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use algoverse_core::TraceError;

use crate::catalog::Catalog;
use crate::property::generate_input;

/// Configuration for a benchmark suite.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Input sizes to measure.
    pub sizes: Vec<usize>,
    /// Runs per size, each on a fresh random input.
    pub iterations: u32,
    pub random_seed: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            sizes: vec![10, 50, 100],
            iterations: 3,
            random_seed: 0,
        }
    }
}

/// Averages over the runs at one input size.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    pub algorithm: String,
    /// Input size measured, after capping at the algorithm's input limit.
    pub size: usize,
    /// Mean time to record one trace, in milliseconds.
    pub mean_elapsed: f64,
    /// Mean number of steps per trace.
    pub step_count: usize,
    /// Mean size of the serialized trace, in bytes.
    pub trace_bytes: usize,
}

/// Records `config.iterations` traces of `id` at each configured size.
///
/// Sizes above the algorithm's input limit are measured at the limit.
/// Fails on an unknown id, or when a run exceeds the recorder's step limit.
pub fn run_benchmark(
    catalog: &Catalog,
    id: &str,
    config: &BenchmarkConfig,
) -> Result<Vec<BenchmarkResult>, TraceError> {
    let descriptor = catalog
        .get(id)
        .ok_or_else(|| TraceError::UnknownAlgorithm { id: id.to_string() })?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);
    let iterations = config.iterations.max(1);
    let mut results = Vec::with_capacity(config.sizes.len());

    for &requested in &config.sizes {
        let size = requested.min(descriptor.shape.size_limit());
        if size < requested {
            warn!(algorithm = id, requested, size, "benchmark size capped at input limit");
        }
        let mut elapsed = Duration::ZERO;
        let mut steps = 0usize;
        let mut bytes = 0usize;

        for _ in 0..iterations {
            let input = generate_input(&descriptor.shape, size, &mut rng);
            let started = Instant::now();
            let run = catalog.record(id, &input)?;
            elapsed += started.elapsed();
            steps += run.len();
            bytes += serde_json::to_vec(&run)
                .expect("trace serialization should never fail")
                .len();
        }

        let n = iterations as usize;
        let result = BenchmarkResult {
            algorithm: id.to_string(),
            size,
            mean_elapsed: elapsed.as_secs_f64() * 1000.0 / n as f64,
            step_count: (steps + n / 2) / n,
            trace_bytes: bytes / n,
        };
        info!(
            algorithm = id,
            size,
            steps = result.step_count,
            elapsed_ms = result.mean_elapsed,
            "benchmark size complete"
        );
        results.push(result);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_one_result_per_size() {
        let catalog = Catalog::standard();
        let config = BenchmarkConfig {
            sizes: vec![4, 16],
            iterations: 2,
            random_seed: 1,
        };
        let results = run_benchmark(&catalog, "insertion-sort", &config).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].size, 4);
        assert!(results[1].step_count > results[0].step_count);
        assert!(results.iter().all(|r| r.trace_bytes > 0));
    }

    #[test]
    fn step_counts_are_reproducible() {
        let catalog = Catalog::standard();
        let config = BenchmarkConfig {
            sizes: vec![8],
            iterations: 2,
            random_seed: 5,
        };
        let a = run_benchmark(&catalog, "quick-sort", &config).unwrap();
        let b = run_benchmark(&catalog, "quick-sort", &config).unwrap();
        assert_eq!(a[0].step_count, b[0].step_count);
        assert_eq!(a[0].trace_bytes, b[0].trace_bytes);
    }

    #[test]
    fn oversized_requests_are_capped() {
        let catalog = Catalog::standard();
        let config = BenchmarkConfig {
            sizes: vec![100_000],
            iterations: 1,
            random_seed: 2,
        };
        let results = run_benchmark(&catalog, "linear-search", &config).unwrap();
        assert_eq!(results[0].size, algoverse_core::MAX_SEQUENCE_LEN);

        let results = run_benchmark(&catalog, "floyd-warshall", &config).unwrap();
        assert_eq!(results[0].size, crate::algorithms::graph::FLOYD_WARSHALL_MAX_VERTICES);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let err = run_benchmark(&Catalog::standard(), "bogo-sort", &BenchmarkConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            TraceError::UnknownAlgorithm {
                id: "bogo-sort".into()
            }
        );
    }
}
