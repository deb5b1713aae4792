//! Seeded property checks over the whole catalog.
//!
//! For every registered algorithm the checker generates random UI-scale
//! inputs that satisfy the algorithm's declared input shape, records each
//! input twice and verifies that:
//! 1. recording succeeds,
//! 2. the run is well formed (gapless indices, exactly one terminal step,
//!    terminal last),
//! 3. both recordings have the same fingerprint.
//!
//! Reproducibility: given the same `random_seed`, the same inputs are
//! generated and the same result is produced.

use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, warn};

use algoverse_core::{AlgorithmInput, EdgeInput, InputShape, WeightRule, MAX_EDGES, MAX_EDGE_WEIGHT};

use crate::catalog::Catalog;

const VALUE_RANGE: std::ops::RangeInclusive<i64> = -50..=50;
/// Chance that a generated number is drawn from the full range the shape
/// allows instead of the small readable range.
const EXTREME_ODDS: f64 = 0.2;
const TEXT_ALPHABET: &[char] = &['a', 'b', 'c'];

/// Configuration for a property check run.
#[derive(Debug, Clone)]
pub struct PropertyCheckConfig {
    /// Random inputs per algorithm.
    pub iterations: u32,
    /// Random seed for reproducibility.
    pub random_seed: u64,
    /// Upper bound for generated input sizes.
    pub max_size: usize,
}

impl Default for PropertyCheckConfig {
    fn default() -> Self {
        PropertyCheckConfig {
            iterations: 25,
            random_seed: 0,
            max_size: 12,
        }
    }
}

/// Result of a property check run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCheckResult {
    /// Total inputs checked across all algorithms.
    pub total_run: u32,
    pub passed: u32,
    pub failures: Vec<PropertyFailure>,
    /// The random seed used (for reproducibility).
    pub random_seed: u64,
}

impl PropertyCheckResult {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single failing input.
#[derive(Debug, Clone, Serialize)]
pub struct PropertyFailure {
    pub algorithm: String,
    /// The counterexample.
    pub input: AlgorithmInput,
    pub reason: String,
}

/// Generates a random input of roughly `size` elements satisfying `shape`.
///
/// `size` is capped at [`InputShape::size_limit`].
pub fn generate_input(shape: &InputShape, size: usize, rng: &mut ChaCha8Rng) -> AlgorithmInput {
    let size = size.min(shape.size_limit());
    match *shape {
        InputShape::Sequence => AlgorithmInput::sequence(random_values(size, rng)),

        InputShape::SearchSequence => {
            let values = random_values(size, rng);
            let target = pick_target(&values, rng);
            AlgorithmInput::search(values, target)
        }

        InputShape::SortedSearchSequence => {
            let mut values = random_values(size, rng);
            values.sort_unstable();
            let target = pick_target(&values, rng);
            AlgorithmInput::search(values, target)
        }

        InputShape::Coins { max_amount, .. } => {
            let coins: Vec<i64> = (0..size.max(1)).map(|_| rng.gen_range(1..=20)).collect();
            let amount = rng.gen_range(0..=max_amount);
            AlgorithmInput::search(coins, amount)
        }

        InputShape::SubsetSum { .. } => {
            let values: Vec<i64> = (0..size)
                .map(|_| {
                    if rng.gen_bool(EXTREME_ODDS) {
                        rng.gen_range(0..=i64::MAX)
                    } else {
                        rng.gen_range(0..=20)
                    }
                })
                .collect();
            let total = values.iter().fold(0i64, |acc, v| acc.saturating_add(*v));
            let target = rng.gen_range(0..=total.saturating_add(5));
            AlgorithmInput::search(values, target)
        }

        InputShape::Graph { weights, .. } => {
            let vertex_count = size.max(1);
            let edge_count = rng.gen_range(0..=(2 * vertex_count).min(MAX_EDGES));
            let (low, extreme_low) = match weights {
                WeightRule::Any => (-3, -MAX_EDGE_WEIGHT),
                WeightRule::NonNegative => (0, 0),
            };
            let edges = (0..edge_count)
                .map(|_| {
                    let weight = if rng.gen_bool(EXTREME_ODDS) {
                        rng.gen_range(extreme_low..=MAX_EDGE_WEIGHT)
                    } else {
                        rng.gen_range(low..=20)
                    };
                    EdgeInput::weighted(
                        rng.gen_range(0..vertex_count),
                        rng.gen_range(0..vertex_count),
                        weight,
                    )
                })
                .collect();
            let source = rng.gen_range(0..vertex_count);
            AlgorithmInput::graph(vertex_count, edges, Some(source))
        }

        InputShape::Text {
            allow_empty_pattern,
            ..
        } => {
            let text = random_text(size, rng);
            let min_len = if allow_empty_pattern { 0 } else { 1 };
            let pattern_len = rng.gen_range(min_len..=3);
            let pattern = random_text(pattern_len, rng);
            AlgorithmInput::text(&text, &pattern)
        }

        InputShape::Scalar { min, max } => AlgorithmInput::scalar(size.clamp(min, max)),
    }
}

fn random_value(rng: &mut ChaCha8Rng) -> i64 {
    if rng.gen_bool(EXTREME_ODDS) {
        rng.gen()
    } else {
        rng.gen_range(VALUE_RANGE)
    }
}

fn random_values(len: usize, rng: &mut ChaCha8Rng) -> Vec<i64> {
    (0..len).map(|_| random_value(rng)).collect()
}

fn random_text(len: usize, rng: &mut ChaCha8Rng) -> String {
    (0..len)
        .map(|_| TEXT_ALPHABET[rng.gen_range(0..TEXT_ALPHABET.len())])
        .collect()
}

/// Half the time a value from the sequence, otherwise a random value.
fn pick_target(values: &[i64], rng: &mut ChaCha8Rng) -> i64 {
    match values.choose(rng) {
        Some(&v) if rng.gen_bool(0.5) => v,
        _ => random_value(rng),
    }
}

/// Runs the property checks over every algorithm in `catalog`.
pub fn check_properties(catalog: &Catalog, config: &PropertyCheckConfig) -> PropertyCheckResult {
    let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);
    let mut failures = Vec::new();
    let mut total_run: u32 = 0;
    let mut passed: u32 = 0;

    for descriptor in catalog.descriptors() {
        for _ in 0..config.iterations {
            total_run += 1;
            let size = rng.gen_range(0..=config.max_size);
            let input = generate_input(&descriptor.shape, size, &mut rng);
            match check_single(catalog, descriptor.id, &input) {
                Ok(()) => passed += 1,
                Err(reason) => {
                    warn!(algorithm = descriptor.id, %reason, "property check failed");
                    failures.push(PropertyFailure {
                        algorithm: descriptor.id.to_string(),
                        input,
                        reason,
                    });
                }
            }
        }
        debug!(algorithm = descriptor.id, "property checks finished");
    }

    PropertyCheckResult {
        total_run,
        passed,
        failures,
        random_seed: config.random_seed,
    }
}

fn check_single(catalog: &Catalog, id: &str, input: &AlgorithmInput) -> Result<(), String> {
    let first = catalog.record(id, input).map_err(|e| e.to_string())?;
    first.validate().map_err(|e| e.to_string())?;
    let second = catalog.record(id, input).map_err(|e| e.to_string())?;
    if first.fingerprint() != second.fingerprint() {
        return Err(format!(
            "non-deterministic: {} steps then {} steps",
            first.len(),
            second.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_inputs_satisfy_their_shapes() {
        let catalog = Catalog::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for descriptor in catalog.descriptors() {
            for size in [0, 1, 5, 12, 500] {
                let input = generate_input(&descriptor.shape, size, &mut rng);
                assert!(
                    descriptor.shape.validate(&input).is_ok(),
                    "{}: {:?} rejected: {:?}",
                    descriptor.id,
                    input,
                    descriptor.shape.validate(&input)
                );
            }
        }
    }

    #[test]
    fn same_seed_generates_same_inputs() {
        let shape = InputShape::Graph {
            weights: WeightRule::Any,
            max_vertices: 16,
        };
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        assert_eq!(
            generate_input(&shape, 6, &mut a),
            generate_input(&shape, 6, &mut b)
        );
    }

    #[test]
    fn standard_catalog_passes() {
        let catalog = Catalog::standard();
        let config = PropertyCheckConfig {
            iterations: 5,
            random_seed: 42,
            max_size: 8,
        };
        let result = check_properties(&catalog, &config);
        assert!(result.is_success(), "failures: {:?}", result.failures);
        assert_eq!(result.total_run, 5 * catalog.len() as u32);
        assert_eq!(result.passed, result.total_run);
        assert_eq!(result.random_seed, 42);
    }

    #[test]
    fn generator_reaches_extreme_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut largest = 0i64;
        for _ in 0..20 {
            if let AlgorithmInput::Sequence(s) =
                generate_input(&InputShape::SubsetSum { max_len: 16 }, 16, &mut rng)
            {
                largest = largest.max(s.sequence.into_iter().max().unwrap_or(0));
            }
        }
        assert!(largest > i64::from(u32::MAX), "largest element {}", largest);

        let shape = InputShape::Graph {
            weights: WeightRule::Any,
            max_vertices: 64,
        };
        let mut heaviest = 0i64;
        for _ in 0..20 {
            if let AlgorithmInput::Graph(g) = generate_input(&shape, 64, &mut rng) {
                heaviest = heaviest.max(g.edges.iter().map(|e| e.weight().abs()).max().unwrap_or(0));
            }
        }
        assert!(heaviest > 1000, "heaviest weight {}", heaviest);
    }

    #[test]
    fn large_weights_and_sums_record_cleanly() {
        let catalog = Catalog::standard();
        let config = PropertyCheckConfig {
            iterations: 10,
            random_seed: 11,
            max_size: 12,
        };
        let result = check_properties(&catalog, &config);
        assert!(result.is_success(), "failures: {:?}", result.failures);
    }

    #[test]
    fn empty_catalog_runs_nothing() {
        let result = check_properties(&Catalog::empty(), &PropertyCheckConfig::default());
        assert_eq!(result.total_run, 0);
        assert!(result.is_success());
    }
}
