//! Divide-and-conquer minimum and maximum.

use std::cmp::Ordering;

use algoverse_core::{InputShape, StateSnapshot, TraceError};

use super::span;
use crate::catalog::{AlgorithmDescriptor, Catalog, Category, Generator};
use crate::recorder::{Emission, Recorder};

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register(AlgorithmDescriptor::new(
        "max-min",
        "Maximum and Minimum (divide and conquer)",
        Category::DivideAndConquer,
        InputShape::Sequence,
        Generator::Sequence(max_min),
    ));
}

/// Splits the range in half, solves both halves and combines with two
/// comparisons.
pub fn max_min(rec: &mut Recorder, values: &[i64]) -> Result<Emission, TraceError> {
    rec.emit(
        Emission::start(
            format!("Finding minimum and maximum of {} elements", values.len()),
            StateSnapshot::sequence(values),
        )
        .annotate("n", values.len()),
    )?;

    if values.is_empty() {
        return Ok(Emission::outcome(
            "Sequence is empty, no minimum or maximum",
            StateSnapshot::sequence(values),
        )
        .annotate("found", false));
    }

    let (min, max) = solve(rec, values, 0, values.len() - 1)?;
    Ok(Emission::outcome(
        format!("Minimum {} at index {}, maximum {} at index {}", values[min], min, values[max], max),
        StateSnapshot::sequence(values),
    )
    .highlight([min, max])
    .annotate("found", true)
    .annotate("min", values[min])
    .annotate("max", values[max])
    .annotate("minIndex", min)
    .annotate("maxIndex", max))
}

/// Returns `(argmin, argmax)` over `lo..=hi`, preferring the leftmost index
/// on ties.
fn solve(
    rec: &mut Recorder,
    values: &[i64],
    lo: usize,
    hi: usize,
) -> Result<(usize, usize), TraceError> {
    if lo == hi {
        rec.emit(
            Emission::decide(
                format!("Single element {} at index {}", values[lo], lo),
                StateSnapshot::sequence(values),
            )
            .highlight([lo]),
        )?;
        return Ok((lo, lo));
    }

    if hi == lo + 1 {
        rec.emit(
            Emission::compare(
                format!("Comparing {} and {}", values[lo], values[hi]),
                StateSnapshot::sequence(values),
            )
            .highlight([lo, hi]),
        )?;
        return Ok(match values[hi].cmp(&values[lo]) {
            Ordering::Less => (hi, lo),
            Ordering::Greater => (lo, hi),
            Ordering::Equal => (lo, lo),
        });
    }

    let mid = lo + (hi - lo) / 2;
    rec.emit(
        Emission::decide(
            format!("Splitting [{}, {}] at {}", lo, hi, mid),
            StateSnapshot::sequence(values),
        )
        .highlight(span(lo, hi))
        .annotate("mid", mid),
    )?;
    let (lmin, lmax) = solve(rec, values, lo, mid)?;
    let (rmin, rmax) = solve(rec, values, mid + 1, hi)?;

    rec.emit(
        Emission::compare(
            format!("Minimum: {} vs {}", values[lmin], values[rmin]),
            StateSnapshot::sequence(values),
        )
        .highlight([lmin, rmin]),
    )?;
    let min = if values[rmin] < values[lmin] { rmin } else { lmin };

    rec.emit(
        Emission::compare(
            format!("Maximum: {} vs {}", values[lmax], values[rmax]),
            StateSnapshot::sequence(values),
        )
        .highlight([lmax, rmax]),
    )?;
    let max = if values[rmax] > values[lmax] { rmax } else { lmax };

    rec.emit(
        Emission::decide(
            format!("Range [{}, {}]: min {}, max {}", lo, hi, values[min], values[max]),
            StateSnapshot::sequence(values),
        )
        .highlight([min, max]),
    )?;
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{instrument, RecorderConfig};
    use algoverse_core::{TraceRun, Value};

    fn run(values: &[i64]) -> TraceRun {
        instrument("max-min", &RecorderConfig::default(), |rec| max_min(rec, values)).unwrap()
    }

    #[test]
    fn finds_extremes() {
        let trace = run(&[3, -1, 8, 8, 0, -1, 5]);
        let last = trace.final_step().unwrap();
        assert_eq!(last.annotation("min"), Some(&Value::Int(-1)));
        assert_eq!(last.annotation("max"), Some(&Value::Int(8)));
        assert_eq!(last.annotation("minIndex"), Some(&Value::Int(1)));
        assert_eq!(last.annotation("maxIndex"), Some(&Value::Int(2)));
    }

    #[test]
    fn single_element_is_both() {
        let trace = run(&[7]);
        let last = trace.final_step().unwrap();
        assert_eq!(last.annotation("minIndex"), Some(&Value::Int(0)));
        assert_eq!(last.annotation("maxIndex"), Some(&Value::Int(0)));
    }

    #[test]
    fn empty_sequence_is_an_outcome() {
        let trace = run(&[]);
        assert_eq!(trace.len(), 2);
        assert_eq!(
            trace.final_step().unwrap().annotation("found"),
            Some(&Value::Bool(false))
        );
    }
}
