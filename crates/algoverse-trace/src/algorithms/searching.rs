//! Sequential and interval-halving searches.
//!
//! Terminal steps always carry `found` and, on success, `index`.

use algoverse_core::{InputShape, StateSnapshot, TraceError};

use super::span;
use crate::catalog::{AlgorithmDescriptor, Catalog, Category, Generator};
use crate::recorder::{Emission, Recorder};

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register(AlgorithmDescriptor::new(
        "linear-search",
        "Linear Search",
        Category::Searching,
        InputShape::SearchSequence,
        Generator::Search(linear_search),
    ));
    catalog.register(AlgorithmDescriptor::new(
        "binary-search",
        "Binary Search",
        Category::Searching,
        InputShape::SortedSearchSequence,
        Generator::Search(binary_search),
    ));
    catalog.register(AlgorithmDescriptor::new(
        "jump-search",
        "Jump Search",
        Category::Searching,
        InputShape::SortedSearchSequence,
        Generator::Search(jump_search),
    ));
}

fn found(values: &[i64], target: i64, index: usize) -> Emission {
    Emission::outcome(
        format!("Found {} at index {}", target, index),
        StateSnapshot::sequence(values),
    )
    .highlight([index])
    .annotate("target", target)
    .annotate("found", true)
    .annotate("index", index)
}

fn not_found(values: &[i64], target: i64) -> Emission {
    Emission::outcome(
        format!("Not found: {} is not in the sequence", target),
        StateSnapshot::sequence(values),
    )
    .annotate("target", target)
    .annotate("found", false)
}

/// Checks each element from left to right.
pub fn linear_search(rec: &mut Recorder, values: &[i64], target: i64) -> Result<Emission, TraceError> {
    rec.emit(
        Emission::start(
            format!("Starting linear search for {}", target),
            StateSnapshot::sequence(values),
        )
        .annotate("target", target),
    )?;

    for (i, &v) in values.iter().enumerate() {
        rec.emit(
            Emission::compare(
                format!("Checking index {}: {} == {}?", i, v, target),
                StateSnapshot::sequence(values),
            )
            .highlight([i])
            .annotate("target", target)
            .annotate("index", i),
        )?;
        if v == target {
            return Ok(found(values, target, i));
        }
    }

    Ok(not_found(values, target))
}

/// Halves the search interval `[low, high]` of an ascending sequence.
pub fn binary_search(rec: &mut Recorder, values: &[i64], target: i64) -> Result<Emission, TraceError> {
    let mut low: i64 = 0;
    let mut high: i64 = values.len() as i64 - 1;

    rec.emit(
        Emission::start(
            format!("Starting binary search for {} in a sorted sequence", target),
            StateSnapshot::sequence(values),
        )
        .annotate("target", target)
        .annotate("low", low)
        .annotate("high", high),
    )?;

    while low <= high {
        let mid = low + (high - low) / 2;
        let (lo, hi, m) = (low as usize, high as usize, mid as usize);

        rec.emit(
            Emission::decide(
                format!("Search range [{}, {}], middle index {}", low, high, mid),
                StateSnapshot::sequence(values),
            )
            .highlight(span(lo, hi))
            .annotate("low", low)
            .annotate("high", high)
            .annotate("mid", mid),
        )?;

        rec.emit(
            Emission::compare(
                format!("Comparing {} with middle element {} at index {}", target, values[m], mid),
                StateSnapshot::sequence(values),
            )
            .highlight([m])
            .annotate("low", low)
            .annotate("high", high)
            .annotate("mid", mid),
        )?;

        if values[m] == target {
            return Ok(found(values, target, m)
                .annotate("low", low)
                .annotate("high", high)
                .annotate("mid", mid));
        } else if target < values[m] {
            high = mid - 1;
            rec.emit(
                Emission::decide(
                    format!("{} < {}, searching left half", target, values[m]),
                    StateSnapshot::sequence(values),
                )
                .highlight(if mid > low { span(lo, m - 1) } else { span(1, 0) })
                .annotate("low", low)
                .annotate("high", high),
            )?;
        } else {
            low = mid + 1;
            rec.emit(
                Emission::decide(
                    format!("{} > {}, searching right half", target, values[m]),
                    StateSnapshot::sequence(values),
                )
                .highlight(span(m + 1, hi))
                .annotate("low", low)
                .annotate("high", high),
            )?;
        }
    }

    Ok(not_found(values, target)
        .annotate("low", low)
        .annotate("high", high))
}

/// Jumps ahead in blocks of `floor(sqrt(n))`, then scans the block that may
/// hold the target.
pub fn jump_search(rec: &mut Recorder, values: &[i64], target: i64) -> Result<Emission, TraceError> {
    let n = values.len();
    let mut jump = 1;
    while (jump + 1) * (jump + 1) <= n {
        jump += 1;
    }

    rec.emit(
        Emission::start(
            format!("Starting jump search for {} with block size {}", target, jump),
            StateSnapshot::sequence(values),
        )
        .annotate("target", target)
        .annotate("block", jump),
    )?;

    if n == 0 {
        return Ok(not_found(values, target));
    }

    let mut prev = 0;
    let mut next = jump.min(n);
    loop {
        let block_end = next - 1;
        rec.emit(
            Emission::compare(
                format!("Block end index {}: {} < {}?", block_end, values[block_end], target),
                StateSnapshot::sequence(values),
            )
            .highlight([block_end])
            .annotate("prev", prev)
            .annotate("next", next),
        )?;
        if values[block_end] >= target {
            break;
        }
        prev = next;
        if prev >= n {
            return Ok(not_found(values, target));
        }
        next = (next + jump).min(n);
        rec.emit(
            Emission::decide(
                format!("Jumping to block [{}, {}]", prev, next - 1),
                StateSnapshot::sequence(values),
            )
            .highlight(span(prev, next - 1))
            .annotate("prev", prev)
            .annotate("next", next),
        )?;
    }

    rec.emit(
        Emission::decide(
            format!("Scanning block [{}, {}]", prev, next - 1),
            StateSnapshot::sequence(values),
        )
        .highlight(span(prev, next - 1)),
    )?;

    for i in prev..next {
        rec.emit(
            Emission::compare(
                format!("Checking index {}: {} == {}?", i, values[i], target),
                StateSnapshot::sequence(values),
            )
            .highlight([i])
            .annotate("index", i),
        )?;
        if values[i] == target {
            return Ok(found(values, target, i));
        }
        if values[i] > target {
            break;
        }
    }

    Ok(not_found(values, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{instrument, RecorderConfig};
    use algoverse_core::{StepKind, TraceRun, Value};

    fn run(
        f: fn(&mut Recorder, &[i64], i64) -> Result<Emission, TraceError>,
        values: &[i64],
        target: i64,
    ) -> TraceRun {
        instrument("search", &RecorderConfig::default(), |rec| f(rec, values, target)).unwrap()
    }

    fn found_index(run: &TraceRun) -> Option<i64> {
        let last = run.final_step().unwrap();
        match last.annotation("found") {
            Some(Value::Bool(true)) => last.annotation("index").and_then(|v| v.as_int()),
            _ => None,
        }
    }

    #[test]
    fn linear_search_finds_first_occurrence() {
        let trace = run(linear_search, &[4, 7, 7, 1], 7);
        assert_eq!(found_index(&trace), Some(1));
        assert_eq!(trace.stats().comparisons, 2);
    }

    #[test]
    fn linear_search_empty_sequence() {
        let trace = run(linear_search, &[], 3);
        assert_eq!(trace.len(), 2);
        assert_eq!(found_index(&trace), None);
    }

    #[test]
    fn binary_search_each_element() {
        let values: Vec<i64> = (1..=10).collect();
        for (i, &v) in values.iter().enumerate() {
            let trace = run(binary_search, &values, v);
            assert_eq!(found_index(&trace), Some(i as i64));
        }
    }

    #[test]
    fn binary_search_absent_values() {
        for target in [0, 4, 11] {
            let trace = run(binary_search, &[1, 3, 5, 7, 9, 10], target);
            assert_eq!(found_index(&trace), None);
            let last = trace.final_step().unwrap();
            assert_eq!(last.kind, StepKind::Outcome);
            assert_eq!(last.annotation("found"), Some(&Value::Bool(false)));
        }
    }

    #[test]
    fn binary_search_single_element() {
        assert_eq!(found_index(&run(binary_search, &[5], 5)), Some(0));
        assert_eq!(found_index(&run(binary_search, &[5], 4)), None);
    }

    #[test]
    fn jump_search_matches_linear_result() {
        let values = vec![1, 2, 2, 4, 8, 9, 13, 21, 34];
        for target in -1..36 {
            let expected = values.iter().position(|&v| v == target).map(|i| i as i64);
            assert_eq!(
                found_index(&run(jump_search, &values, target)),
                expected,
                "target {}",
                target
            );
        }
    }

    #[test]
    fn jump_search_empty() {
        let trace = run(jump_search, &[], 1);
        assert_eq!(trace.len(), 2);
        assert_eq!(found_index(&trace), None);
    }
}
