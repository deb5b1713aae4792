//! Comparison sorts over a working copy of the input sequence.
//!
//! All sorts are ascending. Equal keys never trigger a swap, so bubble,
//! insertion and merge sort are stable.

use algoverse_core::{InputShape, StateSnapshot, TraceError};

use super::span;
use crate::catalog::{AlgorithmDescriptor, Catalog, Category, Generator};
use crate::recorder::{Emission, Recorder};

pub(crate) fn register(catalog: &mut Catalog) {
    let sorts: [(&'static str, &'static str, crate::catalog::SequenceFn); 5] = [
        ("bubble-sort", "Bubble Sort", bubble_sort),
        ("selection-sort", "Selection Sort", selection_sort),
        ("insertion-sort", "Insertion Sort", insertion_sort),
        ("merge-sort", "Merge Sort", merge_sort),
        ("quick-sort", "Quick Sort", quick_sort),
    ];
    for (id, name, generate) in sorts {
        catalog.register(AlgorithmDescriptor::new(
            id,
            name,
            Category::Sorting,
            InputShape::Sequence,
            Generator::Sequence(generate),
        ));
    }
}

fn sorted(arr: &[i64], swaps: usize) -> Emission {
    Emission::outcome(
        format!("Sorted: {:?}", arr),
        StateSnapshot::sequence(arr),
    )
    .highlight(0..arr.len())
    .annotate("swaps", swaps)
}

fn start(rec: &mut Recorder, name: &str, arr: &[i64]) -> Result<(), TraceError> {
    rec.emit(
        Emission::start(
            format!("Starting {} on {} elements", name, arr.len()),
            StateSnapshot::sequence(arr),
        )
        .annotate("n", arr.len()),
    )
}

/// Repeatedly swaps adjacent out-of-order pairs; stops after a pass with no
/// swaps.
pub fn bubble_sort(rec: &mut Recorder, values: &[i64]) -> Result<Emission, TraceError> {
    let mut arr = values.to_vec();
    let n = arr.len();
    let mut swaps = 0;
    start(rec, "bubble sort", &arr)?;

    for pass in 0..n.saturating_sub(1) {
        rec.emit(
            Emission::decide(format!("Pass {}", pass + 1), StateSnapshot::sequence(&arr))
                .highlight(0..n - pass)
                .annotate("pass", pass + 1),
        )?;

        let mut swapped = false;
        for j in 0..n - pass - 1 {
            rec.emit(
                Emission::compare(
                    format!("Comparing {} and {}", arr[j], arr[j + 1]),
                    StateSnapshot::sequence(&arr),
                )
                .highlight([j, j + 1]),
            )?;
            if arr[j] > arr[j + 1] {
                arr.swap(j, j + 1);
                swaps += 1;
                swapped = true;
                rec.emit(
                    Emission::mutate(
                        format!("Swapped {} and {}", arr[j + 1], arr[j]),
                        StateSnapshot::sequence(&arr),
                    )
                    .highlight([j, j + 1])
                    .annotate("swaps", swaps),
                )?;
            }
        }

        let settled = n - pass - 1;
        let note = if swapped {
            format!("Pass {} complete, index {} is in place", pass + 1, settled)
        } else {
            format!("Pass {} made no swaps, sequence is sorted", pass + 1)
        };
        rec.emit(Emission::decide(note, StateSnapshot::sequence(&arr)).highlight(settled..n))?;
        if !swapped {
            break;
        }
    }

    Ok(sorted(&arr, swaps))
}

/// Selects the minimum of the unsorted suffix and swaps it into place.
pub fn selection_sort(rec: &mut Recorder, values: &[i64]) -> Result<Emission, TraceError> {
    let mut arr = values.to_vec();
    let n = arr.len();
    let mut swaps = 0;
    start(rec, "selection sort", &arr)?;

    for i in 0..n.saturating_sub(1) {
        let mut min = i;
        rec.emit(
            Emission::decide(
                format!("Finding minimum of indices {}..{}", i, n - 1),
                StateSnapshot::sequence(&arr),
            )
            .highlight([i])
            .annotate("position", i),
        )?;

        for j in i + 1..n {
            rec.emit(
                Emission::compare(
                    format!("Comparing {} with current minimum {}", arr[j], arr[min]),
                    StateSnapshot::sequence(&arr),
                )
                .highlight([j, min]),
            )?;
            if arr[j] < arr[min] {
                min = j;
                rec.emit(
                    Emission::decide(
                        format!("New minimum {} at index {}", arr[min], min),
                        StateSnapshot::sequence(&arr),
                    )
                    .highlight([min])
                    .annotate("min", min),
                )?;
            }
        }

        if min != i {
            arr.swap(i, min);
            swaps += 1;
            rec.emit(
                Emission::mutate(
                    format!("Swapped {} into index {}", arr[i], i),
                    StateSnapshot::sequence(&arr),
                )
                .highlight([i, min])
                .annotate("swaps", swaps),
            )?;
        } else {
            rec.emit(
                Emission::decide(
                    format!("{} is already in place at index {}", arr[i], i),
                    StateSnapshot::sequence(&arr),
                )
                .highlight([i]),
            )?;
        }
    }

    Ok(sorted(&arr, swaps))
}

/// Grows a sorted prefix by shifting larger elements right.
pub fn insertion_sort(rec: &mut Recorder, values: &[i64]) -> Result<Emission, TraceError> {
    let mut arr = values.to_vec();
    let mut writes = 0;
    start(rec, "insertion sort", &arr)?;

    for i in 1..arr.len() {
        let key = arr[i];
        rec.emit(
            Emission::decide(format!("Inserting {}", key), StateSnapshot::sequence(&arr))
                .highlight([i])
                .annotate("key", key),
        )?;

        let mut j = i;
        while j > 0 {
            rec.emit(
                Emission::compare(
                    format!("Comparing {} with {}", arr[j - 1], key),
                    StateSnapshot::sequence(&arr),
                )
                .highlight([j - 1, j])
                .annotate("key", key),
            )?;
            if arr[j - 1] <= key {
                break;
            }
            arr[j] = arr[j - 1];
            writes += 1;
            rec.emit(
                Emission::mutate(
                    format!("Shifted {} to index {}", arr[j], j),
                    StateSnapshot::sequence(&arr),
                )
                .highlight([j])
                .annotate("key", key),
            )?;
            j -= 1;
        }

        if j != i {
            arr[j] = key;
            writes += 1;
            rec.emit(
                Emission::mutate(
                    format!("Placed {} at index {}", key, j),
                    StateSnapshot::sequence(&arr),
                )
                .highlight([j]),
            )?;
        }
    }

    Ok(sorted(&arr, writes))
}

/// Top-down merge sort over half-open ranges.
pub fn merge_sort(rec: &mut Recorder, values: &[i64]) -> Result<Emission, TraceError> {
    let mut arr = values.to_vec();
    let mut writes = 0;
    start(rec, "merge sort", &arr)?;
    merge_sort_range(rec, &mut arr, 0, values.len(), &mut writes)?;
    Ok(sorted(&arr, writes))
}

fn merge_sort_range(
    rec: &mut Recorder,
    arr: &mut [i64],
    lo: usize,
    hi: usize,
    writes: &mut usize,
) -> Result<(), TraceError> {
    if hi - lo <= 1 {
        return Ok(());
    }
    let mid = lo + (hi - lo) / 2;
    rec.emit(
        Emission::decide(
            format!("Splitting [{}, {}) into [{}, {}) and [{}, {})", lo, hi, lo, mid, mid, hi),
            StateSnapshot::sequence(arr),
        )
        .highlight(lo..hi)
        .annotate("lo", lo)
        .annotate("mid", mid)
        .annotate("hi", hi),
    )?;

    merge_sort_range(rec, arr, lo, mid, writes)?;
    merge_sort_range(rec, arr, mid, hi, writes)?;

    let left = arr[lo..mid].to_vec();
    let right = arr[mid..hi].to_vec();
    let (mut i, mut j, mut k) = (0, 0, lo);

    while i < left.len() && j < right.len() {
        rec.emit(
            Emission::compare(
                format!("Comparing {} and {}", left[i], right[j]),
                StateSnapshot::sequence(arr),
            )
            .highlight([k])
            .annotate("left", left[i])
            .annotate("right", right[j]),
        )?;
        let take = if left[i] <= right[j] {
            i += 1;
            left[i - 1]
        } else {
            j += 1;
            right[j - 1]
        };
        arr[k] = take;
        *writes += 1;
        rec.emit(
            Emission::mutate(format!("Placed {} at index {}", take, k), StateSnapshot::sequence(arr))
                .highlight([k]),
        )?;
        k += 1;
    }

    for &rest in left[i..].iter().chain(right[j..].iter()) {
        arr[k] = rest;
        *writes += 1;
        rec.emit(
            Emission::mutate(format!("Copied {} to index {}", rest, k), StateSnapshot::sequence(arr))
                .highlight([k]),
        )?;
        k += 1;
    }

    rec.emit(
        Emission::decide(format!("Merged [{}, {})", lo, hi), StateSnapshot::sequence(arr))
            .highlight(lo..hi),
    )?;
    Ok(())
}

/// Quick sort with Lomuto partitioning around the last element.
pub fn quick_sort(rec: &mut Recorder, values: &[i64]) -> Result<Emission, TraceError> {
    let mut arr = values.to_vec();
    let mut swaps = 0;
    start(rec, "quick sort", &arr)?;
    if !arr.is_empty() {
        let hi = arr.len() - 1;
        quick_sort_range(rec, &mut arr, 0, hi, &mut swaps)?;
    }
    Ok(sorted(&arr, swaps))
}

fn quick_sort_range(
    rec: &mut Recorder,
    arr: &mut [i64],
    lo: usize,
    hi: usize,
    swaps: &mut usize,
) -> Result<(), TraceError> {
    if lo >= hi {
        return Ok(());
    }
    let pivot = arr[hi];
    rec.emit(
        Emission::decide(
            format!("Partitioning [{}, {}] around pivot {}", lo, hi, pivot),
            StateSnapshot::sequence(arr),
        )
        .highlight(span(lo, hi))
        .annotate("pivot", pivot),
    )?;

    // `store` is the next slot for an element <= pivot.
    let mut store = lo;
    for j in lo..hi {
        rec.emit(
            Emission::compare(
                format!("Comparing {} with pivot {}", arr[j], pivot),
                StateSnapshot::sequence(arr),
            )
            .highlight([j, hi])
            .annotate("pivot", pivot),
        )?;
        if arr[j] <= pivot {
            if store != j {
                arr.swap(store, j);
                *swaps += 1;
                rec.emit(
                    Emission::mutate(
                        format!("Swapped {} and {}", arr[store], arr[j]),
                        StateSnapshot::sequence(arr),
                    )
                    .highlight([store, j]),
                )?;
            }
            store += 1;
        }
    }

    if store != hi {
        arr.swap(store, hi);
        *swaps += 1;
        rec.emit(
            Emission::mutate(
                format!("Moved pivot {} to index {}", pivot, store),
                StateSnapshot::sequence(arr),
            )
            .highlight([store, hi]),
        )?;
    } else {
        rec.emit(
            Emission::decide(
                format!("Pivot {} is already at index {}", pivot, store),
                StateSnapshot::sequence(arr),
            )
            .highlight([store]),
        )?;
    }

    if store > lo {
        quick_sort_range(rec, arr, lo, store - 1, swaps)?;
    }
    quick_sort_range(rec, arr, store + 1, hi, swaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SequenceFn;
    use crate::recorder::{instrument, RecorderConfig};
    use algoverse_core::{StepKind, TraceRun};

    const SORTS: [(&str, SequenceFn); 5] = [
        ("bubble", bubble_sort),
        ("selection", selection_sort),
        ("insertion", insertion_sort),
        ("merge", merge_sort),
        ("quick", quick_sort),
    ];

    fn run(f: SequenceFn, values: &[i64]) -> TraceRun {
        instrument("sort", &RecorderConfig::default(), |rec| f(rec, values)).unwrap()
    }

    fn final_values(run: &TraceRun) -> Vec<i64> {
        run.final_step()
            .and_then(|s| s.snapshot.as_sequence())
            .map(|v| v.to_vec())
            .unwrap()
    }

    #[test]
    fn every_sort_sorts() {
        let inputs: Vec<Vec<i64>> = vec![
            vec![],
            vec![1],
            vec![2, 1],
            vec![5, 3, 1, 4, 2],
            vec![3, 3, 1, 3, -2, 0],
            vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
            vec![1, 2, 3, 4],
        ];
        for (name, f) in SORTS {
            for input in &inputs {
                let mut expected = input.clone();
                expected.sort();
                let trace = run(f, input);
                assert_eq!(final_values(&trace), expected, "{} sort on {:?}", name, input);
                assert!(trace.validate().is_ok());
            }
        }
    }

    #[test]
    fn bubble_sort_on_sorted_input_stops_after_one_pass() {
        let trace = run(bubble_sort, &[1, 2, 3, 4]);
        assert_eq!(trace.stats().comparisons, 3);
        assert_eq!(trace.stats().mutations, 0);
    }

    #[test]
    fn bubble_sort_never_swaps_equal_keys() {
        let trace = run(bubble_sort, &[2, 2, 2]);
        assert_eq!(trace.stats().mutations, 0);
    }

    #[test]
    fn quick_sort_partitions_are_decisions() {
        let trace = run(quick_sort, &[3, 1, 2]);
        let first = trace
            .iter()
            .find(|s| s.kind == StepKind::Decide)
            .unwrap();
        assert!(first.description.contains("pivot 2"), "{}", first.description);
    }

    #[test]
    fn merge_sort_splits_before_comparing() {
        let trace = run(merge_sort, &[4, 3]);
        let kinds: Vec<StepKind> = trace.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::Start,
                StepKind::Decide,
                StepKind::Compare,
                StepKind::Mutate,
                StepKind::Mutate,
                StepKind::Decide,
                StepKind::Outcome,
            ]
        );
    }
}
