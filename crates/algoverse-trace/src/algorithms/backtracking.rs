//! Depth-first search with explicit backtracking.

use algoverse_core::{InputShape, StateSnapshot, TraceError};

use crate::catalog::{AlgorithmDescriptor, Catalog, Category, Generator};
use crate::recorder::{Emission, Recorder};

/// Largest board size accepted by `n-queens`.
pub const N_QUEENS_MAX: usize = 10;
/// Largest element count accepted by `subset-sum`.
pub const SUBSET_SUM_MAX_LEN: usize = 16;

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register(AlgorithmDescriptor::new(
        "n-queens",
        "N-Queens",
        Category::Backtracking,
        InputShape::Scalar {
            min: 1,
            max: N_QUEENS_MAX,
        },
        Generator::Scalar(n_queens),
    ));
    catalog.register(AlgorithmDescriptor::new(
        "subset-sum",
        "Subset Sum",
        Category::Backtracking,
        InputShape::SubsetSum {
            max_len: SUBSET_SUM_MAX_LEN,
        },
        Generator::Search(subset_sum),
    ));
}

// ---------------------------------------------------------------------------
// N-Queens
// ---------------------------------------------------------------------------

struct Board {
    n: usize,
    cells: Vec<Vec<i64>>,
    // Column of the queen in each filled row.
    queens: Vec<usize>,
}

impl Board {
    fn new(n: usize) -> Self {
        Board {
            n,
            cells: vec![vec![0; n]; n],
            queens: Vec::with_capacity(n),
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::grid(&self.cells)
    }

    fn cell(&self, row: usize, col: usize) -> usize {
        row * self.n + col
    }

    /// Row index of the first placed queen attacking `(row, col)`.
    fn attacker(&self, row: usize, col: usize) -> Option<usize> {
        self.queens
            .iter()
            .enumerate()
            .find(|&(r, &c)| c == col || row - r == c.abs_diff(col))
            .map(|(r, _)| r)
    }

    fn place(&mut self, row: usize, col: usize) {
        self.cells[row][col] = 1;
        self.queens.push(col);
    }

    fn remove(&mut self, row: usize, col: usize) {
        self.cells[row][col] = 0;
        self.queens.pop();
    }
}

/// Places `n` non-attacking queens row by row, trying columns left to
/// right. The board grid marks queens with 1.
pub fn n_queens(rec: &mut Recorder, n: usize) -> Result<Emission, TraceError> {
    let mut board = Board::new(n);
    rec.emit(
        Emission::start(format!("Placing {} queens on a {}x{} board", n, n, n), board.snapshot())
            .annotate("n", n),
    )?;

    if place_row(rec, &mut board, 0)? {
        let cells: Vec<usize> = board
            .queens
            .iter()
            .enumerate()
            .map(|(r, &c)| board.cell(r, c))
            .collect();
        return Ok(Emission::outcome(
            format!("Solved: queens in columns {:?}", board.queens),
            board.snapshot(),
        )
        .highlight(cells)
        .annotate("solved", true)
        .annotate("queens", board.queens.clone()));
    }

    Ok(Emission::outcome(
        format!("No placement of {} non-attacking queens exists", n),
        board.snapshot(),
    )
    .annotate("solved", false))
}

fn place_row(rec: &mut Recorder, board: &mut Board, row: usize) -> Result<bool, TraceError> {
    if row == board.n {
        return Ok(true);
    }

    for col in 0..board.n {
        let attacker = board.attacker(row, col);
        rec.emit(
            Emission::compare(format!("Is ({}, {}) safe?", row, col), board.snapshot())
                .highlight([board.cell(row, col)])
                .annotate("safe", attacker.is_none()),
        )?;
        if let Some(r) = attacker {
            rec.emit(
                Emission::decide(
                    format!("({}, {}) is attacked by the queen in row {}", row, col, r),
                    board.snapshot(),
                )
                .highlight([board.cell(row, col), board.cell(r, board.queens[r])]),
            )?;
            continue;
        }

        board.place(row, col);
        rec.emit(
            Emission::mutate(format!("Placed queen at ({}, {})", row, col), board.snapshot())
                .highlight([board.cell(row, col)])
                .annotate("row", row)
                .annotate("col", col),
        )?;

        if place_row(rec, board, row + 1)? {
            return Ok(true);
        }

        board.remove(row, col);
        rec.emit(
            Emission::decide(
                format!("Backtracking: removed queen from ({}, {})", row, col),
                board.snapshot(),
            )
            .highlight([board.cell(row, col)])
            .annotate("row", row),
        )?;
    }

    Ok(false)
}

// ---------------------------------------------------------------------------
// Subset sum
// ---------------------------------------------------------------------------

struct SubsetSearch<'a> {
    values: &'a [i64],
    target: i64,
    // suffix[i] = sum of values[i..], saturating at i64::MAX
    suffix: Vec<i64>,
    chosen: Vec<i64>,
}

impl SubsetSearch<'_> {
    fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::grid(&[self.values.to_vec(), self.chosen.clone()])
    }

    fn chosen_indices(&self) -> Vec<usize> {
        (0..self.values.len())
            .filter(|&i| self.chosen[i] == 1)
            .collect()
    }

    fn search(&mut self, rec: &mut Recorder, i: usize, sum: i64) -> Result<bool, TraceError> {
        if sum == self.target {
            rec.emit(
                Emission::decide(format!("Reached target {}", self.target), self.snapshot())
                    .highlight(self.chosen_indices()),
            )?;
            return Ok(true);
        }
        if i == self.values.len() || sum.saturating_add(self.suffix[i]) < self.target {
            rec.emit(
                Emission::decide(
                    format!("Sum {} cannot reach {} from index {}", sum, self.target, i),
                    self.snapshot(),
                )
                .annotate("sum", sum),
            )?;
            return Ok(false);
        }

        let v = self.values[i];
        rec.emit(
            Emission::compare(
                format!("Include {}? {} + {} vs target {}", v, sum, v, self.target),
                self.snapshot(),
            )
            .highlight([i])
            .annotate("sum", sum),
        )?;
        // Sums past i64::MAX overshoot any target.
        match sum.checked_add(v).filter(|next| *next <= self.target) {
            Some(next) => {
                self.chosen[i] = 1;
                rec.emit(
                    Emission::mutate(format!("Included {}, sum {}", v, next), self.snapshot())
                        .highlight([i, self.values.len() + i])
                        .annotate("sum", next),
                )?;
                if self.search(rec, i + 1, next)? {
                    return Ok(true);
                }
                self.chosen[i] = 0;
                rec.emit(
                    Emission::decide(format!("Backtracking: excluded {}", v), self.snapshot())
                        .highlight([i])
                        .annotate("sum", sum),
                )?;
            }
            None => {
                rec.emit(
                    Emission::decide(format!("{} would overshoot, skipping", v), self.snapshot())
                        .highlight([i]),
                )?;
            }
        }

        self.search(rec, i + 1, sum)
    }
}

/// Finds a subset of non-negative values summing to `target`, trying to
/// include each element before excluding it. Row 0 of the grid holds the
/// values, row 1 marks chosen elements with 1.
pub fn subset_sum(rec: &mut Recorder, values: &[i64], target: i64) -> Result<Emission, TraceError> {
    let mut suffix = vec![0i64; values.len() + 1];
    for i in (0..values.len()).rev() {
        suffix[i] = suffix[i + 1].saturating_add(values[i]);
    }
    let mut search = SubsetSearch {
        values,
        target,
        suffix,
        chosen: vec![0; values.len()],
    };

    rec.emit(
        Emission::start(
            format!("Looking for a subset of {:?} summing to {}", values, target),
            search.snapshot(),
        )
        .annotate("target", target),
    )?;

    if target >= 0 && search.search(rec, 0, 0)? {
        let indices = search.chosen_indices();
        let subset: Vec<i64> = indices.iter().map(|&i| values[i]).collect();
        return Ok(Emission::outcome(
            format!("Subset {:?} sums to {}", subset, target),
            search.snapshot(),
        )
        .highlight(indices.iter().copied())
        .annotate("found", true)
        .annotate("subset", subset)
        .annotate("indices", indices));
    }

    Ok(Emission::outcome(
        format!("No subset sums to {}", target),
        search.snapshot(),
    )
    .annotate("found", false))
}
