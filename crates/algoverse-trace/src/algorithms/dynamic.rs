//! Bottom-up dynamic programming over explicit tables.
//!
//! Grid highlights are row-major cell indices (`row * width + col`).

use algoverse_core::{Distance, InputShape, StateSnapshot, TraceError};

use crate::catalog::{AlgorithmDescriptor, Catalog, Category, Generator};
use crate::recorder::{Emission, Recorder};

/// Largest `n` whose Fibonacci number fits in an i64 with headroom.
pub const FIBONACCI_MAX_N: usize = 90;
/// Largest amount accepted by the coin-change solvers. The DP table row is
/// copied into every step.
pub const COIN_CHANGE_MAX_AMOUNT: i64 = 250;
pub const COIN_CHANGE_MAX_COINS: usize = 16;
/// Edit distance copies its whole grid into every step.
pub const EDIT_DISTANCE_MAX_LEN: usize = 32;

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register(AlgorithmDescriptor::new(
        "fibonacci",
        "Fibonacci (tabulation)",
        Category::DynamicProgramming,
        InputShape::Scalar {
            min: 0,
            max: FIBONACCI_MAX_N,
        },
        Generator::Scalar(fibonacci),
    ));
    catalog.register(AlgorithmDescriptor::new(
        "lis",
        "Longest Increasing Subsequence",
        Category::DynamicProgramming,
        InputShape::Sequence,
        Generator::Sequence(lis),
    ));
    catalog.register(AlgorithmDescriptor::new(
        "edit-distance",
        "Edit Distance",
        Category::DynamicProgramming,
        InputShape::Text {
            allow_empty_pattern: true,
            max_len: EDIT_DISTANCE_MAX_LEN,
        },
        Generator::Text(edit_distance),
    ));
    catalog.register(AlgorithmDescriptor::new(
        "coin-change",
        "Coin Change (minimum coins)",
        Category::DynamicProgramming,
        InputShape::Coins {
            max_amount: COIN_CHANGE_MAX_AMOUNT,
            max_coins: COIN_CHANGE_MAX_COINS,
        },
        Generator::Search(coin_change),
    ));
}

/// F(0..=n) in a single-row table.
pub fn fibonacci(rec: &mut Recorder, n: usize) -> Result<Emission, TraceError> {
    let mut dp = vec![0i64; n + 1];
    if n >= 1 {
        dp[1] = 1;
    }
    rec.emit(
        Emission::start(
            format!("Computing F({}) bottom-up, F(0) = 0, F(1) = 1", n),
            StateSnapshot::grid(&[dp.clone()]),
        )
        .highlight(0..n.min(1) + 1)
        .annotate("n", n),
    )?;

    for i in 2..=n {
        dp[i] = dp[i - 1] + dp[i - 2];
        rec.emit(
            Emission::mutate(
                format!("F({}) = F({}) + F({}) = {}", i, i - 1, i - 2, dp[i]),
                StateSnapshot::grid(&[dp.clone()]),
            )
            .highlight([i - 2, i - 1, i])
            .annotate("value", dp[i]),
        )?;
    }

    Ok(
        Emission::outcome(format!("F({}) = {}", n, dp[n]), StateSnapshot::grid(&[dp.clone()]))
            .highlight([n])
            .annotate("value", dp[n]),
    )
}

/// O(n^2) longest strictly increasing subsequence. Row 0 of the grid holds
/// the input, row 1 the best length ending at each index.
pub fn lis(rec: &mut Recorder, values: &[i64]) -> Result<Emission, TraceError> {
    let n = values.len();
    let mut dp = vec![1i64; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let table = |dp: &[i64]| StateSnapshot::grid(&[values.to_vec(), dp.to_vec()]);

    rec.emit(
        Emission::start(
            format!("Longest increasing subsequence of {} elements", n),
            table(&dp),
        )
        .annotate("n", n),
    )?;

    for i in 1..n {
        for j in 0..i {
            rec.emit(
                Emission::compare(
                    format!("Can {} extend the run ending at {}?", values[i], values[j]),
                    table(&dp),
                )
                .highlight([j, i]),
            )?;
            if values[j] < values[i] && dp[j] + 1 > dp[i] {
                dp[i] = dp[j] + 1;
                prev[i] = Some(j);
                rec.emit(
                    Emission::mutate(
                        format!("dp[{}] = dp[{}] + 1 = {}", i, j, dp[i]),
                        table(&dp),
                    )
                    .highlight([n + i])
                    .annotate("length", dp[i]),
                )?;
            }
        }
    }

    // First index holding the maximum.
    let best = (0..n).fold(None, |best: Option<usize>, i| match best {
        Some(b) if dp[b] >= dp[i] => Some(b),
        _ => Some(i),
    });
    let mut chain = Vec::new();
    let mut cursor = best;
    while let Some(i) = cursor {
        chain.push(i);
        cursor = prev[i];
    }
    chain.reverse();
    let subsequence: Vec<i64> = chain.iter().map(|&i| values[i]).collect();

    Ok(Emission::outcome(
        format!(
            "Longest increasing subsequence has length {}: {:?}",
            chain.len(),
            subsequence
        ),
        table(&dp),
    )
    .highlight(chain.iter().copied())
    .annotate("length", chain.len())
    .annotate("subsequence", subsequence))
}

/// Levenshtein distance transforming `source` into `target`. The grid has
/// `len(source) + 1` rows and `len(target) + 1` columns.
pub fn edit_distance(rec: &mut Recorder, source: &str, target: &str) -> Result<Emission, TraceError> {
    let a: Vec<char> = source.chars().collect();
    let b: Vec<char> = target.chars().collect();
    let (rows, cols) = (a.len() + 1, b.len() + 1);
    let mut dp = vec![vec![0i64; cols]; rows];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i as i64;
    }
    for (j, cell) in dp[0].iter_mut().enumerate() {
        *cell = j as i64;
    }

    rec.emit(
        Emission::start(
            format!("Edit distance from \"{}\" to \"{}\"", source, target),
            StateSnapshot::grid(&dp),
        )
        .annotate("rows", rows)
        .annotate("cols", cols),
    )?;

    for i in 1..rows {
        for j in 1..cols {
            let cell = i * cols + j;
            rec.emit(
                Emission::compare(
                    format!("Comparing '{}' with '{}'", a[i - 1], b[j - 1]),
                    StateSnapshot::grid(&dp),
                )
                .highlight([cell]),
            )?;
            if a[i - 1] == b[j - 1] {
                dp[i][j] = dp[i - 1][j - 1];
                rec.emit(
                    Emission::mutate(
                        format!("Characters match, dp[{}][{}] = {}", i, j, dp[i][j]),
                        StateSnapshot::grid(&dp),
                    )
                    .highlight([cell, (i - 1) * cols + j - 1]),
                )?;
            } else {
                let delete = dp[i - 1][j];
                let insert = dp[i][j - 1];
                let replace = dp[i - 1][j - 1];
                dp[i][j] = 1 + delete.min(insert).min(replace);
                let op = if replace <= delete && replace <= insert {
                    "replace"
                } else if delete <= insert {
                    "delete"
                } else {
                    "insert"
                };
                rec.emit(
                    Emission::mutate(
                        format!("dp[{}][{}] = 1 + min({}, {}, {}) = {} ({})", i, j, delete, insert, replace, dp[i][j], op),
                        StateSnapshot::grid(&dp),
                    )
                    .highlight([cell])
                    .annotate("operation", op),
                )?;
            }
        }
    }

    let distance = dp[rows - 1][cols - 1];
    Ok(Emission::outcome(
        format!("Edit distance from \"{}\" to \"{}\" is {}", source, target, distance),
        StateSnapshot::grid(&dp),
    )
    .highlight([rows * cols - 1])
    .annotate("distance", distance))
}

/// Minimum number of coins summing to `amount`, unbounded supply. The
/// snapshot is a single-row matrix of best counts per sub-amount.
pub fn coin_change(rec: &mut Recorder, coins: &[i64], amount: i64) -> Result<Emission, TraceError> {
    let amount = amount as usize;
    let mut dp = vec![vec![Distance::Infinite; amount + 1]];
    let mut last: Vec<Option<i64>> = vec![None; amount + 1];
    dp[0][0] = Distance::Finite(0);

    rec.emit(
        Emission::start(
            format!("Making {} from coins {:?}", amount, coins),
            StateSnapshot::matrix(&dp),
        )
        .highlight([0])
        .annotate("amount", amount),
    )?;

    for a in 1..=amount {
        for &coin in coins {
            let coin_size = coin as usize;
            if coin_size > a || !dp[0][a - coin_size].is_finite() {
                continue;
            }
            let candidate = dp[0][a - coin_size].plus(1);
            rec.emit(
                Emission::compare(
                    format!(
                        "Amount {}: coin {} gives {} vs best {}",
                        a, coin, candidate, dp[0][a]
                    ),
                    StateSnapshot::matrix(&dp),
                )
                .highlight([a - coin_size, a]),
            )?;
            if candidate < dp[0][a] {
                dp[0][a] = candidate;
                last[a] = Some(coin);
                rec.emit(
                    Emission::mutate(
                        format!("Best for amount {} is now {}", a, candidate),
                        StateSnapshot::matrix(&dp),
                    )
                    .highlight([a])
                    .annotate("coin", coin),
                )?;
            }
        }
    }

    match dp[0][amount].finite() {
        Some(count) => {
            let mut used = Vec::new();
            let mut rest = amount;
            while let Some(coin) = last[rest] {
                used.push(coin);
                rest -= coin as usize;
            }
            Ok(Emission::outcome(
                format!("{} can be made with {} coin(s): {:?}", amount, count, used),
                StateSnapshot::matrix(&dp),
            )
            .highlight([amount])
            .annotate("possible", true)
            .annotate("count", count)
            .annotate("coins", used))
        }
        None => Ok(Emission::outcome(
            format!("{} cannot be made from coins {:?}", amount, coins),
            StateSnapshot::matrix(&dp),
        )
        .highlight([amount])
        .annotate("possible", false)),
    }
}
