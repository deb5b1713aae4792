//! Greedy change-making.

use algoverse_core::{InputShape, StateSnapshot, TraceError};

use super::dynamic::{COIN_CHANGE_MAX_AMOUNT, COIN_CHANGE_MAX_COINS};
use crate::catalog::{AlgorithmDescriptor, Catalog, Category, Generator};
use crate::recorder::{Emission, Recorder};

pub(crate) fn register(catalog: &mut Catalog) {
    catalog.register(AlgorithmDescriptor::new(
        "coin-change-greedy",
        "Coin Change (greedy)",
        Category::Greedy,
        InputShape::Coins {
            max_amount: COIN_CHANGE_MAX_AMOUNT,
            max_coins: COIN_CHANGE_MAX_COINS,
        },
        Generator::Search(coin_change_greedy),
    ));
}

/// Repeatedly takes the largest coin that still fits. The snapshot is the
/// list of coins taken so far. Not optimal for every coin system; the
/// outcome reports whether the amount was made exactly.
pub fn coin_change_greedy(
    rec: &mut Recorder,
    coins: &[i64],
    amount: i64,
) -> Result<Emission, TraceError> {
    let mut denominations = coins.to_vec();
    denominations.sort_unstable_by(|a, b| b.cmp(a));
    denominations.dedup();
    let mut taken: Vec<i64> = Vec::new();
    let mut remaining = amount;

    rec.emit(
        Emission::start(
            format!("Making {} greedily from {:?}", amount, denominations),
            StateSnapshot::sequence(&taken),
        )
        .annotate("amount", amount)
        .annotate("denominations", denominations.clone()),
    )?;

    for &coin in &denominations {
        if remaining == 0 {
            break;
        }
        rec.emit(
            Emission::compare(
                format!("Does coin {} fit into remaining {}?", coin, remaining),
                StateSnapshot::sequence(&taken),
            )
            .annotate("coin", coin)
            .annotate("remaining", remaining),
        )?;
        if coin > remaining {
            rec.emit(
                Emission::decide(format!("Coin {} is too large", coin), StateSnapshot::sequence(&taken))
                    .annotate("coin", coin),
            )?;
            continue;
        }
        let count = remaining / coin;
        remaining -= count * coin;
        let first = taken.len();
        taken.extend(std::iter::repeat(coin).take(count as usize));
        rec.emit(
            Emission::mutate(
                format!("Took {} x {}, remaining {}", count, coin, remaining),
                StateSnapshot::sequence(&taken),
            )
            .highlight(first..taken.len())
            .annotate("remaining", remaining),
        )?;
    }

    if remaining == 0 {
        Ok(Emission::outcome(
            format!("{} made with {} coin(s): {:?}", amount, taken.len(), taken),
            StateSnapshot::sequence(&taken),
        )
        .highlight(0..taken.len())
        .annotate("exact", true)
        .annotate("count", taken.len())
        .annotate("coins", taken.clone()))
    } else {
        Ok(Emission::outcome(
            format!("Greedy choice leaves {} unpaid", remaining),
            StateSnapshot::sequence(&taken),
        )
        .annotate("exact", false)
        .annotate("remaining", remaining)
        .annotate("coins", taken.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{instrument, RecorderConfig};
    use algoverse_core::{TraceRun, Value};

    fn run(coins: &[i64], amount: i64) -> TraceRun {
        instrument("greedy", &RecorderConfig::default(), |rec| {
            coin_change_greedy(rec, coins, amount)
        })
        .unwrap()
    }

    #[test]
    fn takes_largest_coins_first() {
        let trace = run(&[1, 5, 10, 25], 41);
        let last = trace.final_step().unwrap();
        assert_eq!(last.annotation("coins"), Some(&Value::Ints(vec![25, 10, 5, 1])));
        assert_eq!(last.annotation("exact"), Some(&Value::Bool(true)));
    }

    #[test]
    fn greedy_can_be_suboptimal_but_exact() {
        let trace = run(&[1, 3, 4], 6);
        let last = trace.final_step().unwrap();
        assert_eq!(last.annotation("coins"), Some(&Value::Ints(vec![4, 1, 1])));
    }

    #[test]
    fn reports_unpaid_remainder() {
        let trace = run(&[5, 2], 3);
        let last = trace.final_step().unwrap();
        assert_eq!(last.annotation("exact"), Some(&Value::Bool(false)));
        assert_eq!(last.annotation("remaining"), Some(&Value::Int(1)));
    }
}
