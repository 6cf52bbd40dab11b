//! Fibonacci retracement math.
//!
//! Pure functions over two prices and a direction; no configuration, no I/O.

use crate::domain::{TargetSide, TrendDirection};
use crate::models::fib_level::{FIB_LABELS, FIB_RATIOS, FibLevel, NearestLevel};
use crate::utils::round_price;

/// Compute the seven retracement levels, ordered by ascending ratio.
///
/// Uptrend retraces from the high down (`0%` = high, `100%` = low); downtrend
/// retraces from the low up. A zero or negative range does not fail: every level
/// collapses onto `swing_high`.
pub fn compute_levels(swing_high: f64, swing_low: f64, direction: TrendDirection) -> Vec<FibLevel> {
    let diff = swing_high - swing_low;

    FIB_RATIOS
        .iter()
        .zip(FIB_LABELS.iter())
        .map(|(&ratio, &label)| {
            let price = if diff <= 0.0 {
                swing_high
            } else {
                let raw = match direction {
                    TrendDirection::Uptrend => swing_high - diff * ratio,
                    TrendDirection::Downtrend => swing_low + diff * ratio,
                };
                round_price(raw, swing_high)
            };
            FibLevel::new(ratio, label, price)
        })
        .collect()
}

/// Level with the smallest absolute distance to `current_price`.
/// Ties keep the earliest level in the given order. `None` for an empty slice.
pub fn find_nearest_level(current_price: f64, levels: &[FibLevel]) -> Option<NearestLevel> {
    let mut nearest: Option<(&FibLevel, f64)> = None;

    for level in levels {
        let distance = (current_price - level.price).abs();
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((level, distance)),
        }
    }

    nearest.map(|(level, distance)| NearestLevel {
        level: level.clone(),
        distance,
        is_above: current_price >= level.price,
    })
}

/// Closest level strictly below (`Support`) or strictly above (`Resistance`) the price.
/// `None` when the price is beyond every level on that side.
pub fn find_next_target(current_price: f64, levels: &[FibLevel], side: TargetSide) -> Option<FibLevel> {
    let mut sorted: Vec<&FibLevel> = levels.iter().collect();
    // Descending by price
    sorted.sort_by(|a, b| b.price.total_cmp(&a.price));

    let found = match side {
        TargetSide::Support => sorted.iter().find(|l| l.price < current_price),
        TargetSide::Resistance => sorted.iter().rev().find(|l| l.price > current_price),
    };
    found.map(|l| (*l).clone())
}

/// Uptrend when the price is at or above the middle of the swing range.
pub fn determine_trend(swing_high: f64, swing_low: f64, current_price: f64) -> TrendDirection {
    let mid = (swing_high + swing_low) / 2.0;
    if current_price >= mid {
        TrendDirection::Uptrend
    } else {
        TrendDirection::Downtrend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc_levels() -> Vec<FibLevel> {
        compute_levels(69000.0, 15000.0, TrendDirection::Uptrend)
    }

    #[test]
    fn uptrend_levels_run_from_high_to_low() {
        let levels = btc_levels();
        assert_eq!(levels.len(), 7);

        let expected = [69000.0, 56256.0, 48372.0, 42000.0, 35628.0, 26556.0, 15000.0];
        for (level, want) in levels.iter().zip(expected) {
            assert!((level.price - want).abs() < 1e-6, "{} != {}", level.price, want);
        }
        assert_eq!(levels[0].price, 69000.0);
        assert_eq!(levels[3].price, 42000.0);
        assert_eq!(levels[6].price, 15000.0);
    }

    #[test]
    fn downtrend_swaps_endpoints() {
        let levels = compute_levels(69000.0, 15000.0, TrendDirection::Downtrend);
        assert_eq!(levels[0].price, 15000.0);
        assert_eq!(levels[3].price, 42000.0);
        assert_eq!(levels[6].price, 69000.0);
    }

    #[test]
    fn only_the_618_level_is_golden() {
        let levels = compute_levels(100.0, 0.0, TrendDirection::Uptrend);
        let golden: Vec<_> = levels.iter().filter(|l| l.is_golden_pocket).collect();
        assert_eq!(golden.len(), 1);
        assert_eq!(golden[0].ratio, 0.618);
        assert_eq!(golden[0].label, "61.8%");
    }

    #[test]
    fn flat_range_collapses_to_swing_high() {
        let levels = compute_levels(50000.0, 50000.0, TrendDirection::Uptrend);
        assert_eq!(levels.len(), 7);
        assert!(levels.iter().all(|l| l.price == 50000.0));

        // Inverted input degrades the same way
        let levels = compute_levels(10.0, 20.0, TrendDirection::Downtrend);
        assert!(levels.iter().all(|l| l.price == 10.0));
    }

    #[test]
    fn labels_follow_ratios() {
        let labels: Vec<_> = btc_levels().into_iter().map(|l| l.label).collect();
        assert_eq!(labels, ["0%", "23.6%", "38.2%", "50%", "61.8%", "78.6%", "100%"]);
    }

    #[test]
    fn precision_tracks_swing_high_magnitude() {
        let levels = compute_levels(1.15, 1.05, TrendDirection::Uptrend);
        assert!((levels[3].price - 1.1).abs() < 1e-4);
        // 4 decimals for references between 1 and 100
        assert_eq!(levels[1].price, 1.1264);

        let levels = compute_levels(0.00005, 0.00001, TrendDirection::Uptrend);
        assert!((levels[3].price - 0.00003).abs() < 1e-12);
    }

    #[test]
    fn nearest_level_exact_and_between() {
        let levels = btc_levels();

        let exact = find_nearest_level(42000.0, &levels).unwrap();
        assert_eq!(exact.level.ratio, 0.5);
        assert_eq!(exact.distance, 0.0);
        assert!(exact.is_above);

        let between = find_nearest_level(43000.0, &levels).unwrap();
        assert_eq!(between.level.price, 42000.0);
        assert!(between.is_above);
    }

    #[test]
    fn nearest_level_beyond_extremes() {
        let levels = btc_levels();
        let high = find_nearest_level(70000.0, &levels).unwrap();
        assert_eq!(high.level.ratio, 0.0);
        assert!(high.is_above);

        let low = find_nearest_level(10000.0, &levels).unwrap();
        assert_eq!(low.level.ratio, 1.0);
        assert!(!low.is_above);
    }

    #[test]
    fn nearest_level_tie_keeps_first() {
        let levels = vec![
            FibLevel::new(0.0, "0%", 10.0),
            FibLevel::new(0.236, "23.6%", 8.0),
            FibLevel::new(0.382, "38.2%", 6.0),
        ];
        let nearest = find_nearest_level(9.0, &levels).unwrap();
        assert_eq!(nearest.level.ratio, 0.0);
        assert!(!nearest.is_above);

        assert!(find_nearest_level(9.0, &[]).is_none());
    }

    #[test]
    fn next_targets_either_side() {
        let levels = btc_levels();

        let support = find_next_target(43000.0, &levels, TargetSide::Support).unwrap();
        assert_eq!(support.price, 42000.0);

        let resistance = find_next_target(43000.0, &levels, TargetSide::Resistance).unwrap();
        assert!((resistance.price - 48372.0).abs() < 1e-6);

        // Sitting exactly on a level: strictly below / above
        let support = find_next_target(42000.0, &levels, TargetSide::Support).unwrap();
        assert!((support.price - 35628.0).abs() < 1e-6);
    }

    #[test]
    fn next_target_none_beyond_extremes() {
        let levels = btc_levels();
        assert!(find_next_target(10000.0, &levels, TargetSide::Support).is_none());
        assert!(find_next_target(70000.0, &levels, TargetSide::Resistance).is_none());
        assert_eq!(
            find_next_target(70000.0, &levels, TargetSide::Support).unwrap().price,
            69000.0
        );
    }

    #[test]
    fn next_target_independent_of_level_order() {
        let levels = compute_levels(69000.0, 15000.0, TrendDirection::Downtrend);
        let resistance = find_next_target(43000.0, &levels, TargetSide::Resistance).unwrap();
        assert!((resistance.price - 48372.0).abs() < 1e-6);
    }

    #[test]
    fn trend_midpoint_is_uptrend() {
        assert_eq!(determine_trend(69000.0, 15000.0, 42000.0), TrendDirection::Uptrend);
        assert_eq!(determine_trend(69000.0, 15000.0, 50000.0), TrendDirection::Uptrend);
        assert_eq!(determine_trend(69000.0, 15000.0, 30000.0), TrendDirection::Downtrend);
    }
}
