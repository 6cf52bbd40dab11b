/// How many decimals a price anchored at `reference` is rounded to.
/// Uses the reference magnitude (not each price's own) so a whole level set shares one rule.
pub fn decimals_for_reference(reference: f64) -> i32 {
    if reference >= 100.0 {
        2
    } else if reference >= 1.0 {
        4
    } else {
        // Sub-$1 assets
        8
    }
}

pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round `price` with the precision implied by `reference`
pub fn round_price(price: f64, reference: f64) -> f64 {
    round_to_decimals(price, decimals_for_reference(reference))
}

/// Relative error of `observed` against `expected`, measured against `observed`.
/// Returns `f64::INFINITY` when `observed` is zero so callers never accept it.
pub fn relative_error(expected: f64, observed: f64) -> f64 {
    if observed == 0.0 {
        return f64::INFINITY;
    }
    (expected - observed).abs() / observed.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precision_follows_reference_magnitude() {
        assert_eq!(decimals_for_reference(69000.0), 2);
        assert_eq!(decimals_for_reference(100.0), 2);
        assert_eq!(decimals_for_reference(99.99), 4);
        assert_eq!(decimals_for_reference(1.0), 4);
        assert_eq!(decimals_for_reference(0.5), 8);
    }

    #[test]
    fn rounding_uses_reference_not_value() {
        // A small level inside a large-reference set still gets 2 decimals
        assert_eq!(round_price(0.123456, 150.0), 0.12);
        assert_eq!(round_price(1.123456789, 1.5), 1.1235);
        assert_eq!(round_price(0.000123456789, 0.5), 0.00012346);
    }

    #[test]
    fn relative_error_guards_zero() {
        assert!((relative_error(105.0, 100.0) - 0.05).abs() < 1e-12);
        assert!(relative_error(1.0, 0.0).is_infinite());
    }
}
