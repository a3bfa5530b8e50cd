/// Percent change of a metric vs. the preceding equal-length period.
///
/// Defined as 0 when the previous value is 0 (no division by zero).
pub fn calculate_trend(current: f64, previous: f64) -> f64 {
    if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn growth_and_decline() {
        assert_eq!(calculate_trend(120.0, 100.0), 20.0);
        assert_eq!(calculate_trend(80.0, 100.0), -20.0);
        assert_eq!(calculate_trend(100.0, 100.0), 0.0);
    }

    proptest! {
        #[test]
        fn zero_previous_is_always_zero(x in -1.0e12f64..1.0e12) {
            prop_assert_eq!(calculate_trend(x, 0.0), 0.0);
        }
    }
}
