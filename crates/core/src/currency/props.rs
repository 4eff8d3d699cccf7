//! Property-based tests for currency translation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::conversion::{REPORTING_DECIMAL_PLACES, convert_amount, translate};

/// Signed amounts (-1,000,000.00 to 1,000,000.00).
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Translated amounts always carry exactly two decimal places.
    #[test]
    fn prop_translation_scale(amount in signed_amount(), rate in positive_rate()) {
        prop_assert_eq!(translate(amount, rate).scale(), REPORTING_DECIMAL_PLACES);
    }

    /// Rounding never moves the result by more than half a cent.
    #[test]
    fn prop_translation_within_half_cent(amount in signed_amount(), rate in positive_rate()) {
        let exact = amount * rate;
        let diff = (translate(amount, rate) - exact).abs();
        prop_assert!(diff <= Decimal::new(5, 3));
    }

    /// Translation is odd: negating the local amount negates the result.
    #[test]
    fn prop_translation_sign_symmetry(amount in signed_amount(), rate in positive_rate()) {
        prop_assert_eq!(translate(-amount, rate), -translate(amount, rate));
    }

    /// A unit rate leaves cent amounts unchanged.
    #[test]
    fn prop_unit_rate_is_identity(amount in signed_amount()) {
        prop_assert_eq!(convert_amount(amount, Decimal::ONE, REPORTING_DECIMAL_PLACES), amount);
    }
}
