//! Property-based tests for period and filename normalization.

use proptest::prelude::*;

use super::coerce::normalize_period;
use super::filename::{infer_period_from_filename, is_tb_file_for_period};

fn period() -> impl Strategy<Value = String> {
    (2000u32..2100, 1u32..=12).prop_map(|(year, month)| format!("{year}{month:02}"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Output is at most six ASCII digits and normalizing again changes nothing.
    #[test]
    fn prop_normalized_period_is_stable(raw in ".{0,20}") {
        let normalized = normalize_period(&raw);
        prop_assert!(normalized.len() <= 6);
        prop_assert!(normalized.chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(normalize_period(&normalized), normalized);
    }

    /// Separators and suffixes around a YYYYMM value are dropped.
    #[test]
    fn prop_separated_period_normalizes(period in period(), sep in "[-/. ]") {
        let raw = format!("{}{sep}{}", &period[..4], &period[4..]);
        prop_assert_eq!(normalize_period(&raw), period.clone());
        prop_assert_eq!(normalize_period(&format!("{period}.0")), period);
    }

    /// Files named by convention match their own period and carry it.
    #[test]
    fn prop_conventional_names_match(period in period(), entity in "[A-Z]{2,4}") {
        let name = format!("TB_{entity}_{period}.xlsx");
        prop_assert!(is_tb_file_for_period(&name, &period));
        prop_assert_eq!(infer_period_from_filename(&name), Some(period));
    }
}
