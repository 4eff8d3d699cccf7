//! Decimal amount helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount and rate read from a file goes through `parse_amount`
//! and is rounded with Banker's Rounding (round half to even).

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Parses a cell value into a decimal amount.
///
/// Accepts plain decimals (`"100"`, `"-12.50"`) and scientific notation
/// (`"1e3"`). Blank or non-numeric input yields `None`.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Rounds a value using Banker's Rounding (MidpointNearestEven).
#[must_use]
pub fn round_amount(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

/// Rounds and pads a value so it always carries `decimal_places` digits.
#[must_use]
pub fn to_fixed(value: Decimal, decimal_places: u32) -> Decimal {
    let mut fixed = round_amount(value, decimal_places);
    fixed.rescale(decimal_places);
    fixed
}

/// Formats a value as `$1,234.50`.
///
/// Negative values keep the sign after the currency symbol (`$-12.00`).
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    let fixed = to_fixed(value, 2);
    let text = fixed.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if fixed.is_sign_negative() && !fixed.is_zero() {
        "-"
    } else {
        ""
    };
    format!("${sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("100", Some(dec!(100)))]
    #[case(" 12.50 ", Some(dec!(12.50)))]
    #[case("-80", Some(dec!(-80)))]
    #[case("1e3", Some(dec!(1000)))]
    #[case("", None)]
    #[case("   ", None)]
    #[case("n/a", None)]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Option<Decimal>) {
        assert_eq!(parse_amount(raw), expected);
    }

    #[test]
    fn test_round_amount_bankers() {
        assert_eq!(round_amount(dec!(2.345), 2), dec!(2.34));
        assert_eq!(round_amount(dec!(2.355), 2), dec!(2.36));
        assert_eq!(round_amount(dec!(-102.4), 2), dec!(-102.4));
    }

    #[test]
    fn test_to_fixed_pads_scale() {
        assert_eq!(to_fixed(dec!(100), 2).to_string(), "100.00");
        assert_eq!(to_fixed(dec!(-102.4), 2).to_string(), "-102.40");
        assert_eq!(to_fixed(dec!(1.005), 2).to_string(), "1.00");
    }

    #[rstest]
    #[case(dec!(0), "$0.00")]
    #[case(dec!(150), "$150.00")]
    #[case(dec!(1234.5), "$1,234.50")]
    #[case(dec!(1234567.891), "$1,234,567.89")]
    #[case(dec!(-12), "$-12.00")]
    fn test_format_currency(#[case] value: Decimal, #[case] expected: &str) {
        assert_eq!(format_currency(value), expected);
    }
}
