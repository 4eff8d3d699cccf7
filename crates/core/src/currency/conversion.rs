//! Currency conversion logic.
//!
//! CRITICAL: Rounding strategy for translation:
//! - Always round reporting amounts to two decimal places
//! - Use banker's rounding (round half to even)
//! - Keep the local amount next to the translated one

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

use closeflow_shared::types::to_fixed;

use super::rates::FxRateTable;
use crate::ledger::TrialBalanceRow;

/// Precision of reporting-currency amounts.
pub const REPORTING_DECIMAL_PLACES: u32 = 2;

/// Converts an amount using the given exchange rate.
///
/// Uses banker's rounding (round half to even) to minimize cumulative errors.
#[must_use]
pub fn convert_amount(amount: Decimal, rate: Decimal, decimal_places: u32) -> Decimal {
    let converted = amount * rate;
    converted.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

/// Translates a local amount into the reporting currency, always carrying
/// two decimal places (`-102.40`, not `-102.4`).
#[must_use]
pub fn translate(local_amount: Decimal, rate: Decimal) -> Decimal {
    to_fixed(
        convert_amount(local_amount, rate, REPORTING_DECIMAL_PLACES),
        REPORTING_DECIMAL_PLACES,
    )
}

/// Result of translating one trial balance row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    /// Rate applied.
    pub rate: Decimal,
    /// Debit minus credit.
    pub local_amount: Decimal,
    /// Local amount in the reporting currency.
    pub reporting_amount: Decimal,
}

impl Translation {
    /// Translates `row` using its currency's rate, or `None` if the
    /// currency has no rate.
    #[must_use]
    pub fn for_row(row: &TrialBalanceRow, rates: &FxRateTable) -> Option<Self> {
        let rate = rates.get(&row.currency_code)?;
        let local_amount = row.local_amount();
        Some(Self {
            rate,
            local_amount,
            reporting_amount: translate(local_amount, rate),
        })
    }
}
