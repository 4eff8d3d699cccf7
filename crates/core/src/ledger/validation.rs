//! Business rule validation for trial balances.

use rust_decimal::Decimal;
use thiserror::Error;

use closeflow_shared::types::parse_amount;

use super::trial_balance::{TrialBalanceRow, TrialBalanceTotals};
use crate::io::Table;
use crate::schema::columns;

/// Precision at which debits and credits must agree.
pub const BALANCE_DECIMAL_PLACES: u32 = 2;

/// Validation errors for trial balances.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// Debits and credits differ after rounding.
    #[error("Trial balance is unbalanced: debits ({debits}) != credits ({credits})")]
    Unbalanced {
        /// Total debit amount.
        debits: Decimal,
        /// Total credit amount.
        credits: Decimal,
    },

    /// Debit or Credit column is absent.
    #[error("Trial balance has no {0} column")]
    MissingColumn(String),

    /// A non-blank amount cell could not be parsed.
    #[error("Non-numeric {column} value '{value}' in row {row}")]
    NonNumeric {
        /// Column name.
        column: String,
        /// Raw cell text.
        value: String,
        /// Zero-based row index.
        row: usize,
    },
}

/// Returns the names in `required` that `table` lacks, in the given order.
#[must_use]
pub fn require_columns<S: AsRef<str>>(table: &Table, required: &[S]) -> Vec<String> {
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !table.has_column(name))
        .map(str::to_string)
        .collect()
}

fn ensure_numeric(table: &Table, column: &str) -> Result<(), BalanceError> {
    let values = table
        .column_values(column)
        .ok_or_else(|| BalanceError::MissingColumn(column.to_string()))?;

    for (row, raw) in values.enumerate() {
        if !raw.trim().is_empty() && parse_amount(raw).is_none() {
            return Err(BalanceError::NonNumeric {
                column: column.to_string(),
                value: raw.to_string(),
                row,
            });
        }
    }
    Ok(())
}

/// Checks that a raw table's Debit and Credit columns agree.
///
/// Blank cells count as zero. The sums come from the typed rows, so the
/// result matches [`check_balance`] on `TrialBalanceRow::from_table(table)`.
///
/// # Errors
///
/// Returns an error if a column is missing, a cell is non-numeric, or the
/// totals differ at [`BALANCE_DECIMAL_PLACES`].
pub fn validate_table_balance(table: &Table) -> Result<TrialBalanceTotals, BalanceError> {
    ensure_numeric(table, columns::DEBIT)?;
    ensure_numeric(table, columns::CREDIT)?;
    check_balance(&TrialBalanceRow::from_table(table))
}

/// Checks that typed rows balance.
///
/// # Errors
///
/// Returns [`BalanceError::Unbalanced`] carrying both totals.
pub fn check_balance(rows: &[TrialBalanceRow]) -> Result<TrialBalanceTotals, BalanceError> {
    ensure_balanced(TrialBalanceTotals::from_rows(rows))
}

fn ensure_balanced(totals: TrialBalanceTotals) -> Result<TrialBalanceTotals, BalanceError> {
    if totals.is_balanced(BALANCE_DECIMAL_PLACES) {
        Ok(totals)
    } else {
        Err(BalanceError::Unbalanced {
            debits: totals.total_debit,
            credits: totals.total_credit,
        })
    }
}
