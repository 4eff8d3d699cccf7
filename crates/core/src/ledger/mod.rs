//! Trial balance rows and balance checks.
//!
//! This module implements the bookkeeping rules shared by the steps:
//! - Typed trial balance rows
//! - Column presence checks
//! - Debit/credit balance validation

pub mod trial_balance;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use trial_balance::{TrialBalanceRow, TrialBalanceTotals, rows_to_table};
pub use validation::{
    BALANCE_DECIMAL_PLACES, BalanceError, check_balance, require_columns, validate_table_balance,
};
