//! Type coercion for trial balance tables.

use rust_decimal::Decimal;

use closeflow_shared::types::parse_amount;

use crate::io::Table;
use crate::schema::{TB_COLUMNS, columns};

fn amount_text(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Coerces trial balance columns into canonical form.
///
/// - Debit and Credit become plain decimals; blank or non-numeric cells
///   become `0`.
/// - Period keeps only its digits, truncated to six.
/// - CurrencyCode is trimmed and upper-cased.
/// - Missing canonical columns are added (`0` for amounts, blank otherwise).
///
/// Returns the number of amount cells that had to be replaced with zero.
pub fn coerce_tb_types(table: &mut Table) -> usize {
    let mut coerced = 0;

    for column in [columns::DEBIT, columns::CREDIT] {
        if let Some(idx) = table.column_index(column) {
            table.map_column(idx, |raw| match parse_amount(raw) {
                Some(value) => amount_text(value),
                None => {
                    coerced += 1;
                    "0".to_string()
                }
            });
        }
    }

    if let Some(idx) = table.column_index(columns::PERIOD) {
        table.map_column(idx, normalize_period);
    }

    if let Some(idx) = table.column_index(columns::CURRENCY_CODE) {
        table.map_column(idx, |raw| raw.trim().to_uppercase());
    }

    for column in TB_COLUMNS {
        let fill = if column == columns::DEBIT || column == columns::CREDIT {
            "0"
        } else {
            ""
        };
        table.ensure_column(column, fill);
    }

    coerced
}

/// Keeps the digits of a period value, at most six of them.
#[must_use]
pub fn normalize_period(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).take(6).collect()
}

/// Splits a signed `Amount` column into Debit and Credit.
///
/// Applies only when `Amount` exists and Debit or Credit is missing.
/// Positive values become debits, negative values become credits; a
/// non-numeric amount counts as zero. Returns the number of rows split.
pub fn split_amount(table: &mut Table) -> usize {
    let Some(amount_idx) = table.column_index(columns::AMOUNT) else {
        return 0;
    };
    if table.has_column(columns::DEBIT) && table.has_column(columns::CREDIT) {
        return 0;
    }

    let amounts: Vec<Decimal> = table
        .rows()
        .iter()
        .map(|row| {
            row.get(amount_idx)
                .and_then(|raw| parse_amount(raw))
                .unwrap_or_default()
        })
        .collect();

    let debit_idx = table.ensure_column(columns::DEBIT, "0");
    let credit_idx = table.ensure_column(columns::CREDIT, "0");

    let mut debits = amounts.iter();
    table.map_column(debit_idx, |_| {
        let value = debits.next().copied().unwrap_or_default();
        amount_text(value.max(Decimal::ZERO))
    });
    let mut credits = amounts.iter();
    table.map_column(credit_idx, |_| {
        let value = credits.next().copied().unwrap_or_default();
        amount_text((-value).max(Decimal::ZERO))
    });

    amounts.len()
}
