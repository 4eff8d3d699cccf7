//! Typed trial balance rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use closeflow_shared::types::{parse_amount, round_amount};

use crate::io::{Record, Table};
use crate::schema::{TB_COLUMNS, columns};

/// One account line of a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrialBalanceRow {
    /// Legal entity code.
    pub entity_code: String,
    /// Account code.
    pub account_code: String,
    /// Account description.
    pub account_name: String,
    /// Debit balance.
    pub debit: Decimal,
    /// Credit balance.
    pub credit: Decimal,
    /// Period (`YYYYMM`).
    pub period: String,
    /// Local currency code.
    pub currency_code: String,
}

impl TrialBalanceRow {
    /// Builds a row from a record, treating blank or non-numeric amounts as zero.
    #[must_use]
    pub fn from_record(record: &Record<'_>) -> Self {
        let amount = |column| parse_amount(record.get_or_empty(column)).unwrap_or_default();
        let text = |column| record.get_or_empty(column).to_string();
        Self {
            entity_code: text(columns::ENTITY_CODE),
            account_code: text(columns::ACCOUNT_CODE),
            account_name: text(columns::ACCOUNT_NAME),
            debit: amount(columns::DEBIT),
            credit: amount(columns::CREDIT),
            period: text(columns::PERIOD),
            currency_code: text(columns::CURRENCY_CODE),
        }
    }

    /// Reads every row of a table.
    #[must_use]
    pub fn from_table(table: &Table) -> Vec<Self> {
        table.records().map(|r| Self::from_record(&r)).collect()
    }

    /// Debit minus credit.
    #[must_use]
    pub fn local_amount(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Cells in canonical column order.
    #[must_use]
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.entity_code.clone(),
            self.account_code.clone(),
            self.account_name.clone(),
            self.debit.normalize().to_string(),
            self.credit.normalize().to_string(),
            self.period.clone(),
            self.currency_code.clone(),
        ]
    }
}

/// Builds a table with the canonical trial balance header.
#[must_use]
pub fn rows_to_table(rows: &[TrialBalanceRow]) -> Table {
    let mut table = Table::new(TB_COLUMNS);
    for row in rows {
        table.push_row(row.to_cells());
    }
    table
}

/// Debit and credit totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrialBalanceTotals {
    /// Sum of debits.
    pub total_debit: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
}

impl TrialBalanceTotals {
    /// Sums a set of rows.
    #[must_use]
    pub fn from_rows(rows: &[TrialBalanceRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, row| Self {
            total_debit: acc.total_debit + row.debit,
            total_credit: acc.total_credit + row.credit,
        })
    }

    /// Debits minus credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }

    /// True when the difference rounds to zero at `decimal_places`.
    #[must_use]
    pub fn is_balanced(&self, decimal_places: u32) -> bool {
        round_amount(self.difference(), decimal_places).is_zero()
    }
}
