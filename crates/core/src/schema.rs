//! Canonical column names and schemas.
//!
//! Every step writes these exact headers, whatever the source files called
//! their columns.

/// Canonical column names.
pub mod columns {
    /// Legal entity code.
    pub const ENTITY_CODE: &str = "EntityCode";
    /// General ledger account code.
    pub const ACCOUNT_CODE: &str = "AccountCode";
    /// Account description.
    pub const ACCOUNT_NAME: &str = "AccountName";
    /// Debit balance.
    pub const DEBIT: &str = "Debit";
    /// Credit balance.
    pub const CREDIT: &str = "Credit";
    /// Reporting period (`YYYYMM`).
    pub const PERIOD: &str = "Period";
    /// ISO currency code.
    pub const CURRENCY_CODE: &str = "CurrencyCode";
    /// Exchange rate into the reporting currency.
    pub const FX_RATE: &str = "FXRate";
    /// Rate provenance.
    pub const SOURCE: &str = "Source";
    /// Debit minus credit in local currency.
    pub const LOCAL_AMOUNT: &str = "LocalAmount";
    /// Translated amount.
    pub const REPORTING_CURRENCY_AMOUNT: &str = "ReportingCurrencyAmount";
    /// Signed single-column amount, split into Debit/Credit on ingest.
    pub const AMOUNT: &str = "Amount";
}

use columns::{
    ACCOUNT_CODE, ACCOUNT_NAME, CREDIT, CURRENCY_CODE, DEBIT, ENTITY_CODE, FX_RATE, LOCAL_AMOUNT,
    PERIOD, REPORTING_CURRENCY_AMOUNT, SOURCE,
};

/// Trial balance header, in output order.
pub const TB_COLUMNS: [&str; 7] = [
    ENTITY_CODE,
    ACCOUNT_CODE,
    ACCOUNT_NAME,
    DEBIT,
    CREDIT,
    PERIOD,
    CURRENCY_CODE,
];

/// FX rate file header.
pub const FX_RATE_COLUMNS: [&str; 4] = [CURRENCY_CODE, FX_RATE, PERIOD, SOURCE];

/// FX adjustment extract header.
pub const FX_ADJUSTMENT_COLUMNS: [&str; 6] = [
    ENTITY_CODE,
    ACCOUNT_CODE,
    LOCAL_AMOUNT,
    FX_RATE,
    REPORTING_CURRENCY_AMOUNT,
    PERIOD,
];

/// Columns the translator appends to the master trial balance.
pub const TRANSLATION_COLUMNS: [&str; 3] = [FX_RATE, LOCAL_AMOUNT, REPORTING_CURRENCY_AMOUNT];

/// Named column schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Trial balance rows.
    TrialBalance,
    /// FX rate rows.
    FxRates,
    /// FX adjustment extract rows.
    FxAdjustments,
}

impl Schema {
    /// Canonical columns, in output order.
    #[must_use]
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::TrialBalance => &TB_COLUMNS,
            Self::FxRates => &FX_RATE_COLUMNS,
            Self::FxAdjustments => &FX_ADJUSTMENT_COLUMNS,
        }
    }
}
