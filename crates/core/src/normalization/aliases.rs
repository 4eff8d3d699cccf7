//! Column alias table.
//!
//! Known alternate spellings for each canonical column, tried in order.

/// Canonical column name paired with its recognised aliases.
pub type AliasEntry = (&'static str, &'static [&'static str]);

/// Aliases used for every schema.
pub const COLUMN_ALIASES: &[AliasEntry] = &[
    (
        "EntityCode",
        &["Entity", "Company", "CompanyCode", "CoCode", "LegalEntity", "LE"],
    ),
    (
        "AccountCode",
        &["GL", "GLCode", "Account", "Acct", "GL Account", "Account Number"],
    ),
    ("AccountName", &["AccountDesc", "Account Description", "GL Name"]),
    ("Debit", &["Dr", "Debits", "Debit Amount"]),
    ("Credit", &["Cr", "Credits", "Credit Amount"]),
    ("Period", &["FiscalPeriod", "PeriodId", "YYYYMM", "PostingPeriod"]),
    ("CurrencyCode", &["Currency", "Curr", "ISO Currency", "LCY"]),
    ("FXRate", &["Rate", "FX", "ExchangeRate"]),
    (
        "ReportingCurrencyAmount",
        &[
            "RptAmt",
            "Reporting Amount",
            "TranslatedAmount",
            "USD Amount",
            "Group Currency Amount",
        ],
    ),
    (
        "LocalAmount",
        &["LC Amount", "Local Amt", "Functional Amount", "Amt LCY", "Amount"],
    ),
];

/// Aliases registered for `column`, or an empty slice.
#[must_use]
pub fn aliases_for<'a>(aliases: &'a [AliasEntry], column: &str) -> &'a [&'static str] {
    aliases
        .iter()
        .find(|(name, _)| *name == column)
        .map_or(&[], |(_, list)| *list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_for_known_column() {
        assert_eq!(aliases_for(COLUMN_ALIASES, "Debit"), ["Dr", "Debits", "Debit Amount"]);
        assert!(aliases_for(COLUMN_ALIASES, "LocalAmount").contains(&"Amount"));
    }

    #[test]
    fn test_aliases_for_unknown_column() {
        assert!(aliases_for(COLUMN_ALIASES, "Source").is_empty());
    }
}
