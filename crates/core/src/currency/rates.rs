//! Exchange rate lookup.

use std::collections::BTreeMap;
use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::io::TableError;

/// Errors raised while loading a rate file.
#[derive(Debug, Error)]
pub enum RateError {
    /// The rate file could not be read.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Currency or rate column could not be resolved.
    #[error("{}: missing columns {columns:?}", .path.display())]
    MissingColumns {
        /// Rate file.
        path: PathBuf,
        /// Unresolved column names.
        columns: Vec<String>,
    },
}

impl RateError {
    /// True when the rate file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Table(e) if e.is_not_found())
    }
}

/// Currency code → rate into the reporting currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FxRateTable {
    rates: BTreeMap<String, Decimal>,
}

impl FxRateTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rate for `code`, replacing any earlier one.
    pub fn insert(&mut self, code: impl Into<String>, rate: Decimal) {
        self.rates.insert(code.into(), rate);
    }

    /// Rate for `code`.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    /// Number of currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// True when no rates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Distinct codes among `codes` that have no rate, sorted.
    #[must_use]
    pub fn missing<'a, I>(&self, codes: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        codes
            .into_iter()
            .filter(|code| !self.rates.contains_key(*code))
            .map(str::to_string)
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl FromIterator<(String, Decimal)> for FxRateTable {
    fn from_iter<T: IntoIterator<Item = (String, Decimal)>>(iter: T) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_is_sorted_and_distinct() {
        let rates: FxRateTable = [("USD".to_string(), dec!(1))].into_iter().collect();
        let missing = rates.missing(["JPY", "EUR", "USD", "JPY", ""]);
        assert_eq!(missing, vec!["", "EUR", "JPY"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut rates = FxRateTable::new();
        rates.insert("GBP", dec!(1.2));
        rates.insert("GBP", dec!(1.28));
        assert_eq!(rates.get("GBP"), Some(dec!(1.28)));
        assert_eq!(rates.len(), 1);
    }
}
