//! FX rate file loading.

use std::path::Path;

use closeflow_shared::types::parse_amount;
use tracing::{debug, warn};

use super::aliases::COLUMN_ALIASES;
use super::resolve::resolve_columns;
use crate::currency::{FxRateTable, RateError};
use crate::io::TableStore;
use crate::ledger::require_columns;
use crate::schema::{Schema, columns};

/// Loads a currency → rate lookup from a rate file.
///
/// Headers are resolved against the FX rate schema (so `Currency`/`Rate`
/// work), codes are trimmed and upper-cased, and rows whose rate does not
/// parse are skipped. A later row for the same currency replaces an earlier
/// one.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks a currency or rate
/// column.
pub fn load_fx_rates(path: impl AsRef<Path>, store: &TableStore) -> Result<FxRateTable, RateError> {
    let path = path.as_ref();
    let mut table = store.read(path)?;
    resolve_columns(&mut table, Schema::FxRates.columns(), COLUMN_ALIASES, false);

    let missing = require_columns(&table, &[columns::CURRENCY_CODE, columns::FX_RATE]);
    if !missing.is_empty() {
        return Err(RateError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    let mut rates = FxRateTable::new();
    for record in table.records() {
        let code = record.get_or_empty(columns::CURRENCY_CODE).trim().to_uppercase();
        if code.is_empty() {
            continue;
        }
        let raw = record.get_or_empty(columns::FX_RATE);
        match parse_amount(raw) {
            Some(rate) => {
                rates.insert(code, rate);
            }
            None => {
                warn!(currency = %code, rate = raw, "Skipping unparseable FX rate");
            }
        }
    }

    debug!(path = %path.display(), currencies = rates.len(), "Loaded FX rates");
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Table;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_with_aliased_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FX_Rates_202501.xlsx");
        let store = TableStore::delimited();
        let table = Table::from_str_rows(
            &["Currency", "Rate", "Period"],
            &[&["usd", "1.0", "202501"], &["GBP", "1.28", "202501"], &["EUR", "", "202501"]],
        );
        store.write(&table, &path).unwrap();

        let rates = load_fx_rates(&path, &store).unwrap();
        assert_eq!(rates.get("USD"), Some(dec!(1.0)));
        assert_eq!(rates.get("GBP"), Some(dec!(1.28)));
        assert_eq!(rates.get("EUR"), None);
        assert_eq!(rates.len(), 2);
    }

    #[test]
    fn test_missing_rate_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        let store = TableStore::delimited();
        store
            .write(&Table::from_str_rows(&["CurrencyCode"], &[&["USD"]]), &path)
            .unwrap();

        let err = load_fx_rates(&path, &store).unwrap_err();
        assert!(matches!(err, RateError::MissingColumns { columns: ref missing, .. } if missing == &["FXRate"]));
    }

    #[test]
    fn test_missing_file() {
        let err = load_fx_rates("/no/such/rates.xlsx", &TableStore::delimited()).unwrap_err();
        assert!(err.is_not_found());
    }
}
