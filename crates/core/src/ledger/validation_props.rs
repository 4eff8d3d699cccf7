//! Property-based tests for trial balance validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::trial_balance::TrialBalanceRow;
use super::validation::{check_balance, validate_table_balance};
use crate::io::Table;

/// Amounts from 0.01 to 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn row(debit: Decimal, credit: Decimal) -> TrialBalanceRow {
    TrialBalanceRow {
        entity_code: "US".to_string(),
        account_code: "1000".to_string(),
        account_name: "Cash".to_string(),
        debit,
        credit,
        period: "202501".to_string(),
        currency_code: "USD".to_string(),
    }
}

fn table_of(pairs: &[(Decimal, Decimal)]) -> Table {
    let mut table = Table::new(["Debit", "Credit"]);
    for (debit, credit) in pairs {
        table.push_row(vec![debit.to_string(), credit.to_string()]);
    }
    table
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Mirrored debit/credit lines always balance.
    #[test]
    fn prop_mirrored_lines_balance(amounts in prop::collection::vec(positive_amount(), 0..20)) {
        let mut pairs: Vec<(Decimal, Decimal)> = amounts.iter().map(|a| (*a, Decimal::ZERO)).collect();
        pairs.extend(amounts.iter().map(|a| (Decimal::ZERO, *a)));

        prop_assert!(validate_table_balance(&table_of(&pairs)).is_ok());
        let rows: Vec<_> = pairs.iter().map(|(d, c)| row(*d, *c)).collect();
        prop_assert!(check_balance(&rows).is_ok());
    }

    /// Shifting one side by at least a cent breaks the balance.
    #[test]
    fn prop_cent_offset_unbalances(
        amounts in prop::collection::vec(positive_amount(), 1..20),
        offset in positive_amount(),
    ) {
        let total: Decimal = amounts.iter().copied().sum();
        let mut pairs: Vec<(Decimal, Decimal)> = amounts.iter().map(|a| (*a, Decimal::ZERO)).collect();
        pairs.push((Decimal::ZERO, total + offset));

        prop_assert!(!validate_table_balance(&table_of(&pairs)).is_ok());
    }

    /// Table and typed checks agree.
    #[test]
    fn prop_table_and_rows_agree(
        pairs in prop::collection::vec((positive_amount(), positive_amount()), 0..10),
    ) {
        let rows: Vec<_> = pairs.iter().map(|(d, c)| row(*d, *c)).collect();
        prop_assert_eq!(validate_table_balance(&table_of(&pairs)).is_ok(), check_balance(&rows).is_ok());
    }
}
