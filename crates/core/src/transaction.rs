use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// Category assigned when no rule matches a transaction.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One normalized ledger entry. Negative amounts are expenses,
/// positive amounts are income; the sign convention is fixed at
/// import time regardless of the source file's column layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    /// Account column from the source file, or the file stem when the
    /// export carries no account column.
    pub account: String,
    /// Filled by the categorizer when missing or blank in the source.
    pub category: Option<String>,
}

impl Transaction {
    pub fn new(date: NaiveDate, description: &str, amount: Money, account: &str) -> Self {
        Transaction {
            date,
            description: description.to_string(),
            amount,
            account: account.to_string(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Category label for display and grouping.
    pub fn category_label(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => UNCATEGORIZED,
        }
    }

    pub fn is_categorized(&self) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }
}

/// Stable ordering used after multi-file imports: date, then
/// description, then amount.
pub fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        (a.date, &a.description, a.amount).cmp(&(b.date, &b.description, b.amount))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn category_label_defaults_to_uncategorized() {
        let tx = Transaction::new(date(2024, 1, 5), "CHEWY", Money::from_cents(-4210), "checking");
        assert_eq!(tx.category_label(), UNCATEGORIZED);
        assert!(!tx.is_categorized());
    }

    #[test]
    fn blank_category_counts_as_missing() {
        let mut tx = Transaction::new(date(2024, 1, 5), "CHEWY", Money::from_cents(-4210), "checking");
        tx.category = Some("  ".to_string());
        assert_eq!(tx.category_label(), UNCATEGORIZED);
        assert!(!tx.is_categorized());
    }

    #[test]
    fn with_category_sets_label() {
        let tx = Transaction::new(date(2024, 1, 5), "CHEWY", Money::from_cents(-4210), "checking")
            .with_category("Pets");
        assert_eq!(tx.category_label(), "Pets");
        assert!(tx.is_categorized());
    }

    #[test]
    fn sort_is_date_then_description_then_amount() {
        let mut txs = vec![
            Transaction::new(date(2024, 2, 1), "B", Money::from_cents(-100), "a"),
            Transaction::new(date(2024, 1, 1), "B", Money::from_cents(-100), "a"),
            Transaction::new(date(2024, 1, 1), "A", Money::from_cents(-100), "a"),
            Transaction::new(date(2024, 1, 1), "A", Money::from_cents(-200), "a"),
        ];
        sort_transactions(&mut txs);
        assert_eq!(txs[0].amount, Money::from_cents(-200));
        assert_eq!(txs[1].description, "A");
        assert_eq!(txs[2].description, "B");
        assert_eq!(txs[3].date, date(2024, 2, 1));
    }

    #[test]
    fn serde_round_trip() {
        let tx = Transaction::new(date(2024, 1, 5), "Chewy Pet Store", Money::from_cents(-4210), "checking")
            .with_category("Pets");
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
    }
}
