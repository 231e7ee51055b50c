use chrono::NaiveDate;
use thiserror::Error;

use finsight_core::{window_start, DateRange, Transaction};

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid date {0:?}; expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid window {0:?}; expected a positive number of months")]
    InvalidWindow(String),
}

/// Constraints applied before aggregation. Every field is optional;
/// present fields combine with AND semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub range: Option<DateRange>,
    pub account: Option<String>,
    pub category: Option<String>,
    /// Most recent N months, anchored at the latest transaction date
    /// in the data being filtered.
    pub window_months: Option<u32>,
}

impl FilterSpec {
    /// Builds a spec from raw user-supplied strings (CLI flags or
    /// query parameters). Bad values become `FilterError`, never a
    /// panic.
    pub fn parse(
        from: Option<&str>,
        to: Option<&str>,
        account: Option<&str>,
        category: Option<&str>,
        window: Option<&str>,
    ) -> Result<Self, FilterError> {
        let parse_date = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| FilterError::InvalidDate(s.to_string()))
        };

        let from = from.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()?;
        let to = to.filter(|s| !s.trim().is_empty()).map(parse_date).transpose()?;
        let range = match (from, to) {
            (None, None) => None,
            (from, to) => Some(DateRange::new(
                from.unwrap_or(NaiveDate::MIN),
                to.unwrap_or(NaiveDate::MAX),
            )),
        };

        let window_months = window
            .filter(|s| !s.trim().is_empty())
            .map(|s| match s.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(FilterError::InvalidWindow(s.to_string())),
            })
            .transpose()?;

        let non_empty = |s: Option<&str>| {
            s.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(FilterSpec {
            range,
            account: non_empty(account),
            category: non_empty(category),
            window_months,
        })
    }

    /// Returns the transactions passing every constraint. An empty
    /// result is fine; aggregation over it yields zero totals.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        // The window anchors at the latest date in the input, not today,
        // so reports over historical exports stay stable.
        let window_range = self.window_months.and_then(|months| {
            transactions
                .iter()
                .map(|t| t.date)
                .max()
                .map(|latest| DateRange::new(window_start(latest, months), latest))
        });

        transactions
            .iter()
            .filter(|t| self.range.is_none_or(|r| r.contains(t.date)))
            .filter(|t| window_range.is_none_or(|r| r.contains(t.date)))
            .filter(|t| {
                self.account
                    .as_deref()
                    .is_none_or(|a| t.account.eq_ignore_ascii_case(a))
            })
            .filter(|t| {
                self.category
                    .as_deref()
                    .is_none_or(|c| t.category_label().eq_ignore_ascii_case(c))
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finsight_core::Money;

    fn tx(date: &str, account: &str, category: &str, cents: i64) -> Transaction {
        Transaction::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            "desc",
            Money::from_cents(cents),
            account,
        )
        .with_category(category)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("2024-01-10", "checking", "Groceries", -100),
            tx("2024-02-10", "checking", "Dining", -200),
            tx("2024-03-10", "visa", "Groceries", -300),
            tx("2024-04-10", "visa", "Dining", -400),
        ]
    }

    #[test]
    fn empty_spec_passes_everything() {
        assert_eq!(FilterSpec::default().apply(&sample()).len(), 4);
    }

    #[test]
    fn constraints_combine_with_and() {
        let spec = FilterSpec::parse(
            Some("2024-02-01"),
            Some("2024-12-31"),
            Some("visa"),
            Some("groceries"),
            None,
        )
        .unwrap();
        let out = spec.apply(&sample());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn inverted_range_yields_empty_not_error() {
        let spec = FilterSpec::parse(Some("2024-06-01"), Some("2024-01-01"), None, None, None).unwrap();
        assert!(spec.apply(&sample()).is_empty());
    }

    #[test]
    fn open_ended_ranges() {
        let only_from = FilterSpec::parse(Some("2024-03-01"), None, None, None, None).unwrap();
        assert_eq!(only_from.apply(&sample()).len(), 2);

        let only_to = FilterSpec::parse(None, Some("2024-01-31"), None, None, None).unwrap();
        assert_eq!(only_to.apply(&sample()).len(), 1);
    }

    #[test]
    fn window_anchors_at_latest_transaction() {
        let spec = FilterSpec::parse(None, None, None, None, Some("2")).unwrap();
        // Latest is 2024-04-10, so the window reaches back to 2024-02-10.
        let out = spec.apply(&sample());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn window_over_empty_input_is_empty() {
        let spec = FilterSpec::parse(None, None, None, None, Some("3")).unwrap();
        assert!(spec.apply(&[]).is_empty());
    }

    #[test]
    fn bad_date_is_a_filter_error() {
        let err = FilterSpec::parse(Some("01/15/2024"), None, None, None, None).unwrap_err();
        assert!(matches!(err, FilterError::InvalidDate(_)));
    }

    #[test]
    fn bad_window_is_a_filter_error() {
        for bad in ["zero?", "-1", "0"] {
            let err = FilterSpec::parse(None, None, None, None, Some(bad)).unwrap_err();
            assert!(matches!(err, FilterError::InvalidWindow(_)), "{bad}");
        }
    }

    #[test]
    fn blank_strings_mean_no_constraint() {
        let spec = FilterSpec::parse(Some(""), Some("  "), Some(""), None, Some("")).unwrap();
        assert_eq!(spec, FilterSpec::default());
    }
}
