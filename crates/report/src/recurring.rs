use rust_decimal::Decimal;
use std::collections::BTreeMap;

use finsight_core::{month_key, Money, Transaction};

use crate::merchant::merchant_key;
use crate::summary::RecurringPayment;

/// Thresholds for the recurring-payment heuristic. Explicit values,
/// so callers can tune and tests can pin them down.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringConfig {
    /// Distinct months a merchant must appear in.
    pub min_months: usize,
    /// Allowed relative deviation of each month's amount from the
    /// overall median.
    pub amount_tolerance: Decimal,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        RecurringConfig {
            min_months: 3,
            amount_tolerance: Decimal::new(15, 2), // 0.15
        }
    }
}

/// Best-effort detection of roughly-monthly charges.
///
/// Groups expenses by merchant key and calendar month. A merchant seen
/// in at least `min_months` distinct months, whose per-month median
/// amounts all stay within `amount_tolerance` (relative) of the
/// overall median, is flagged with that median as its typical amount.
/// This is a heuristic: quarterly charges, price changes beyond the
/// tolerance, and merchants with mixed one-off purchases will evade it.
pub fn detect_recurring(
    transactions: &[Transaction],
    config: &RecurringConfig,
) -> Vec<RecurringPayment> {
    // merchant key -> (representative description, month -> amounts)
    let mut groups: BTreeMap<String, (String, BTreeMap<String, Vec<Decimal>>)> = BTreeMap::new();
    for tx in transactions {
        if !tx.amount.is_expense() {
            continue;
        }
        let key = merchant_key(&tx.description);
        if key.is_empty() {
            continue;
        }
        let entry = groups
            .entry(key)
            .or_insert_with(|| (tx.description.clone(), BTreeMap::new()));
        if tx.description < entry.0 {
            entry.0 = tx.description.clone();
        }
        entry
            .1
            .entry(month_key(tx.date))
            .or_default()
            .push(tx.amount.abs().amount());
    }

    let mut recurring = Vec::new();
    for (_, (merchant, months)) in groups {
        let mut month_medians: Vec<Decimal> = months
            .values()
            .filter(|amounts| !amounts.is_empty())
            .map(|amounts| median(amounts.clone()))
            .collect();
        if month_medians.len() < config.min_months {
            continue;
        }
        let typical = median(month_medians.clone());
        if typical <= Decimal::ZERO {
            continue;
        }
        month_medians.retain(|m| ((*m - typical) / typical).abs() <= config.amount_tolerance);
        if month_medians.len() >= config.min_months {
            recurring.push(RecurringPayment {
                merchant,
                typical_amount: Money::from_decimal(typical),
                months_seen: months.len(),
            });
        }
    }

    // Most persistent first, then largest, then name for determinism.
    recurring.sort_by(|a, b| {
        b.months_seen
            .cmp(&a.months_seen)
            .then(b.typical_amount.cmp(&a.typical_amount))
            .then(a.merchant.cmp(&b.merchant))
    });
    recurring
}

fn median(mut values: Vec<Decimal>) -> Decimal {
    values.sort();
    let n = values.len();
    if n == 0 {
        return Decimal::ZERO;
    }
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / Decimal::TWO
    }
}
