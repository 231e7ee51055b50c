use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use finsight_core::{month_key, Budget, DateRange, Money, Transaction};

use crate::merchant::merchant_key;
use crate::recurring::{detect_recurring, RecurringConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Money,
    /// Expense magnitude (positive).
    pub expense: Money,
    pub net: Money,
}

impl Totals {
    fn zero() -> Self {
        Totals {
            income: Money::zero(),
            expense: Money::zero(),
            net: Money::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    /// Signed net for the category: income-heavy categories positive,
    /// spending categories negative.
    pub net: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub spent: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// `YYYY-MM` key; rows are sorted chronologically.
    pub month: String,
    pub income: Money,
    pub expense: Money,
    pub net: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantSpend {
    pub merchant: String,
    pub spent: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub merchant: String,
    pub typical_amount: Money,
    pub months_seen: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetState {
    Under,
    At,
    Over,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub category: String,
    pub limit: Money,
    /// Expense-only spend for the category in the latest month of the
    /// filtered data.
    pub actual: Money,
    /// Negative when over budget.
    pub remaining: Money,
    pub percent_used: Decimal,
    pub status: BudgetState,
}

/// Everything the renderers need, recomputed per request and never
/// persisted. Serializes losslessly: amounts round-trip through JSON
/// as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub totals: Totals,
    /// Signed net per category, sorted by category name.
    pub category_totals: Vec<CategoryTotal>,
    /// Expense-only view, largest spend first.
    pub category_spend: Vec<CategorySpend>,
    pub monthly: Vec<MonthlyTotal>,
    pub top_merchants: Vec<MerchantSpend>,
    pub recurring: Vec<RecurringPayment>,
    pub budget_status: Vec<BudgetStatus>,
    pub transaction_count: usize,
    pub skipped_rows: usize,
    /// First and last transaction dates in the summarized set.
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub top_merchants: usize,
    pub recurring: RecurringConfig,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            top_merchants: 10,
            recurring: RecurringConfig::default(),
        }
    }
}

/// Aggregates an already-filtered transaction set. An empty set
/// produces a summary of zeros, not an error.
pub fn build_summary(
    transactions: &[Transaction],
    budgets: &[Budget],
    skipped_rows: usize,
    options: &SummaryOptions,
) -> Summary {
    Summary {
        totals: totals(transactions),
        category_totals: category_totals(transactions),
        category_spend: category_spend(transactions),
        monthly: monthly_totals(transactions),
        top_merchants: top_merchants(transactions, options.top_merchants),
        recurring: detect_recurring(transactions, &options.recurring),
        budget_status: budget_status(transactions, budgets),
        transaction_count: transactions.len(),
        skipped_rows,
        date_range: covered_range(transactions),
    }
}

fn totals(transactions: &[Transaction]) -> Totals {
    let income: Money = transactions
        .iter()
        .filter(|t| t.amount.is_income())
        .map(|t| t.amount)
        .sum();
    let expense: Money = transactions
        .iter()
        .filter(|t| t.amount.is_expense())
        .map(|t| t.amount.abs())
        .sum();
    Totals {
        income,
        expense,
        net: income - expense,
    }
}

fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut by_category: BTreeMap<String, Money> = BTreeMap::new();
    for tx in transactions {
        *by_category
            .entry(tx.category_label().to_string())
            .or_insert_with(Money::zero) += tx.amount;
    }
    by_category
        .into_iter()
        .map(|(category, net)| CategoryTotal { category, net })
        .collect()
}

fn category_spend(transactions: &[Transaction]) -> Vec<CategorySpend> {
    let mut by_category: BTreeMap<String, Money> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.amount.is_expense()) {
        *by_category
            .entry(tx.category_label().to_string())
            .or_insert_with(Money::zero) += tx.amount.abs();
    }
    let mut spend: Vec<CategorySpend> = by_category
        .into_iter()
        .map(|(category, spent)| CategorySpend { category, spent })
        .collect();
    spend.sort_by(|a, b| b.spent.cmp(&a.spent).then(a.category.cmp(&b.category)));
    spend
}

fn monthly_totals(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<String, (Money, Money)> = BTreeMap::new();
    for tx in transactions {
        let entry = months
            .entry(month_key(tx.date))
            .or_insert((Money::zero(), Money::zero()));
        if tx.amount.is_income() {
            entry.0 += tx.amount;
        } else {
            entry.1 += tx.amount.abs();
        }
    }
    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTotal {
            month,
            income,
            expense,
            net: income - expense,
        })
        .collect()
}

fn top_merchants(transactions: &[Transaction], limit: usize) -> Vec<MerchantSpend> {
    // Representative description per key: lexicographically smallest,
    // so ranking output is independent of input order.
    let mut by_merchant: BTreeMap<String, (String, Money)> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.amount.is_expense()) {
        let key = merchant_key(&tx.description);
        if key.is_empty() {
            continue;
        }
        let entry = by_merchant
            .entry(key)
            .or_insert_with(|| (tx.description.clone(), Money::zero()));
        if tx.description < entry.0 {
            entry.0 = tx.description.clone();
        }
        entry.1 += tx.amount.abs();
    }
    let mut ranked: Vec<MerchantSpend> = by_merchant
        .into_values()
        .map(|(merchant, spent)| MerchantSpend { merchant, spent })
        .collect();
    ranked.sort_by(|a, b| b.spent.cmp(&a.spent).then(a.merchant.cmp(&b.merchant)));
    ranked.truncate(limit);
    ranked
}

fn budget_status(transactions: &[Transaction], budgets: &[Budget]) -> Vec<BudgetStatus> {
    if budgets.is_empty() {
        return Vec::new();
    }

    // Budgets are monthly limits, so actuals cover the latest month
    // present in the filtered data.
    let latest_month = match transactions.iter().map(|t| month_key(t.date)).max() {
        Some(m) => m,
        None => {
            return budgets
                .iter()
                .map(|b| status_row(b, Money::zero()))
                .collect()
        }
    };

    let mut spend: BTreeMap<&str, Money> = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|t| t.amount.is_expense() && month_key(t.date) == latest_month)
    {
        *spend.entry(tx.category_label()).or_insert_with(Money::zero) += tx.amount.abs();
    }

    budgets
        .iter()
        .map(|b| {
            let actual = spend
                .get(b.category.as_str())
                .copied()
                .unwrap_or_else(Money::zero);
            status_row(b, actual)
        })
        .collect()
}

fn status_row(budget: &Budget, actual: Money) -> BudgetStatus {
    let limit = Money::from_decimal(budget.monthly_limit);
    let status = match actual.cmp(&limit) {
        std::cmp::Ordering::Less => BudgetState::Under,
        std::cmp::Ordering::Equal => BudgetState::At,
        std::cmp::Ordering::Greater => BudgetState::Over,
    };
    let percent_used = if budget.monthly_limit > Decimal::ZERO {
        (actual.amount() / budget.monthly_limit * Decimal::ONE_HUNDRED).round_dp(2)
    } else if actual.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::ONE_HUNDRED
    };
    BudgetStatus {
        category: budget.category.clone(),
        limit,
        actual,
        remaining: limit - actual,
        percent_used,
        status,
    }
}

fn covered_range(transactions: &[Transaction]) -> Option<DateRange> {
    let start = transactions.iter().map(|t| t.date).min()?;
    let end = transactions.iter().map(|t| t.date).max()?;
    Some(DateRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(date: &str, desc: &str, cents: i64, category: &str) -> Transaction {
        Transaction::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            desc,
            Money::from_cents(cents),
            "checking",
        )
        .with_category(category)
    }

    fn budget(category: &str, limit: i64) -> Budget {
        Budget {
            category: category.to_string(),
            monthly_limit: Decimal::from(limit),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("2024-01-05", "PAYROLL", 300000, "Income"),
            tx("2024-01-08", "WHOLE FOODS", -12050, "Groceries"),
            tx("2024-01-15", "STARBUCKS #12", -550, "Dining"),
            tx("2024-02-03", "WHOLE FOODS", -9000, "Groceries"),
            tx("2024-02-14", "STARBUCKS #98", -700, "Dining"),
        ]
    }

    #[test]
    fn totals_income_expense_net() {
        let s = build_summary(&sample(), &[], 0, &SummaryOptions::default());
        assert_eq!(s.totals.income, Money::from_cents(300000));
        assert_eq!(s.totals.expense, Money::from_cents(22300));
        assert_eq!(s.totals.net, Money::from_cents(277700));
    }

    #[test]
    fn category_nets_sum_to_overall_net() {
        let s = build_summary(&sample(), &[], 0, &SummaryOptions::default());
        let category_sum: Money = s.category_totals.iter().map(|c| c.net).sum();
        assert_eq!(category_sum, s.totals.net);
    }

    #[test]
    fn category_spend_is_expense_only_descending() {
        let s = build_summary(&sample(), &[], 0, &SummaryOptions::default());
        assert_eq!(s.category_spend.len(), 2); // Income carries no spend
        assert_eq!(s.category_spend[0].category, "Groceries");
        assert_eq!(s.category_spend[0].spent, Money::from_cents(21050));
        assert_eq!(s.category_spend[1].category, "Dining");
    }

    #[test]
    fn monthly_rows_are_chronological() {
        let s = build_summary(&sample(), &[], 0, &SummaryOptions::default());
        let months: Vec<_> = s.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02"]);
        assert_eq!(s.monthly[0].income, Money::from_cents(300000));
        assert_eq!(s.monthly[1].expense, Money::from_cents(9700));
        assert_eq!(s.monthly[1].net, Money::from_cents(-9700));
    }

    #[test]
    fn top_merchants_group_store_numbers_and_rank_by_spend() {
        let s = build_summary(&sample(), &[], 0, &SummaryOptions::default());
        assert_eq!(s.top_merchants[0].merchant, "WHOLE FOODS");
        assert_eq!(s.top_merchants[0].spent, Money::from_cents(21050));
        // Two Starbucks store numbers collapse into one merchant.
        assert_eq!(s.top_merchants[1].merchant, "STARBUCKS #12");
        assert_eq!(s.top_merchants[1].spent, Money::from_cents(1250));
    }

    #[test]
    fn top_merchants_ties_break_by_name() {
        let txs = vec![
            tx("2024-01-05", "BETA", -500, "Misc"),
            tx("2024-01-05", "ALPHA", -500, "Misc"),
        ];
        let s = build_summary(&txs, &[], 0, &SummaryOptions::default());
        assert_eq!(s.top_merchants[0].merchant, "ALPHA");
        assert_eq!(s.top_merchants[1].merchant, "BETA");
    }

    #[test]
    fn top_merchants_respects_limit() {
        let txs: Vec<_> = (0..15u8)
            .map(|i| {
                let name = format!("MERCHANT {}", (b'A' + i) as char);
                tx("2024-01-05", &name, -100 - i64::from(i), "Misc")
            })
            .collect();
        let s = build_summary(&txs, &[], 0, &SummaryOptions::default());
        assert_eq!(s.top_merchants.len(), 10);
    }

    #[test]
    fn empty_input_yields_zero_summary() {
        let s = build_summary(&[], &[], 0, &SummaryOptions::default());
        assert_eq!(s.totals, Totals::zero());
        assert!(s.category_totals.is_empty());
        assert!(s.monthly.is_empty());
        assert!(s.date_range.is_none());
        assert_eq!(s.transaction_count, 0);
    }

    #[test]
    fn budget_over_shows_overage() {
        let txs = vec![tx("2024-03-10", "KROGER", -45000, "Groceries")];
        let s = build_summary(&txs, &[budget("Groceries", 400)], 0, &SummaryOptions::default());
        let b = &s.budget_status[0];
        assert_eq!(b.status, BudgetState::Over);
        assert_eq!(b.actual, Money::from_cents(45000));
        assert_eq!(b.remaining, Money::from_cents(-5000));
        assert_eq!(b.percent_used, Decimal::new(11250, 2)); // 112.50%
    }

    #[test]
    fn budget_under_and_at() {
        let txs = vec![
            tx("2024-03-10", "KROGER", -20000, "Groceries"),
            tx("2024-03-12", "SHELL", -10000, "Transport"),
        ];
        let budgets = [budget("Groceries", 400), budget("Transport", 100)];
        let s = build_summary(&txs, &budgets, 0, &SummaryOptions::default());
        assert_eq!(s.budget_status[0].status, BudgetState::Under);
        assert_eq!(s.budget_status[1].status, BudgetState::At);
    }

    #[test]
    fn budget_actual_covers_latest_month_only() {
        let txs = vec![
            tx("2024-02-10", "KROGER", -30000, "Groceries"),
            tx("2024-03-10", "KROGER", -10000, "Groceries"),
        ];
        let s = build_summary(&txs, &[budget("Groceries", 400)], 0, &SummaryOptions::default());
        assert_eq!(s.budget_status[0].actual, Money::from_cents(10000));
    }

    #[test]
    fn zero_limit_percent_guard() {
        let txs = vec![tx("2024-03-10", "KROGER", -100, "Groceries")];
        let s = build_summary(&txs, &[budget("Groceries", 0)], 0, &SummaryOptions::default());
        assert_eq!(s.budget_status[0].percent_used, Decimal::ONE_HUNDRED);

        let s = build_summary(&[], &[budget("Groceries", 0)], 0, &SummaryOptions::default());
        assert_eq!(s.budget_status[0].percent_used, Decimal::ZERO);
    }

    #[test]
    fn covered_range_spans_data() {
        let s = build_summary(&sample(), &[], 2, &SummaryOptions::default());
        let range = s.date_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());
        assert_eq!(s.skipped_rows, 2);
    }

    #[test]
    fn json_round_trip_preserves_totals_exactly() {
        let s = build_summary(&sample(), &[budget("Groceries", 400)], 1, &SummaryOptions::default());
        let json = serde_json::to_string(&s).unwrap();
        let back: Summary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
