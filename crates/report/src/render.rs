use crate::summary::{BudgetState, Summary};

/// Plain-text report for the CLI.
pub fn format_text_report(summary: &Summary) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("=== Personal Finance Summary ===".to_string());
    if let Some(range) = summary.date_range {
        lines.push(format!("Period:  {range}"));
    }
    lines.push(format!("Income:  {}", summary.totals.income));
    lines.push(format!("Expense: {}", summary.totals.expense));
    lines.push(format!("Net:     {}", summary.totals.net));
    lines.push(String::new());

    lines.push("-- Spend by Category --".to_string());
    for row in &summary.category_spend {
        lines.push(format!("{:<15} {}", row.category, row.spent));
    }
    lines.push(String::new());

    lines.push("-- Monthly Totals --".to_string());
    for m in &summary.monthly {
        lines.push(format!(
            "{} | Inc {}  Exp {}  Net {}",
            m.month, m.income, m.expense, m.net
        ));
    }
    lines.push(String::new());

    if !summary.budget_status.is_empty() {
        lines.push("-- Budget Status (Latest Month) --".to_string());
        for b in &summary.budget_status {
            let state = match b.status {
                BudgetState::Under => "under",
                BudgetState::At => "at",
                BudgetState::Over => "OVER",
            };
            lines.push(format!(
                "{:<15} Limit {}  Actual {}  Remaining {}  ({:.2}% used, {state})",
                b.category, b.limit, b.actual, b.remaining, b.percent_used
            ));
        }
        lines.push(String::new());
    }

    lines.push("-- Top Merchants (Spend) --".to_string());
    for m in &summary.top_merchants {
        lines.push(format!("{:<40} {}", truncate(&m.merchant, 40), m.spent));
    }
    lines.push(String::new());

    lines.push("-- Recurring Payments (Detected) --".to_string());
    for r in &summary.recurring {
        lines.push(format!(
            "{:<40} {}  ({} months)",
            truncate(&r.merchant, 40),
            r.typical_amount,
            r.months_seen
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} transactions summarized, {} rows skipped",
        summary.transaction_count, summary.skipped_rows
    ));

    lines.join("\n")
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Pretty JSON export. Amounts serialize as decimal strings, so the
/// export is lossless.
pub fn to_json(summary: &Summary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

/// Flat `Section,Item,Metric,Value` CSV export covering every section
/// of the summary.
pub fn to_csv(summary: &Summary) -> Result<String, csv::Error> {
    fn money(m: finsight_core::Money) -> String {
        format!("{:.2}", m.amount())
    }
    fn row(
        writer: &mut csv::Writer<Vec<u8>>,
        section: &str,
        item: &str,
        metric: &str,
        value: &str,
    ) -> Result<(), csv::Error> {
        writer.write_record([section, item, metric, value])
    }

    let mut w = csv::Writer::from_writer(Vec::new());
    row(&mut w, "Section", "Item", "Metric", "Value")?;

    row(&mut w, "Totals", "", "Income", &money(summary.totals.income))?;
    row(&mut w, "Totals", "", "Expense", &money(summary.totals.expense))?;
    row(&mut w, "Totals", "", "Net", &money(summary.totals.net))?;

    for c in &summary.category_spend {
        row(&mut w, "Category Spend", &c.category, "Amount", &money(c.spent))?;
    }

    for m in &summary.monthly {
        row(&mut w, "Monthly Totals", &m.month, "Income", &money(m.income))?;
        row(&mut w, "Monthly Totals", &m.month, "Expense", &money(m.expense))?;
        row(&mut w, "Monthly Totals", &m.month, "Net", &money(m.net))?;
    }

    for m in &summary.top_merchants {
        row(&mut w, "Top Merchants", &m.merchant, "Spend", &money(m.spent))?;
    }

    for r in &summary.recurring {
        row(
            &mut w,
            "Recurring Payments",
            &r.merchant,
            "Typical Amount",
            &money(r.typical_amount),
        )?;
        row(
            &mut w,
            "Recurring Payments",
            &r.merchant,
            "Months Seen",
            &r.months_seen.to_string(),
        )?;
    }

    for b in &summary.budget_status {
        row(&mut w, "Budget Status", &b.category, "Limit", &money(b.limit))?;
        row(&mut w, "Budget Status", &b.category, "Actual", &money(b.actual))?;
        row(&mut w, "Budget Status", &b.category, "Remaining", &money(b.remaining))?;
    }

    if let Some(range) = summary.date_range {
        row(&mut w, "Metadata", "Range Start", "", &range.start.to_string())?;
        row(&mut w, "Metadata", "Range End", "", &range.end.to_string())?;
    }
    row(
        &mut w,
        "Metadata",
        "Transaction Count",
        "",
        &summary.transaction_count.to_string(),
    )?;
    row(
        &mut w,
        "Metadata",
        "Skipped Rows",
        "",
        &summary.skipped_rows.to_string(),
    )?;

    let bytes = w.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes).unwrap_or_default())
}
