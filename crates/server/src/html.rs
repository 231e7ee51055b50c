use finsight_report::{BudgetState, Summary};
use uuid::Uuid;

/// Server-rendered dashboard. One page, no client framework: the
/// filter form round-trips through query parameters and the tables
/// mirror the summary sections.
pub fn render_dashboard(summary: &Summary, session: Option<Uuid>) -> String {
    let mut page = String::with_capacity(8 * 1024);

    page.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Finsight</title>\n<style>\n\
         body { font-family: system-ui, sans-serif; margin: 2rem; color: #222; }\n\
         table { border-collapse: collapse; margin-bottom: 1.5rem; }\n\
         th, td { border: 1px solid #ccc; padding: 0.3rem 0.7rem; text-align: left; }\n\
         th { background: #f2f2f2; }\n\
         .over { color: #b00020; font-weight: bold; }\n\
         .num { text-align: right; }\n\
         </style>\n</head>\n<body>\n<h1>Finsight</h1>\n",
    );

    let session_field = session
        .map(|id| format!("<input type=\"hidden\" name=\"session\" value=\"{id}\">"))
        .unwrap_or_default();
    page.push_str(&format!(
        "<form method=\"get\" action=\"/\">{session_field}\
         <label>From <input name=\"from\" placeholder=\"YYYY-MM-DD\"></label>\n\
         <label>To <input name=\"to\" placeholder=\"YYYY-MM-DD\"></label>\n\
         <label>Window <input name=\"window\" size=\"3\" placeholder=\"months\"></label>\n\
         <label>Account <input name=\"account\"></label>\n\
         <label>Category <input name=\"category\"></label>\n\
         <button type=\"submit\">Filter</button></form>\n",
    ));

    page.push_str("<h2>Totals</h2>\n<table><tr><th>Income</th><th>Expense</th><th>Net</th></tr>");
    page.push_str(&format!(
        "<tr><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr></table>\n",
        summary.totals.income, summary.totals.expense, summary.totals.net
    ));
    if let Some(range) = summary.date_range {
        page.push_str(&format!("<p>Covering {range}.</p>\n"));
    }

    page.push_str("<h2>Spend by Category</h2>\n<table><tr><th>Category</th><th>Spent</th></tr>\n");
    for row in &summary.category_spend {
        page.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td></tr>\n",
            escape(&row.category),
            row.spent
        ));
    }
    page.push_str("</table>\n");

    page.push_str(
        "<h2>Monthly Totals</h2>\n<table><tr><th>Month</th><th>Income</th><th>Expense</th><th>Net</th></tr>\n",
    );
    for m in &summary.monthly {
        page.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            m.month, m.income, m.expense, m.net
        ));
    }
    page.push_str("</table>\n");

    if !summary.budget_status.is_empty() {
        page.push_str(
            "<h2>Budgets (Latest Month)</h2>\n<table>\
             <tr><th>Category</th><th>Limit</th><th>Actual</th><th>Remaining</th><th>Used</th></tr>\n",
        );
        for b in &summary.budget_status {
            let class = if b.status == BudgetState::Over { " class=\"over\"" } else { "" };
            page.push_str(&format!(
                "<tr{class}><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td>\
                 <td class=\"num\">{}</td><td class=\"num\">{:.2}%</td></tr>\n",
                escape(&b.category),
                b.limit,
                b.actual,
                b.remaining,
                b.percent_used
            ));
        }
        page.push_str("</table>\n");
    }

    page.push_str("<h2>Top Merchants</h2>\n<table><tr><th>Merchant</th><th>Spent</th></tr>\n");
    for m in &summary.top_merchants {
        page.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td></tr>\n",
            escape(&m.merchant),
            m.spent
        ));
    }
    page.push_str("</table>\n");

    page.push_str(
        "<h2>Recurring Payments</h2>\n<table><tr><th>Merchant</th><th>Typical</th><th>Months</th></tr>\n",
    );
    for r in &summary.recurring {
        page.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            escape(&r.merchant),
            r.typical_amount,
            r.months_seen
        ));
    }
    page.push_str("</table>\n");

    page.push_str(&format!(
        "<p>{} transactions summarized, {} rows skipped. \
         <a href=\"/export/summary.csv\">Export CSV</a> · \
         <a href=\"/export/summary.json\">Export JSON</a></p>\n",
        summary.transaction_count, summary.skipped_rows
    ));

    page.push_str("</body>\n</html>\n");
    page
}

/// Minimal HTML escaping for untrusted strings (descriptions and
/// category names come straight from uploads).
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
