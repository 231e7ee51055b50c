use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use finsight_core::transaction::sort_transactions;
use finsight_core::{Money, Transaction};

// Recognized header aliases, compared case-insensitively after trimming.
const DATE_ALIASES: &[&str] = &["date", "posted date", "posting date", "transaction date"];
const DESC_ALIASES: &[&str] = &["description", "details", "memo", "name"];
const AMOUNT_ALIASES: &[&str] = &["amount", "amt", "value"];
const DEBIT_ALIASES: &[&str] = &["debit", "withdrawal"];
const CREDIT_ALIASES: &[&str] = &["credit", "deposit"];
const ACCOUNT_ALIASES: &[&str] = &["account", "account name", "account number"];
const CATEGORY_ALIASES: &[&str] = &["category"];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%m-%d-%Y", "%d-%m-%Y",
];

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error reading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("{file}: missing required columns; need date + description and amount or debit/credit")]
    MissingColumns { file: String },
}

/// One row that failed to parse. The row is dropped, the rest of the
/// file still imports.
#[derive(Debug, Clone)]
pub struct SkippedRow {
    pub file: String,
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRow>,
    /// Rows dropped because an earlier file already produced an
    /// identical (date, description, amount, account) row.
    pub deduplicated: usize,
}

impl ImportOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
struct ColumnLayout {
    date: usize,
    description: usize,
    amount: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    account: Option<usize>,
    category: Option<usize>,
}

impl ColumnLayout {
    fn detect(headers: &csv::StringRecord, file: &str) -> Result<Self, ImportError> {
        let find = |aliases: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().trim_start_matches('\u{feff}').to_lowercase();
                aliases.contains(&h.as_str())
            })
        };

        let date = find(DATE_ALIASES);
        let description = find(DESC_ALIASES);
        let amount = find(AMOUNT_ALIASES);
        let debit = find(DEBIT_ALIASES);
        let credit = find(CREDIT_ALIASES);

        let (Some(date), Some(description)) = (date, description) else {
            return Err(ImportError::MissingColumns { file: file.to_string() });
        };
        if amount.is_none() && debit.is_none() && credit.is_none() {
            return Err(ImportError::MissingColumns { file: file.to_string() });
        }

        Ok(ColumnLayout {
            date,
            description,
            amount,
            debit,
            credit,
            account: find(ACCOUNT_ALIASES),
            category: find(CATEGORY_ALIASES),
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    Err(format!("unrecognized date: {s:?}"))
}

fn parse_amount(s: &str) -> Result<Money, String> {
    let s = s.trim();
    // Accounting exports wrap negatives in parentheses, e.g. (12.34).
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let cleaned = s.replace([',', '$', ' '], "");
    let mut dec =
        Decimal::from_str(&cleaned).map_err(|_| format!("invalid amount: {s:?}"))?;
    if negative {
        dec = -dec;
    }
    Ok(Money::from_decimal(dec))
}

/// Parses one CSV export into normalized transactions. `source` names
/// the file in errors and doubles as the fallback account label.
pub fn import_csv<R: Read>(data: R, source: &str) -> Result<ImportOutcome, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|source_err| ImportError::Csv {
            file: source.to_string(),
            source: source_err,
        })?
        .clone();
    let layout = ColumnLayout::detect(&headers, source)?;

    let mut outcome = ImportOutcome::default();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                outcome.skipped.push(SkippedRow {
                    file: source.to_string(),
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        match parse_record(&record, &layout, source) {
            Ok(tx) => outcome.transactions.push(tx),
            Err(reason) => outcome.skipped.push(SkippedRow {
                file: source.to_string(),
                line,
                reason,
            }),
        }
    }

    Ok(outcome)
}

fn parse_record(
    record: &csv::StringRecord,
    layout: &ColumnLayout,
    source: &str,
) -> Result<Transaction, String> {
    let field = |idx: usize| record.get(idx).unwrap_or_default();

    let date = parse_date(field(layout.date))?;
    let description = field(layout.description).trim().to_string();

    let amount = if let Some(col) = layout.amount {
        parse_amount(field(col))?
    } else {
        // Separate debit/credit columns: credits are inflows, debits
        // outflows, so the signed amount is credit - debit.
        let cell = |col: Option<usize>| -> Result<Money, String> {
            match col.map(field) {
                Some(s) if !s.trim().is_empty() => parse_amount(s),
                _ => Ok(Money::zero()),
            }
        };
        cell(layout.credit)? - cell(layout.debit)?
    };

    let account = layout
        .account
        .map(field)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(source)
        .to_string();

    let category = layout
        .category
        .map(field)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(Transaction {
        date,
        description,
        amount,
        account,
        category,
    })
}

/// Loads several exports into one sorted sequence. A row identical to
/// one produced by an *earlier* file is dropped as a duplicate import;
/// repeats within a single file are legitimate (two coffees in one
/// day) and kept.
pub fn import_files<P: AsRef<Path>>(paths: &[P]) -> Result<ImportOutcome, ImportError> {
    let mut merged = ImportOutcome::default();
    let mut seen: HashSet<(NaiveDate, String, Money, String)> = HashSet::new();

    for path in paths {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("import")
            .to_string();
        let file = std::fs::File::open(path).map_err(|source| ImportError::Io {
            file: path.display().to_string(),
            source,
        })?;

        let outcome = import_csv(file, &name)?;
        for tx in &outcome.transactions {
            let key = (tx.date, tx.description.clone(), tx.amount, tx.account.clone());
            if seen.contains(&key) {
                merged.deduplicated += 1;
            } else {
                merged.transactions.push(tx.clone());
            }
        }
        for tx in &outcome.transactions {
            seen.insert((tx.date, tx.description.clone(), tx.amount, tx.account.clone()));
        }
        merged.skipped.extend(outcome.skipped);
    }

    sort_transactions(&mut merged.transactions);
    Ok(merged)
}
