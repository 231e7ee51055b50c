use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use finsight_core::AppConfig;
use finsight_import::{import_files, Categorizer};
use finsight_report::render::{format_text_report, to_csv, to_json};
use finsight_report::{build_summary, FilterSpec, SummaryOptions};

/// Summarize CSV bank exports: categorized totals, budgets, top
/// merchants and recurring payments.
#[derive(Debug, Parser)]
#[command(name = "finsight", version, about)]
struct Args {
    /// CSV file(s) to load.
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// JSON config with categorization rules and budgets.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    from: Option<String>,

    /// End date (YYYY-MM-DD).
    #[arg(long)]
    to: Option<String>,

    /// Only the most recent N months of data.
    #[arg(long)]
    window: Option<String>,

    /// Only transactions from this account.
    #[arg(long)]
    account: Option<String>,

    /// Only transactions in this category.
    #[arg(long)]
    category: Option<String>,

    /// Write the summary as JSON to this path.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the summary as CSV to this path.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finsight=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let report = run(&args)?;
    print!("{report}");
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<String> {
    // Config problems abort before any CSV is touched.
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let filter = FilterSpec::parse(
        args.from.as_deref(),
        args.to.as_deref(),
        args.account.as_deref(),
        args.category.as_deref(),
        args.window.as_deref(),
    )?;

    let outcome = import_files(&args.input)?;
    if outcome.skipped_count() > 0 {
        for row in &outcome.skipped {
            tracing::warn!(file = %row.file, line = row.line, "skipped row: {}", row.reason);
        }
    }
    if outcome.deduplicated > 0 {
        tracing::info!("dropped {} duplicate rows across files", outcome.deduplicated);
    }

    let categorizer = Categorizer::new(&config.rules);
    let transactions = categorizer.categorize(outcome.transactions);
    let filtered = filter.apply(&transactions);

    let summary = build_summary(
        &filtered,
        &config.budgets,
        outcome.skipped.len(),
        &SummaryOptions::default(),
    );

    if let Some(path) = &args.json {
        std::fs::write(path, to_json(&summary)?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("wrote JSON summary to {}", path.display());
    }
    if let Some(path) = &args.csv {
        std::fs::write(path, to_csv(&summary)?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("wrote CSV summary to {}", path.display());
    }

    Ok(format_text_report(&summary))
}
