use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use finsight_core::AppConfig;
use finsight_import::{import_files, ImportOutcome};

mod error;
mod html;
mod routes;
mod state;

use state::AppState;

/// Browser dashboard for CSV bank exports.
#[derive(Debug, Parser)]
#[command(name = "finsight-server", version, about)]
struct Args {
    /// CSV file(s) loaded at startup as the base data set.
    #[arg(short, long)]
    input: Vec<PathBuf>,

    /// JSON config with categorization rules and budgets.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finsight_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    let seed = if args.input.is_empty() {
        ImportOutcome::default()
    } else {
        let outcome = import_files(&args.input)?;
        tracing::info!(
            "loaded {} seed transactions ({} rows skipped, {} duplicates dropped)",
            outcome.transactions.len(),
            outcome.skipped.len(),
            outcome.deduplicated
        );
        outcome
    };

    let state = Arc::new(AppState::new(config, seed));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!("dashboard listening on http://{}", args.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
