use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use finsight_core::{Money, Transaction};
use finsight_import::{import_csv, Categorizer};
use finsight_report::render::{to_csv, to_json};
use finsight_report::{build_summary, FilterSpec, Summary, SummaryOptions};

use crate::error::ApiError;
use crate::html::render_dashboard;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/summary", get(api_summary))
        .route("/api/upload", post(upload))
        .route("/api/transactions", post(add_transaction))
        .route("/export/summary.csv", get(export_csv))
        .route("/export/summary.json", get(export_json))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Filter and session selection shared by the dashboard, the summary
/// API and the exports.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    pub session: Option<Uuid>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub window: Option<String>,
    pub account: Option<String>,
    pub category: Option<String>,
}

/// Runs the whole pipeline for one request: snapshot the session's
/// transactions, categorize, filter, aggregate.
fn summarize(state: &AppState, params: &SummaryParams) -> Result<Summary, ApiError> {
    let filter = FilterSpec::parse(
        params.from.as_deref(),
        params.to.as_deref(),
        params.account.as_deref(),
        params.category.as_deref(),
        params.window.as_deref(),
    )?;

    let (transactions, skipped) = state.snapshot(params.session);
    let categorizer = Categorizer::new(&state.config.rules);
    let categorized = categorizer.categorize(transactions);
    let filtered = filter.apply(&categorized);

    Ok(build_summary(
        &filtered,
        &state.config.budgets,
        skipped,
        &SummaryOptions::default(),
    ))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryParams>,
) -> Result<Html<String>, ApiError> {
    let summary = summarize(&state, &params)?;
    Ok(Html(render_dashboard(&summary, params.session)))
}

async fn api_summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryParams>,
) -> Result<Json<Summary>, ApiError> {
    Ok(Json(summarize(&state, &params)?))
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub session: Option<Uuid>,
    /// Label for the upload; becomes the fallback account name.
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session: Uuid,
    pub imported: usize,
    pub skipped: usize,
}

/// Accepts a raw CSV body and appends its rows to the session.
async fn upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: String,
) -> Result<Json<UploadResponse>, ApiError> {
    let name = params.name.as_deref().unwrap_or("upload");
    let outcome = import_csv(body.as_bytes(), name)?;

    let imported = outcome.transactions.len();
    let skipped = outcome.skipped.len();
    let session = state.append(params.session, outcome.transactions, skipped);
    tracing::info!(%session, imported, skipped, "csv upload");

    Ok(Json(UploadResponse {
        session,
        imported,
        skipped,
    }))
}

#[derive(Debug, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub account: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewTransactionResponse {
    pub session: Uuid,
}

/// Manual entry from the dashboard form.
async fn add_transaction(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    Json(input): Json<NewTransaction>,
) -> Result<Json<NewTransactionResponse>, ApiError> {
    if input.description.trim().is_empty() {
        return Err(ApiError::BadRequest("description must not be empty".to_string()));
    }

    let mut tx = Transaction::new(
        input.date,
        input.description.trim(),
        Money::from_decimal(input.amount),
        input.account.as_deref().unwrap_or("manual"),
    );
    tx.category = input
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let session = state.append(params.session, vec![tx], 0);
    Ok(Json(NewTransactionResponse { session }))
}

async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = summarize(&state, &params)?;
    let body = to_csv(&summary).map_err(|e| ApiError::Internal(e.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"summary.csv\"",
            ),
        ],
        body,
    ))
}

async fn export_json(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SummaryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = summarize(&state, &params)?;
    let body = to_json(&summary)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"summary.json\"",
            ),
        ],
        body,
    ))
}
