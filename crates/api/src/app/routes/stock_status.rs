use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use stockpulse_infra::retrieval::parse_date;
use stockpulse_infra::RowSort;

use crate::app::{dto::StockStatusQuery, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_stock_status))
        .route("/snapshots", post(generate_snapshots))
}

/// Merged snapshot rows for `date`, or each branch's latest snapshot.
pub async fn get_stock_status(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<StockStatusQuery>,
) -> axum::response::Response {
    let date = match query.date().map(parse_date).transpose() {
        Ok(d) => d,
        Err(e) => return errors::retrieval_error_to_response(e),
    };

    let result = match services.retrieval.query(date).await {
        Ok(r) => r,
        Err(e) => return errors::retrieval_error_to_response(e),
    };

    let result = match RowSort::from_params(query.sort_by.as_deref(), query.order.as_deref()) {
        Some(sort) => result.sorted_by(&sort),
        None => result,
    };

    Json(result).into_response()
}

/// Run the snapshot pipeline for today and report per-branch outcomes.
pub async fn generate_snapshots(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let report = services.pipeline.run().await;
    info!(
        snapshot_date = %report.snapshot_date,
        written = report.written(),
        skipped = report.skipped(),
        failed = report.failed(),
        "snapshot run requested over http finished"
    );
    Json(report).into_response()
}
