use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use serde_json::{json, Value};

use super::{today, LimitParams, RangeParams};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/dashboard?range=last7
///
/// Metric cards, daily trend and channel distribution for the window.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Value>, AppError> {
    let range = params.preset().range(today());
    let data = state.sdk.load_dashboard(range).await?;
    let cards = data.metrics.cards(&state.currency);

    Ok(Json(json!({
        "range": data.range,
        "cards": cards,
        "trends": data.trends,
        "chart": data.chart_points(),
        "distribution": data.chart_slices(),
    })))
}

/// GET /api/transactions/recent?limit=10
pub async fn recent_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params.limit.unwrap_or(10);
    let rows = state
        .sdk
        .run(move |s| s.transactions().recent(limit))
        .await?;

    let count = rows.len();
    Ok(Json(json!({ "data": rows, "count": count })))
}
