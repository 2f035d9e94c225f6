use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde_json::{json, Value};

use super::{today, LimitParams, RangeParams};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/customers?limit=50
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params.limit.unwrap_or(50);
    let customers = state.sdk.run(move |s| s.customers().list(limit)).await?;

    let count = customers.len();
    Ok(Json(json!({ "data": customers, "count": count })))
}

/// GET /api/merchants?limit=50
pub async fn list_merchants(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Value>, AppError> {
    let limit = params.limit.unwrap_or(50);
    let merchants = state.sdk.run(move |s| s.merchants().list(limit)).await?;

    let data: Vec<Value> = merchants
        .iter()
        .map(|m| json!({ "merchant": m, "status": m.status_label() }))
        .collect();
    let count = data.len();
    Ok(Json(json!({ "data": data, "count": count })))
}

/// GET /api/merchants/{id}/performance?range=last30
pub async fn merchant_performance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Value>, AppError> {
    let preset = params.preset();
    let today = today();
    let points = state
        .sdk
        .run(move |s| s.merchant_performance(&id, preset, today))
        .await?;

    Ok(Json(json!({ "data": points })))
}
