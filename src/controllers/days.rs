use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::StoreError;
use crate::models::Day;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/days", get(list_days))
        .route("/rename-day/{id}", post(rename_day))
}

// GET /api/days
async fn list_days(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Day>>, StoreError> {
    Ok(Json(state.seats.list_days().await?))
}

// POST /api/rename-day/:id
#[derive(Debug, Deserialize)]
struct RenameDayRequest {
    name: String,
}

async fn rename_day(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<RenameDayRequest>,
) -> Result<Json<Value>, StoreError> {
    state.seats.rename_day(id, &req.name).await?;
    Ok(Json(json!({ "success": true })))
}
