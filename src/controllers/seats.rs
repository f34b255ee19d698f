use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::StoreError;
use crate::models::Seat;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats/{day_id}", get(list_seats))
        .route("/book/{day_id}/{seat_id}", post(book_seat))
        .route("/reset/{day_id}", post(reset_day))
}

// GET /api/seats/:dayId
async fn list_seats(
    State(state): State<Arc<AppState>>,
    Path(day_id): Path<i32>,
) -> Result<Json<Vec<Seat>>, StoreError> {
    Ok(Json(state.seats.list_seats(day_id).await?))
}

// POST /api/book/:dayId/:seatId: переключает место (занято <-> свободно)
#[derive(Debug, Serialize)]
struct BookSeatResponse {
    success: bool,
    taken: bool,
}

async fn book_seat(
    State(state): State<Arc<AppState>>,
    Path((day_id, seat_id)): Path<(i32, i32)>,
) -> Result<Json<BookSeatResponse>, StoreError> {
    let taken = state.seats.toggle_seat(day_id, seat_id).await?;
    Ok(Json(BookSeatResponse { success: true, taken }))
}

// POST /api/reset/:dayId
async fn reset_day(
    State(state): State<Arc<AppState>>,
    Path(day_id): Path<i32>,
) -> Result<Json<Value>, StoreError> {
    let seats = state.seats.reset_day(day_id).await?;
    tracing::warn!(day_id, seats, "RESET: all seats of the day released");
    Ok(Json(json!({ "message": format!("All seats for day {day_id} are free again") })))
}
