use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub id: i32,
    pub day_id: i32,
    pub taken: bool,
    /// Row version the read saw. Live connections compare it with queued
    /// changes; it never leaves the process.
    #[serde(skip)]
    pub version: i64,
}

/// A committed change to one seat row.
///
/// `version` is the row counter after the write; it only ever grows, so two
/// changes to the same seat can be ordered by it regardless of which task
/// gets to publish first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct SeatChange {
    pub seat_id: i32,
    pub day_id: i32,
    pub taken: bool,
    pub version: i64,
}
