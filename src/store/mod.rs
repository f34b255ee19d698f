//! Authoritative day/seat state.
//!
//! `SeatStore` is the only write path to the seat table. Implementations must
//! flip a seat in one atomic step: the new value is derived from the stored
//! value inside the same statement (or critical section) that writes it.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Day, Seat, SeatChange};

pub mod memory;
pub mod postgres;

pub use memory::InMemorySeatStore;
pub use postgres::PgSeatStore;

#[async_trait]
pub trait SeatStore: Send + Sync {
    /// Creates missing days, then `seats_per_day` seats for every day that has none.
    /// Running it again on a seeded store changes nothing.
    async fn initialize(&self, days: u32, seats_per_day: u32) -> Result<(), StoreError>;

    /// Flips `taken` for `seat_id` if it belongs to `day_id`.
    async fn toggle_seat(&self, day_id: i32, seat_id: i32) -> Result<SeatChange, StoreError>;

    /// Frees every seat of the day and returns the rows it touched.
    /// An unknown day yields an empty list.
    async fn reset_day(&self, day_id: i32) -> Result<Vec<SeatChange>, StoreError>;

    /// Unknown ids are ignored.
    async fn rename_day(&self, day_id: i32, name: &str) -> Result<(), StoreError>;

    async fn list_days(&self) -> Result<Vec<Day>, StoreError>;

    async fn list_seats(&self, day_id: i32) -> Result<Vec<Seat>, StoreError>;
}

pub(crate) fn day_name(n: i64) -> String {
    format!("Day {n}")
}
