//! Process-local seat store.
//!
//! Same semantics as the Postgres store, with a mutex standing in for row
//! locks. Used by the test suite and by `SEAT_STORE=memory` for running the
//! board without a database; state is lost on restart.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::models::{Day, Seat, SeatChange};
use crate::store::{day_name, SeatStore};

#[derive(Debug, Clone, Copy)]
struct SeatRow {
    day_id: i32,
    taken: bool,
    version: i64,
}

#[derive(Debug, Default)]
struct Tables {
    days: BTreeMap<i32, String>,
    seats: BTreeMap<i32, SeatRow>,
    last_day_id: i32,
    last_seat_id: i32,
}

#[derive(Debug, Default)]
pub struct InMemorySeatStore {
    tables: Mutex<Tables>,
}

impl InMemorySeatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatStore for InMemorySeatStore {
    async fn initialize(&self, days: u32, seats_per_day: u32) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();

        for n in (tables.days.len() as i64 + 1)..=i64::from(days) {
            tables.last_day_id += 1;
            let id = tables.last_day_id;
            tables.days.insert(id, day_name(n));
        }

        let empty_days: Vec<i32> = tables
            .days
            .keys()
            .copied()
            .filter(|day_id| !tables.seats.values().any(|seat| seat.day_id == *day_id))
            .collect();
        for day_id in empty_days {
            for _ in 0..seats_per_day {
                tables.last_seat_id += 1;
                let id = tables.last_seat_id;
                tables.seats.insert(id, SeatRow { day_id, taken: false, version: 0 });
            }
        }
        Ok(())
    }

    async fn toggle_seat(&self, day_id: i32, seat_id: i32) -> Result<SeatChange, StoreError> {
        let mut tables = self.tables.lock();
        let row = tables
            .seats
            .get_mut(&seat_id)
            .filter(|row| row.day_id == day_id)
            .ok_or(StoreError::NotFound { day_id, seat_id })?;

        row.taken = !row.taken;
        row.version += 1;
        Ok(SeatChange { seat_id, day_id, taken: row.taken, version: row.version })
    }

    async fn reset_day(&self, day_id: i32) -> Result<Vec<SeatChange>, StoreError> {
        let mut tables = self.tables.lock();
        let changes = tables
            .seats
            .iter_mut()
            .filter(|(_, row)| row.day_id == day_id)
            .map(|(&seat_id, row)| {
                row.taken = false;
                row.version += 1;
                SeatChange { seat_id, day_id, taken: false, version: row.version }
            })
            .collect();
        Ok(changes)
    }

    async fn rename_day(&self, day_id: i32, name: &str) -> Result<(), StoreError> {
        if let Some(existing) = self.tables.lock().days.get_mut(&day_id) {
            *existing = name.to_string();
        }
        Ok(())
    }

    async fn list_days(&self) -> Result<Vec<Day>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables
            .days
            .iter()
            .map(|(&id, name)| Day { id, name: name.clone() })
            .collect())
    }

    async fn list_seats(&self, day_id: i32) -> Result<Vec<Seat>, StoreError> {
        let tables = self.tables.lock();
        Ok(tables
            .seats
            .iter()
            .filter(|(_, row)| row.day_id == day_id)
            .map(|(&id, row)| Seat { id, day_id, taken: row.taken, version: row.version })
            .collect())
    }
}
