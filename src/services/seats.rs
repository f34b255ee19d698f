//! seats.rs
//!
//! Сервисный слой над хранилищем мест.
//!
//! Ключевые моменты:
//! 1.  **Мутации** (переключение места, сброс дня, переименование) идут в `SeatStore`,
//!     и только после успешной записи изменение уходит в `Broadcaster`.
//! 2.  **Таймауты**: мутация выполняется в отдельной задаче (`tokio::spawn`), которая
//!     сама публикует закоммиченное изменение. По `store_timeout` истекает только
//!     ожидание вызывающего: запись не отменяется на полпути, и наблюдатели всё равно
//!     получат событие. Чтение просто обрывается по таймауту.
//! 3.  **Чтение** (`list_days`, `list_seats`) не трогает рассылку и обслуживает
//!     как HTTP, так и запрос `get-seats` из live-канала.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::broadcast::Broadcaster;
use crate::config::SeedConfig;
use crate::error::StoreError;
use crate::models::{Day, Seat};
use crate::store::SeatStore;

#[derive(Clone)]
pub struct SeatService {
    store: Arc<dyn SeatStore>,
    broadcaster: Broadcaster,
    timeout: Duration,
}

impl SeatService {
    pub fn new(store: Arc<dyn SeatStore>, broadcaster: Broadcaster, timeout: Duration) -> Self {
        Self { store, broadcaster, timeout }
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Not bounded by the per-call timeout: a large first seed can take a while.
    pub async fn initialize(&self, seed: &SeedConfig) -> Result<(), StoreError> {
        info!(days = seed.days, seats_per_day = seed.seats_per_day, "Initializing seat store");
        self.store.initialize(seed.days, seed.seats_per_day).await?;
        info!("Seat store ready");
        Ok(())
    }

    /// Flips the seat and returns its new `taken` value.
    pub async fn toggle_seat(&self, day_id: i32, seat_id: i32) -> Result<bool, StoreError> {
        let store = Arc::clone(&self.store);
        let broadcaster = self.broadcaster.clone();
        self.commit("toggle_seat", async move {
            let change = store.toggle_seat(day_id, seat_id).await?;
            info!(day_id, seat_id, taken = change.taken, "Seat toggled");
            broadcaster.publish_seat_update(change);
            Ok(change.taken)
        })
        .await
    }

    /// Returns how many seats the reset wrote.
    pub async fn reset_day(&self, day_id: i32) -> Result<usize, StoreError> {
        let store = Arc::clone(&self.store);
        let broadcaster = self.broadcaster.clone();
        self.commit("reset_day", async move {
            let changes = store.reset_day(day_id).await?;
            info!(day_id, seats = changes.len(), "Day reset");
            broadcaster.publish_reset(day_id, &changes);
            Ok(changes.len())
        })
        .await
    }

    pub async fn rename_day(&self, day_id: i32, name: &str) -> Result<(), StoreError> {
        let store = Arc::clone(&self.store);
        let name = name.to_string();
        self.commit("rename_day", async move {
            store.rename_day(day_id, &name).await?;
            info!(day_id, name = %name, "Day renamed");
            Ok(())
        })
        .await
    }

    pub async fn list_days(&self) -> Result<Vec<Day>, StoreError> {
        self.bounded("list_days", self.store.list_days()).await
    }

    pub async fn list_seats(&self, day_id: i32) -> Result<Vec<Seat>, StoreError> {
        self.bounded("list_seats", self.store.list_seats(day_id)).await
    }

    /// Runs a mutation to completion on its own task. The timeout only bounds
    /// how long the caller waits; the write and its broadcast still happen.
    async fn commit<T>(
        &self,
        operation: &'static str,
        work: impl Future<Output = Result<T, StoreError>> + Send + 'static,
    ) -> Result<T, StoreError>
    where
        T: Send + 'static,
    {
        let task = tokio::spawn(work);
        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Store call is slow, answering the caller while it finishes"
                );
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                error!(operation, timeout_ms = self.timeout.as_millis() as u64, "Store call timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }
}
