use async_trait::async_trait;
use tracing::info;

use crate::database::Database;
use crate::error::StoreError;
use crate::models::{Day, Seat, SeatChange};
use crate::store::SeatStore;

// Ключ advisory-лока для сидирования: два процесса не должны сидировать одновременно
const SEED_LOCK_KEY: i64 = 0x5EA7_B0A2D;

#[derive(Clone)]
pub struct PgSeatStore {
    db: Database,
}

impl PgSeatStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SeatStore for PgSeatStore {
    async fn initialize(&self, days: u32, seats_per_day: u32) -> Result<(), StoreError> {
        let mut tx = self.db.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        // 1. Дни: добавляем только недостающие
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM days")
            .fetch_one(&mut *tx)
            .await?;
        let wanted = i64::from(days);
        if existing < wanted {
            let inserted = sqlx::query(
                r#"
                INSERT INTO days (name)
                SELECT 'Day ' || n
                FROM generate_series($1::BIGINT, $2::BIGINT) AS n
                ORDER BY n
                "#,
            )
            .bind(existing + 1)
            .bind(wanted)
            .execute(&mut *tx)
            .await?;
            info!(days = inserted.rows_affected(), "Seeded days");
        }

        // 2. Места: только для дней, у которых мест ещё нет
        let seats = sqlx::query(
            r#"
            INSERT INTO seats (day_id)
            SELECT d.id
            FROM days d
            CROSS JOIN generate_series(1::BIGINT, $1::BIGINT) AS n
            WHERE NOT EXISTS (SELECT 1 FROM seats s WHERE s.day_id = d.id)
            ORDER BY d.id, n
            "#,
        )
        .bind(i64::from(seats_per_day))
        .execute(&mut *tx)
        .await?;
        if seats.rows_affected() > 0 {
            info!(seats = seats.rows_affected(), "Seeded seats");
        }

        tx.commit().await?;
        Ok(())
    }

    async fn toggle_seat(&self, day_id: i32, seat_id: i32) -> Result<SeatChange, StoreError> {
        // Одним UPDATE: чтение и запись под одной блокировкой строки
        sqlx::query_as::<_, SeatChange>(
            r#"
            UPDATE seats
            SET taken = NOT taken, version = version + 1
            WHERE id = $1 AND day_id = $2
            RETURNING id AS seat_id, day_id, taken, version
            "#,
        )
        .bind(seat_id)
        .bind(day_id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or(StoreError::NotFound { day_id, seat_id })
    }

    async fn reset_day(&self, day_id: i32) -> Result<Vec<SeatChange>, StoreError> {
        let changes = sqlx::query_as::<_, SeatChange>(
            r#"
            UPDATE seats
            SET taken = FALSE, version = version + 1
            WHERE day_id = $1
            RETURNING id AS seat_id, day_id, taken, version
            "#,
        )
        .bind(day_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(changes)
    }

    async fn rename_day(&self, day_id: i32, name: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE days SET name = $2 WHERE id = $1")
            .bind(day_id)
            .bind(name)
            .execute(&self.db.pool)
            .await?;
        Ok(())
    }

    async fn list_days(&self) -> Result<Vec<Day>, StoreError> {
        let days = sqlx::query_as::<_, Day>("SELECT id, name FROM days ORDER BY id")
            .fetch_all(&self.db.pool)
            .await?;
        Ok(days)
    }

    async fn list_seats(&self, day_id: i32) -> Result<Vec<Seat>, StoreError> {
        let seats = sqlx::query_as::<_, Seat>(
            "SELECT id, day_id, taken, version FROM seats WHERE day_id = $1 ORDER BY id",
        )
        .bind(day_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(seats)
    }
}
