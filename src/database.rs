use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    Pool, Postgres,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn new(
        database_url: &str,
        pool_size: u32,
        ssl_verify: bool,
        statement_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        // Без проверки сертификата TLS всё равно используется, если сервер его предлагает
        let ssl_mode = if ssl_verify { PgSslMode::VerifyFull } else { PgSslMode::Prefer };
        // Зависший запрос обрывает сам Postgres, и транзакция откатывается целиком
        let options = PgConnectOptions::from_str(database_url)?
            .ssl_mode(ssl_mode)
            .options([("statement_timeout", format!("{}ms", statement_timeout.as_millis()))]);

        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Ok(Database { pool })
    }

    pub async fn from_config(
        config: &DatabaseConfig,
        statement_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;
        Self::new(url, config.pool_size, config.ssl_verify, statement_timeout).await
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed");
        Ok(())
    }
}
