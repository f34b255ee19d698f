use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub seed: SeedConfig,
    pub live: LiveConfig,
    pub store_timeout_ms: u64,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// Directory with the browser client, served at `/`.
    pub static_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Only required for the postgres backend.
    pub url: Option<String>,
    pub pool_size: u32,
    /// Off by default: managed Postgres hosts hand out certificates we can't verify.
    pub ssl_verify: bool,
}

// Сколько дней и мест создаётся при первом запуске
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    pub days: u32,
    pub seats_per_day: u32,
}

// Настройки live-канала (WebSocket)
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    pub broadcast_capacity: usize,
    pub send_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match env::var("SEAT_STORE").as_deref() {
            Err(_) | Ok("postgres") => StoreBackend::Postgres,
            Ok("memory") => StoreBackend::Memory,
            Ok(other) => {
                return Err(ConfigError::Invalid {
                    name: "SEAT_STORE",
                    value: other.to_string(),
                })
            }
        };

        let url = env::var("DATABASE_URL").ok();
        if backend == StoreBackend::Postgres && url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", 3000)?,
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "seat_board=debug,tower_http=debug".to_string()),
                static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
            },
            database: DatabaseConfig {
                backend,
                url,
                pool_size: parse_var("DB_POOL_SIZE", 10)?,
                ssl_verify: parse_var("DB_SSL_VERIFY", false)?,
            },
            seed: SeedConfig {
                days: parse_var("DAYS_COUNT", 15)?,
                seats_per_day: parse_var("SEATS_PER_DAY", 300)?,
            },
            live: LiveConfig {
                broadcast_capacity: parse_var("BROADCAST_CAPACITY", 1024)?,
                send_timeout_ms: parse_var("WS_SEND_TIMEOUT_MS", 5000)?,
            },
            store_timeout_ms: parse_var("STORE_TIMEOUT_MS", 5000)?,
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.live.send_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
