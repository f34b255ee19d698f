#![allow(dead_code)]

use std::sync::Arc;

use seat_board::config::{AppConfig, Config, DatabaseConfig, LiveConfig, SeedConfig, StoreBackend};
use seat_board::store::InMemorySeatStore;
use seat_board::AppState;

/// Two days with two seats each: day 1 owns seats 1 and 2, day 2 owns 3 and 4.
pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            rust_log: "seat_board=debug".to_string(),
            static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string(),
        },
        database: DatabaseConfig {
            backend: StoreBackend::Memory,
            url: None,
            pool_size: 1,
            ssl_verify: false,
        },
        seed: SeedConfig { days: 2, seats_per_day: 2 },
        live: LiveConfig { broadcast_capacity: 256, send_timeout_ms: 1_000 },
        store_timeout_ms: 1_000,
    }
}

pub async fn seeded_state() -> Arc<AppState> {
    state_with(test_config()).await
}

pub async fn state_with(config: Config) -> Arc<AppState> {
    let state = AppState::new(Arc::new(InMemorySeatStore::new()), config.clone());
    state.seats.initialize(&config.seed).await.expect("seeding the memory store");
    state
}
