use anyhow::Context;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seat_board::{
    config::{Config, StoreBackend},
    database::Database,
    store::{InMemorySeatStore, PgSeatStore, SeatStore},
    AppState,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Seat Board");

    let store: Arc<dyn SeatStore> = match config.database.backend {
        StoreBackend::Postgres => {
            // Connect to the database
            let db = Database::from_config(&config.database, config.store_timeout())
                .await
                .context("Failed to connect to database")?;
            info!("Database connected");

            db.run_migrations()
                .await
                .context("Failed to run migrations")?;

            Arc::new(PgSeatStore::new(db))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory seat store, state is lost on restart");
            Arc::new(InMemorySeatStore::new())
        }
    };

    // Create the shared application state
    let app_state = AppState::new(store, config.clone());

    // Without seeded days and seats there is nothing to serve
    app_state
        .seats
        .initialize(&config.seed)
        .await
        .context("Failed to initialize days and seats")?;

    // --- Start the web server ---

    let app = seat_board::app(app_state);

    let ip: IpAddr = config.app.host.parse().context("HOST must be an IP address")?;
    let addr = SocketAddr::from((ip, config.app.port));
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
