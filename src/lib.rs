pub mod broadcast;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::broadcast::Broadcaster;
use crate::services::SeatService;
use crate::store::SeatStore;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub seats: SeatService,
    pub config: config::Config,
}

impl AppState {
    pub fn new(store: Arc<dyn SeatStore>, config: config::Config) -> Arc<Self> {
        let broadcaster = Broadcaster::new(config.live.broadcast_capacity);
        let seats = SeatService::new(store, broadcaster, config.store_timeout());
        Arc::new(Self { seats, config })
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    // Браузерный клиент: всё, что не API, отдаётся из static_dir, неизвестные пути получают index.html
    let static_dir = Path::new(&state.config.app.static_dir);
    let client = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/ws", get(controllers::live::live_socket))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes())
        .fallback_service(client)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
