pub mod days;
pub mod live;
pub mod seats;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(days::routes())
        .merge(seats::routes())
}
