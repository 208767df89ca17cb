use axum::Router;

pub mod stock_status;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new().nest("/api/stock-status", stock_status::router())
}
