pub mod dashboard;
pub mod handlers;
pub mod service;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use self::handlers::*;
pub use self::service::PoolAdmin;

pub fn setup_admin_router(admin: PoolAdmin) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(get_pool_health))
        .route("/add_instance", post(add_instance))
        .route("/remove_instance", post(remove_instance))
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends).post(add_backend))
        .route("/admin/backends/{index}", delete(remove_backend))
        .with_state(admin)
        .layer(TraceLayer::new_for_http())
}
