//! 路由模块

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::status_page))
        .route("/add", post(handlers::add_row))
        .route("/delete", post(handlers::delete_row))
        .route("/api/status", get(handlers::status_json))
        .route("/api/tables/{table}", get(handlers::table_json))
        .route("/api/health", get(handlers::health_check))
}
