pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod serialize;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::repository::Repository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/episodes", get(routes::list_episodes))
        .route("/episodes/{id}", get(routes::get_episode).delete(routes::delete_episode))
        .route("/guests", get(routes::list_guests))
        .route("/guests/{id}", delete(routes::delete_guest))
        .route("/appearances", post(routes::create_appearance))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)),
        )
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,late_show=debug,sqlx=warn".to_string()),
        )
        .init();
}
