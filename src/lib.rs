pub mod db;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod names;
pub mod rejections;
pub mod survey;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest(names::API_PREFIX, handlers::routes())
        .layer(RequestBodyLimitLayer::new(names::MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
