pub mod question;
pub mod response;
pub mod statistics;
pub mod survey;

use axum::{Json, Router};

use crate::{models::HealthBody, names, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(survey::routes())
        .merge(question::routes())
        .merge(response::routes())
        .merge(statistics::routes())
}

pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        version: names::VERSION,
    })
}
