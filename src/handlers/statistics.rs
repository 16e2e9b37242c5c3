use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    rejections::{AppError, OptionExt, ResultExt},
    survey::{summarize, SurveySummary},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/surveys/{survey_id}/statistics", get(get_statistics))
}

/// Summaries are computed on demand from whatever response set the read
/// returned; statistics views accept snapshot consistency. A survey with no
/// responses yields a well-formed all-zero summary, not an error.
async fn get_statistics(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
) -> Result<Json<SurveySummary>, AppError> {
    let survey = state
        .db
        .get_survey(survey_id)
        .await
        .reject("could not get survey")?
        .or_not_found("survey not found")?;

    let responses = state
        .db
        .responses(&survey)
        .await
        .reject("could not load responses")?;

    Ok(Json(summarize(&survey, &responses)))
}
