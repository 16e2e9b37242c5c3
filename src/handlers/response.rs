use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use crate::{
    extractors::Submitter,
    models::{CreatedBody, ResponseOut, SubmitResponseBody},
    rejections::{AppError, OptionExt, ResultExt},
    survey::{assemble, Survey},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/surveys/{survey_id}/responses",
            get(list_responses).post(submit_response),
        )
        .route(
            "/surveys/{survey_id}/responses/{response_id}",
            get(get_response),
        )
}

/// The submission pipeline: load the survey, validate the whole answer map,
/// then hand the bundle to storage as a single transactional write. Either a
/// fully valid response is stored or nothing is.
async fn submit_response(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
    Submitter(meta): Submitter,
    Json(body): Json<SubmitResponseBody>,
) -> Result<(StatusCode, Json<CreatedBody>), AppError> {
    let survey = fetch_survey(&state, survey_id).await?;

    if !survey.is_open_at(Utc::now()) {
        return Err(AppError::Conflict("survey is not accepting responses"));
    }

    let raw_answers = body.into_raw_map();
    let new_response = assemble(&survey, &raw_answers, meta).map_err(AppError::Validation)?;

    let response_id = state
        .db
        .create_response(&new_response)
        .await
        .reject("could not store response")?;

    Ok((StatusCode::CREATED, Json(CreatedBody { id: response_id })))
}

async fn list_responses(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
) -> Result<Json<Vec<ResponseOut>>, AppError> {
    let survey = fetch_survey(&state, survey_id).await?;

    let responses = state
        .db
        .responses(&survey)
        .await
        .reject("could not list responses")?;

    let out = responses
        .iter()
        .map(|stored| ResponseOut::from_stored(&survey, stored))
        .collect();

    Ok(Json(out))
}

async fn get_response(
    State(state): State<AppState>,
    Path((survey_id, response_id)): Path<(i64, i64)>,
) -> Result<Json<ResponseOut>, AppError> {
    let survey = fetch_survey(&state, survey_id).await?;

    let stored = state
        .db
        .get_response(&survey, response_id)
        .await
        .reject("could not get response")?
        .or_not_found("response not found")?;

    Ok(Json(ResponseOut::from_stored(&survey, &stored)))
}

async fn fetch_survey(state: &AppState, survey_id: i64) -> Result<Survey, AppError> {
    state
        .db
        .get_survey(survey_id)
        .await
        .reject("could not get survey")?
        .or_not_found("survey not found")
}
