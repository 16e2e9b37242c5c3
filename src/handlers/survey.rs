use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::{
    db::{SurveyDeletion, SurveyListRow},
    models::{CreateSurveyBody, DeletionBody, UpdateSurveyBody},
    names,
    rejections::{AppError, OptionExt, ResultExt},
    survey::Survey,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/surveys", get(list_surveys).post(create_survey))
        .route(
            "/surveys/{survey_id}",
            get(get_survey).put(update_survey).delete(delete_survey),
        )
}

async fn create_survey(
    State(state): State<AppState>,
    Json(body): Json<CreateSurveyBody>,
) -> Result<(StatusCode, Json<Survey>), AppError> {
    check_title(&body.title)?;

    let mut drafts = Vec::with_capacity(body.questions.len());
    for (position, question) in body.questions.into_iter().enumerate() {
        let draft = question.into_draft(position as i64);
        draft
            .validate()
            .reject_input("invalid question definition")?;
        drafts.push(draft);
    }

    let survey_id = state
        .db
        .create_survey(
            &body.title,
            body.description.as_deref(),
            body.is_active,
            body.start_date,
            body.end_date,
            &drafts,
        )
        .await
        .reject("could not create survey")?;

    let survey = state
        .db
        .get_survey(survey_id)
        .await
        .reject("could not get survey")?
        .ok_or(AppError::Internal("survey missing after creation"))?;

    Ok((StatusCode::CREATED, Json(survey)))
}

async fn list_surveys(
    State(state): State<AppState>,
) -> Result<Json<Vec<SurveyListRow>>, AppError> {
    let surveys = state.db.surveys().await.reject("could not list surveys")?;

    Ok(Json(surveys))
}

async fn get_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
) -> Result<Json<Survey>, AppError> {
    let survey = state
        .db
        .get_survey(survey_id)
        .await
        .reject("could not get survey")?
        .or_not_found("survey not found")?;

    Ok(Json(survey))
}

async fn update_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
    Json(body): Json<UpdateSurveyBody>,
) -> Result<Json<Survey>, AppError> {
    check_title(&body.title)?;

    let updated = state
        .db
        .update_survey(
            survey_id,
            &body.title,
            body.description.as_deref(),
            body.is_active,
            body.start_date,
            body.end_date,
        )
        .await
        .reject("could not update survey")?;

    if !updated {
        return Err(AppError::NotFound("survey not found"));
    }

    let survey = state
        .db
        .get_survey(survey_id)
        .await
        .reject("could not get survey")?
        .ok_or(AppError::Internal("survey missing after update"))?;

    Ok(Json(survey))
}

async fn delete_survey(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
) -> Result<Json<DeletionBody>, AppError> {
    let exists = state
        .db
        .survey_exists(survey_id)
        .await
        .reject("could not check survey")?;
    if !exists {
        return Err(AppError::NotFound("survey not found"));
    }

    let outcome = state
        .db
        .delete_survey(survey_id)
        .await
        .reject("could not delete survey")?;

    let status = match outcome {
        SurveyDeletion::Deleted => "deleted",
        SurveyDeletion::Deactivated => "deactivated",
    };

    Ok(Json(DeletionBody { status }))
}

fn check_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Input("title must not be empty"));
    }
    if title.len() > names::MAX_TITLE_LEN {
        return Err(AppError::Input("title too long"));
    }
    Ok(())
}
