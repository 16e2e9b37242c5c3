use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};

use crate::{
    models::QuestionBody,
    rejections::{AppError, OptionExt, ResultExt},
    survey::Question,
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/surveys/{survey_id}/questions", post(add_question))
        .route(
            "/surveys/{survey_id}/questions/{question_id}",
            put(update_question).delete(delete_question),
        )
}

async fn add_question(
    State(state): State<AppState>,
    Path(survey_id): Path<i64>,
    Json(body): Json<QuestionBody>,
) -> Result<(StatusCode, Json<Question>), AppError> {
    let exists = state
        .db
        .survey_exists(survey_id)
        .await
        .reject("could not check survey")?;
    if !exists {
        return Err(AppError::NotFound("survey not found"));
    }

    let next_index = state
        .db
        .next_order_index(survey_id)
        .await
        .reject("could not get next order index")?;

    let draft = body.into_draft(next_index);
    draft
        .validate()
        .reject_input("invalid question definition")?;

    let question_id = state
        .db
        .add_question(survey_id, &draft)
        .await
        .reject_input("could not add question")?;

    let question = state
        .db
        .get_question(question_id)
        .await
        .reject("could not get question")?
        .ok_or(AppError::Internal("question missing after creation"))?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Questions become immutable once a response has answered them; edits after
/// that point are conflicts, not in-place mutations.
async fn update_question(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(i64, i64)>,
    Json(body): Json<QuestionBody>,
) -> Result<Json<Question>, AppError> {
    let existing = lookup_question(&state, survey_id, question_id).await?;

    let answered = state
        .db
        .question_has_answers(question_id)
        .await
        .reject("could not check question answers")?;
    if answered {
        return Err(AppError::Conflict("question already has answers"));
    }

    let draft = body.into_draft(existing.order_index);
    draft
        .validate()
        .reject_input("invalid question definition")?;

    state
        .db
        .update_question(question_id, &draft)
        .await
        .reject_input("could not update question")?;

    let question = state
        .db
        .get_question(question_id)
        .await
        .reject("could not get question")?
        .ok_or(AppError::Internal("question missing after update"))?;

    Ok(Json(question))
}

async fn delete_question(
    State(state): State<AppState>,
    Path((survey_id, question_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    lookup_question(&state, survey_id, question_id).await?;

    let answered = state
        .db
        .question_has_answers(question_id)
        .await
        .reject("could not check question answers")?;
    if answered {
        return Err(AppError::Conflict("question already has answers"));
    }

    state
        .db
        .delete_question(question_id)
        .await
        .reject("could not delete question")?;

    Ok(StatusCode::NO_CONTENT)
}

async fn lookup_question(
    state: &AppState,
    survey_id: i64,
    question_id: i64,
) -> Result<Question, AppError> {
    let question = state
        .db
        .get_question(question_id)
        .await
        .reject("could not get question")?
        .or_not_found("question not found")?;

    if question.survey_id != survey_id {
        return Err(AppError::NotFound("question not found"));
    }

    Ok(question)
}
