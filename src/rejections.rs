use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::survey::ValidationFailure;

/// Application-level request failure, mapped to a JSON error response.
#[derive(Debug)]
pub enum AppError {
    /// Malformed input the client can fix.
    Input(&'static str),
    /// The addressed survey, question, or response does not exist.
    NotFound(&'static str),
    /// The request conflicts with stored state, e.g. editing an answered
    /// question or submitting to a closed survey.
    Conflict(&'static str),
    /// A submission that failed answer validation. Carries every failure so
    /// the client reports all problems in one round trip.
    Validation(Vec<ValidationFailure>),
    /// Unexpected internal failure; the cause stays in the logs.
    Internal(&'static str),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Input(message) => error_body(StatusCode::BAD_REQUEST, message),
            Self::NotFound(message) => error_body(StatusCode::NOT_FOUND, message),
            Self::Conflict(message) => error_body(StatusCode::CONFLICT, message),
            Self::Validation(failures) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "validation failed", "failures": failures })),
            )
                .into_response(),
            Self::Internal(message) => error_body(StatusCode::INTERNAL_SERVER_ERROR, message),
        }
    }
}

fn error_body(code: StatusCode, message: &str) -> Response {
    (code, Json(json!({ "error": message }))).into_response()
}

/// Convert db-layer errors into `AppError`s while logging the cause.
pub trait ResultExt<T> {
    fn reject(self, message: &'static str) -> Result<T, AppError>;
    fn reject_input(self, message: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn reject(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            AppError::Internal(message)
        })
    }

    fn reject_input(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::warn!("{message}: {e}");
            AppError::Input(message)
        })
    }
}

/// Turn a missing lookup into a not-found response.
pub trait OptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, AppError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, AppError> {
        self.ok_or(AppError::NotFound(message))
    }
}
