pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const API_PREFIX: &str = "/api/v1";

pub const SURVEYS_URL: &str = "/api/v1/surveys";

pub fn survey_url(survey_id: i64) -> String {
    format!("/api/v1/surveys/{survey_id}")
}

pub fn questions_url(survey_id: i64) -> String {
    format!("/api/v1/surveys/{survey_id}/questions")
}

pub fn question_url(survey_id: i64, question_id: i64) -> String {
    format!("/api/v1/surveys/{survey_id}/questions/{question_id}")
}

pub fn responses_url(survey_id: i64) -> String {
    format!("/api/v1/surveys/{survey_id}/responses")
}

pub fn response_url(survey_id: i64, response_id: i64) -> String {
    format!("/api/v1/surveys/{survey_id}/responses/{response_id}")
}

pub fn statistics_url(survey_id: i64) -> String {
    format!("/api/v1/surveys/{survey_id}/statistics")
}

// Rating questions score on a fixed 1-5 scale.
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;
pub const RATING_BUCKETS: usize = (RATING_MAX - RATING_MIN + 1) as usize;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_BODY_BYTES: usize = 256 * 1024;
