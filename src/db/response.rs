use std::collections::HashMap;

use chrono::Utc;
use color_eyre::Result;

use super::models::{AnswerRow, ResponseRow};
use super::Db;
use crate::survey::{AnswerValue, NewResponse, QuestionType, StoredResponse, Survey};

impl Db {
    /// Insert a response with all its answers atomically in a transaction.
    /// The bundle becomes visible together or not at all; there is no partial
    /// submission state to observe.
    pub async fn create_response(&self, new: &NewResponse) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let response_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO responses (survey_id, submitted_at, ip_address, user_agent)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(new.survey_id)
        .bind(Utc::now())
        .bind(&new.meta.ip_address)
        .bind(&new.meta.user_agent)
        .fetch_one(&mut *tx)
        .await?;

        for answer in &new.answers {
            let (answer_text, answer_data) = wire_parts(&answer.value)?;
            sqlx::query(
                r#"
                INSERT INTO answers (response_id, question_id, answer_text, answer_data)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(response_id)
            .bind(answer.question_id)
            .bind(answer_text)
            .bind(answer_data)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "response created for survey={}: response_id={response_id}, answers={}",
            new.survey_id,
            new.answers.len()
        );
        Ok(response_id)
    }

    /// Fetch all stored responses of a survey with typed answers, oldest
    /// first. The survey is passed in so answers can be typed against their
    /// question definitions.
    pub async fn responses(&self, survey: &Survey) -> Result<Vec<StoredResponse>> {
        let response_rows = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT id, survey_id, submitted_at, ip_address, user_agent
            FROM responses
            WHERE survey_id = $1
            ORDER BY id
            "#,
        )
        .bind(survey.id)
        .fetch_all(&self.pool)
        .await?;

        let answer_rows = sqlx::query_as::<_, AnswerRow>(
            r#"
            SELECT a.id, a.response_id, a.question_id, a.answer_text, a.answer_data
            FROM answers a
            JOIN responses r ON r.id = a.response_id
            WHERE r.survey_id = $1
            ORDER BY a.response_id, a.id
            "#,
        )
        .bind(survey.id)
        .fetch_all(&self.pool)
        .await?;

        Self::hydrate_responses(survey, response_rows, answer_rows)
    }

    pub async fn get_response(
        &self,
        survey: &Survey,
        response_id: i64,
    ) -> Result<Option<StoredResponse>> {
        let Some(row) = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT id, survey_id, submitted_at, ip_address, user_agent
            FROM responses
            WHERE id = $1 AND survey_id = $2
            "#,
        )
        .bind(response_id)
        .bind(survey.id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let answer_rows = sqlx::query_as::<_, AnswerRow>(
            r#"
            SELECT id, response_id, question_id, answer_text, answer_data
            FROM answers
            WHERE response_id = $1
            ORDER BY id
            "#,
        )
        .bind(response_id)
        .fetch_all(&self.pool)
        .await?;

        let mut hydrated = Self::hydrate_responses(survey, vec![row], answer_rows)?;
        Ok(hydrated.pop())
    }

    pub async fn responses_count(&self, survey_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM responses WHERE survey_id = $1")
            .bind(survey_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn survey_has_responses(&self, survey_id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM responses WHERE survey_id = $1)")
                .bind(survey_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    pub async fn question_has_answers(&self, question_id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM answers WHERE question_id = $1)")
                .bind(question_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    fn hydrate_responses(
        survey: &Survey,
        response_rows: Vec<ResponseRow>,
        answer_rows: Vec<AnswerRow>,
    ) -> Result<Vec<StoredResponse>> {
        let types: HashMap<i64, QuestionType> = survey
            .questions
            .iter()
            .map(|question| (question.id, question.question_type))
            .collect();

        let mut answers_by_response: HashMap<i64, HashMap<i64, AnswerValue>> = HashMap::new();
        for row in answer_rows {
            let Some(question_type) = types.get(&row.question_id) else {
                tracing::warn!(
                    "answer {} references unknown question {}, skipping",
                    row.id,
                    row.question_id
                );
                continue;
            };
            let value = row.typed_value(*question_type)?;
            answers_by_response
                .entry(row.response_id)
                .or_default()
                .insert(row.question_id, value);
        }

        Ok(response_rows
            .into_iter()
            .map(|row| StoredResponse {
                answers: answers_by_response.remove(&row.id).unwrap_or_default(),
                id: row.id,
                survey_id: row.survey_id,
                submitted_at: row.submitted_at,
                ip_address: row.ip_address,
                user_agent: row.user_agent,
            })
            .collect())
    }
}

/// Split a typed value into the stored `answer_text` / `answer_data` pair.
/// Plain strings and single selections keep the text column; structured
/// values are JSON in the data column.
fn wire_parts(value: &AnswerValue) -> Result<(Option<String>, Option<String>)> {
    Ok(match value {
        AnswerValue::Text(s) | AnswerValue::Selection(s) => (Some(s.clone()), None),
        AnswerValue::Selections(labels) => (None, Some(serde_json::to_string(labels)?)),
        AnswerValue::Rating(n) => (None, Some(n.to_string())),
    })
}
