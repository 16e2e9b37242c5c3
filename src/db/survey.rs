use chrono::{DateTime, Utc};
use color_eyre::Result;

use super::models::{QuestionRow, SurveyDeletion, SurveyListRow, SurveyRow};
use super::Db;
use crate::survey::{Question, QuestionDraft, Survey};

impl Db {
    /// Insert a survey with all its questions atomically in a transaction.
    /// Definition validation happens in the domain core before this is called.
    pub async fn create_survey(
        &self,
        title: &str,
        description: Option<&str>,
        is_active: bool,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        questions: &[QuestionDraft],
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let survey_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO surveys (title, description, is_active, start_date, end_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(is_active)
        .bind(start_date)
        .bind(end_date)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        for draft in questions {
            Self::insert_question_tx(&mut tx, survey_id, draft).await?;
        }

        tx.commit().await?;

        tracing::info!(
            "new survey created with id: {survey_id}, questions: {}",
            questions.len()
        );
        Ok(survey_id)
    }

    pub(super) async fn insert_question_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        survey_id: i64,
        draft: &QuestionDraft,
    ) -> Result<i64> {
        let options_json = if draft.options.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&draft.options)?)
        };

        let question_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions (survey_id, question_text, question_type, is_required, order_index, options)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(survey_id)
        .bind(&draft.question_text)
        .bind(draft.question_type.as_str())
        .bind(draft.is_required)
        .bind(draft.order_index)
        .bind(options_json)
        .fetch_one(&mut **tx)
        .await?;

        Ok(question_id)
    }

    pub async fn surveys(&self) -> Result<Vec<SurveyListRow>> {
        let surveys = sqlx::query_as::<_, SurveyListRow>(
            r#"
            SELECT
              s.id AS id,
              s.title AS title,
              s.description AS description,
              s.is_active AS is_active,
              s.created_at AS created_at,
              (SELECT COUNT(*) FROM questions q WHERE q.survey_id = s.id) AS question_count,
              (SELECT COUNT(*) FROM responses r WHERE r.survey_id = s.id) AS response_count
            FROM surveys s
            ORDER BY s.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(surveys)
    }

    /// Fetch a survey with its questions in display order.
    pub async fn get_survey(&self, survey_id: i64) -> Result<Option<Survey>> {
        let Some(row) = sqlx::query_as::<_, SurveyRow>(
            "SELECT id, title, description, is_active, start_date, end_date, created_at FROM surveys WHERE id = $1",
        )
        .bind(survey_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let questions = self.survey_questions(survey_id).await?;
        Ok(Some(row.into_survey(questions)))
    }

    pub async fn survey_questions(&self, survey_id: i64) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, survey_id, question_text, question_type, is_required, order_index, options
            FROM questions
            WHERE survey_id = $1
            ORDER BY order_index
            "#,
        )
        .bind(survey_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    pub async fn survey_exists(&self, survey_id: i64) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM surveys WHERE id = $1)")
                .bind(survey_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Update survey metadata. Returns false when the survey does not exist.
    pub async fn update_survey(
        &self,
        survey_id: i64,
        title: &str,
        description: Option<&str>,
        is_active: bool,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE surveys
            SET title = $1, description = $2, is_active = $3, start_date = $4, end_date = $5
            WHERE id = $6
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(is_active)
        .bind(start_date)
        .bind(end_date)
        .bind(survey_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a survey, or deactivate it when responses still reference it.
    /// Referenced surveys are never hard-deleted.
    pub async fn delete_survey(&self, survey_id: i64) -> Result<SurveyDeletion> {
        if self.survey_has_responses(survey_id).await? {
            sqlx::query("UPDATE surveys SET is_active = 0 WHERE id = $1")
                .bind(survey_id)
                .execute(&self.pool)
                .await?;

            tracing::info!("survey deactivated with id: {survey_id} (responses exist)");
            return Ok(SurveyDeletion::Deactivated);
        }

        sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(survey_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("survey deleted with id: {survey_id}");
        Ok(SurveyDeletion::Deleted)
    }
}
