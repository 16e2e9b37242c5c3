use color_eyre::Result;

use super::models::QuestionRow;
use super::Db;
use crate::survey::{Question, QuestionDraft};

impl Db {
    pub async fn get_question(&self, question_id: i64) -> Result<Option<Question>> {
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT id, survey_id, question_text, question_type, is_required, order_index, options
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(QuestionRow::into_question).transpose()
    }

    pub async fn questions_count(&self, survey_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE survey_id = $1")
            .bind(survey_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Next free display slot for a survey's questions.
    pub async fn next_order_index(&self, survey_id: i64) -> Result<i64> {
        let next: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM questions WHERE survey_id = $1",
        )
        .bind(survey_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(next)
    }

    pub async fn add_question(&self, survey_id: i64, draft: &QuestionDraft) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        let question_id = Self::insert_question_tx(&mut tx, survey_id, draft).await?;
        tx.commit().await?;

        tracing::info!("question created for survey={survey_id}: question_id={question_id}");
        Ok(question_id)
    }

    /// Rewrite a question definition in place. Callers must check
    /// `question_has_answers` first; a question with stored answers is
    /// immutable.
    pub async fn update_question(&self, question_id: i64, draft: &QuestionDraft) -> Result<bool> {
        let options_json = if draft.options.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&draft.options)?)
        };

        let result = sqlx::query(
            r#"
            UPDATE questions
            SET question_text = $1, question_type = $2, is_required = $3, order_index = $4, options = $5
            WHERE id = $6
            "#,
        )
        .bind(&draft.question_text)
        .bind(draft.question_type.as_str())
        .bind(draft.is_required)
        .bind(draft.order_index)
        .bind(options_json)
        .bind(question_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_question(&self, question_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(question_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("question deleted with id: {question_id}");
        Ok(())
    }
}
