// Database schema initialization

use color_eyre::Result;
use sqlx::SqlitePool;

pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS surveys (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            start_date TEXT,
            end_date TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY,
            survey_id INTEGER NOT NULL,
            question_text TEXT NOT NULL,
            question_type TEXT NOT NULL,
            is_required BOOLEAN NOT NULL DEFAULT 0,
            order_index INTEGER NOT NULL,
            options TEXT,
            FOREIGN KEY(survey_id) REFERENCES surveys(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Question order is externally meaningful (display sequence), so it must
    // be unique within a survey.
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_questions_unique_survey_order
        ON questions(survey_id, order_index)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            id INTEGER PRIMARY KEY,
            survey_id INTEGER NOT NULL,
            submitted_at TEXT NOT NULL,
            ip_address TEXT,
            user_agent TEXT,
            FOREIGN KEY(survey_id) REFERENCES surveys(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // At most one answer per question within a response; multi-choice
    // selections travel as a single answer row.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            id INTEGER PRIMARY KEY,
            response_id INTEGER NOT NULL,
            question_id INTEGER NOT NULL,
            answer_text TEXT,
            answer_data TEXT,
            FOREIGN KEY(response_id) REFERENCES responses(id) ON DELETE CASCADE,
            FOREIGN KEY(question_id) REFERENCES questions(id) ON DELETE CASCADE,
            UNIQUE(response_id, question_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
