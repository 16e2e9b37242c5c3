// Database row structs

use chrono::{DateTime, Utc};
use color_eyre::{eyre::OptionExt, Result};
use serde::Serialize;

use crate::survey::{AnswerValue, Question, QuestionType, Survey};

#[derive(sqlx::FromRow)]
pub struct SurveyRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl SurveyRow {
    pub fn into_survey(self, questions: Vec<Question>) -> Survey {
        Survey {
            id: self.id,
            title: self.title,
            description: self.description,
            is_active: self.is_active,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
            questions,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub survey_id: i64,
    pub question_text: String,
    pub question_type: String,
    pub is_required: bool,
    pub order_index: i64,
    pub options: Option<String>,
}

impl QuestionRow {
    /// Hydrate a domain question, rejecting rows whose stored type tag or
    /// options payload is unreadable.
    pub fn into_question(self) -> Result<Question> {
        let question_type = QuestionType::from_tag(&self.question_type)?;
        let options = match self.options.as_deref() {
            Some(raw) => serde_json::from_str(raw)?,
            None => Vec::new(),
        };
        Ok(Question {
            id: self.id,
            survey_id: self.survey_id,
            question_text: self.question_text,
            question_type,
            is_required: self.is_required,
            order_index: self.order_index,
            options,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct ResponseRow {
    pub id: i64,
    pub survey_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(sqlx::FromRow)]
pub struct AnswerRow {
    pub id: i64,
    pub response_id: i64,
    pub question_id: i64,
    pub answer_text: Option<String>,
    pub answer_data: Option<String>,
}

impl AnswerRow {
    /// Reconstruct the typed value using the owning question's type. The
    /// shape was checked at creation time and is trusted here; a mismatch
    /// means a corrupt row, not a validation failure.
    pub fn typed_value(&self, question_type: QuestionType) -> Result<AnswerValue> {
        match question_type {
            QuestionType::Text => {
                let text = self
                    .answer_text
                    .clone()
                    .ok_or_eyre("text answer row missing answer_text")?;
                Ok(AnswerValue::Text(text))
            }
            QuestionType::SingleChoice | QuestionType::Dropdown => {
                let label = self
                    .answer_text
                    .clone()
                    .ok_or_eyre("choice answer row missing answer_text")?;
                Ok(AnswerValue::Selection(label))
            }
            QuestionType::MultiChoice => {
                let raw = self
                    .answer_data
                    .as_deref()
                    .ok_or_eyre("multi-choice answer row missing answer_data")?;
                Ok(AnswerValue::Selections(serde_json::from_str(raw)?))
            }
            QuestionType::Rating => {
                let raw = self
                    .answer_data
                    .as_deref()
                    .ok_or_eyre("rating answer row missing answer_data")?;
                Ok(AnswerValue::Rating(raw.trim().parse()?))
            }
        }
    }
}

/// Survey list entry with its question and response counts.
#[derive(Serialize, sqlx::FromRow)]
pub struct SurveyListRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub question_count: i64,
    pub response_count: i64,
}

/// What `delete_survey` actually did; surveys referenced by responses are
/// deactivated instead of removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyDeletion {
    Deleted,
    Deactivated,
}
