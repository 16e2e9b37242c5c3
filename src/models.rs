// Wire-level request and response bodies.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::survey::{AnswerValue, QuestionDraft, QuestionType, RawValue, StoredResponse, Survey};

#[derive(Deserialize)]
pub struct CreateSurveyBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub questions: Vec<QuestionBody>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
pub struct UpdateSurveyBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

/// A question definition as submitted by an author. Unknown type tags are
/// rejected during deserialization; they never reach dispatch.
#[derive(Deserialize)]
pub struct QuestionBody {
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub order_index: Option<i64>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl QuestionBody {
    /// Turn the body into a draft, falling back to the given display slot
    /// when no explicit order was submitted.
    pub fn into_draft(self, fallback_order: i64) -> QuestionDraft {
        QuestionDraft {
            question_text: self.question_text,
            question_type: self.question_type,
            is_required: self.is_required,
            order_index: self.order_index.unwrap_or(fallback_order),
            options: self.options.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
pub struct SubmitResponseBody {
    pub answers: Vec<AnswerItem>,
}

/// One submitted field in the wire shape the form layer produces: strings in
/// `answer_text`, everything else (label sets, numbers) in `answer_data`.
#[derive(Deserialize)]
pub struct AnswerItem {
    pub question_id: i64,
    #[serde(default)]
    pub answer_text: Option<String>,
    #[serde(default)]
    pub answer_data: Option<serde_json::Value>,
}

impl SubmitResponseBody {
    /// Collapse the submitted list into a per-question raw value map. A later
    /// entry for the same question overrides an earlier one.
    pub fn into_raw_map(self) -> HashMap<i64, RawValue> {
        let mut map = HashMap::new();
        for item in self.answers {
            let raw = RawValue::from_wire(item.answer_text.as_deref(), item.answer_data.as_ref());
            if let Some(raw) = raw {
                map.insert(item.question_id, raw);
            }
        }
        map
    }
}

#[derive(Serialize)]
pub struct CreatedBody {
    pub id: i64,
}

#[derive(Serialize)]
pub struct DeletionBody {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ResponseOut {
    pub id: i64,
    pub survey_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub answers: Vec<AnswerOut>,
}

#[derive(Serialize)]
pub struct AnswerOut {
    pub question_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_data: Option<serde_json::Value>,
}

impl ResponseOut {
    /// Project a stored response back onto the wire, answers in question
    /// display order.
    pub fn from_stored(survey: &Survey, stored: &StoredResponse) -> Self {
        let answers = survey
            .questions
            .iter()
            .filter_map(|question| {
                stored
                    .answers
                    .get(&question.id)
                    .map(|value| answer_out(question.id, value))
            })
            .collect();

        Self {
            id: stored.id,
            survey_id: stored.survey_id,
            submitted_at: stored.submitted_at,
            ip_address: stored.ip_address.clone(),
            user_agent: stored.user_agent.clone(),
            answers,
        }
    }
}

fn answer_out(question_id: i64, value: &AnswerValue) -> AnswerOut {
    match value {
        AnswerValue::Text(s) | AnswerValue::Selection(s) => AnswerOut {
            question_id,
            answer_text: Some(s.clone()),
            answer_data: None,
        },
        AnswerValue::Selections(labels) => AnswerOut {
            question_id,
            answer_text: None,
            answer_data: Some(serde_json::json!(labels)),
        },
        AnswerValue::Rating(n) => AnswerOut {
            question_id,
            answer_text: None,
            answer_data: Some(serde_json::json!(n)),
        },
    }
}
