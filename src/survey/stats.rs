use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{AnswerValue, Question, QuestionType, Survey};
use crate::names;

/// One respondent's stored submission, as fetched for aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResponse {
    pub id: i64,
    pub survey_id: i64,
    pub submitted_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Typed answers keyed by question id; at most one per question.
    pub answers: HashMap<i64, AnswerValue>,
}

/// Selection count for one configured option label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionCount {
    pub option: String,
    pub count: u64,
}

/// The type-specific part of a question's aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Breakdown {
    /// Free text is counted, not summarized further.
    Text {},
    /// Choice types: selection count per configured option, in option order.
    /// Options nobody selected still appear with a zero count.
    Options { distribution: Vec<OptionCount> },
    /// Rating: mean over the answers present and a histogram over the scale.
    Rating {
        average: Option<f64>,
        histogram: [u64; names::RATING_BUCKETS],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSummary {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub response_count: u64,
    #[serde(flatten)]
    pub breakdown: Breakdown,
}

/// Derived, never persisted; recomputed on demand from the current answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveySummary {
    pub survey_id: i64,
    pub total_responses: u64,
    pub completion_rate: f64,
    pub question_statistics: Vec<QuestionSummary>,
}

/// Aggregate all stored responses of a survey into per-question summaries.
///
/// Deterministic: the same response set produces a bit-identical summary, so
/// results are cacheable and tests are reproducible.
pub fn summarize(survey: &Survey, responses: &[StoredResponse]) -> SurveySummary {
    let total = responses.len() as u64;
    let complete = responses
        .iter()
        .filter(|response| is_complete(survey, response))
        .count() as u64;
    let completion_rate = if total == 0 {
        0.0
    } else {
        complete as f64 / total as f64
    };

    let question_statistics = survey
        .questions
        .iter()
        .map(|question| summarize_question(question, responses))
        .collect();

    SurveySummary {
        survey_id: survey.id,
        total_responses: total,
        completion_rate,
        question_statistics,
    }
}

/// A response is complete when every required question has an answer.
fn is_complete(survey: &Survey, response: &StoredResponse) -> bool {
    survey
        .questions
        .iter()
        .filter(|question| question.is_required)
        .all(|question| response.answers.contains_key(&question.id))
}

fn summarize_question(question: &Question, responses: &[StoredResponse]) -> QuestionSummary {
    let answers: Vec<&AnswerValue> = responses
        .iter()
        .filter_map(|response| response.answers.get(&question.id))
        .collect();
    let response_count = answers.len() as u64;

    let breakdown = match question.question_type {
        QuestionType::Text => Breakdown::Text {},
        QuestionType::SingleChoice | QuestionType::Dropdown => {
            let mut distribution = zero_distribution(&question.options);
            for answer in &answers {
                if let AnswerValue::Selection(label) = answer {
                    bump(&mut distribution, label);
                }
            }
            Breakdown::Options { distribution }
        }
        QuestionType::MultiChoice => {
            // A response selecting three labels contributes to three counts.
            let mut distribution = zero_distribution(&question.options);
            for answer in &answers {
                if let AnswerValue::Selections(labels) = answer {
                    for label in labels {
                        bump(&mut distribution, label);
                    }
                }
            }
            Breakdown::Options { distribution }
        }
        QuestionType::Rating => {
            let mut histogram = [0u64; names::RATING_BUCKETS];
            let mut sum = 0i64;
            let mut answered = 0u64;
            for answer in &answers {
                if let AnswerValue::Rating(value) = answer {
                    let slot = usize::try_from(value - names::RATING_MIN)
                        .ok()
                        .and_then(|idx| histogram.get_mut(idx));
                    if let Some(slot) = slot {
                        *slot += 1;
                        sum += value;
                        answered += 1;
                    }
                }
            }
            // Mean over answered only; omitted answers are not zeros.
            let average = (answered > 0).then(|| sum as f64 / answered as f64);
            Breakdown::Rating { average, histogram }
        }
    };

    QuestionSummary {
        question_id: question.id,
        question_text: question.question_text.clone(),
        question_type: question.question_type,
        response_count,
        breakdown,
    }
}

fn zero_distribution(options: &[String]) -> Vec<OptionCount> {
    options
        .iter()
        .map(|option| OptionCount {
            option: option.clone(),
            count: 0,
        })
        .collect()
}

fn bump(distribution: &mut [OptionCount], label: &str) {
    if let Some(entry) = distribution.iter_mut().find(|entry| entry.option == label) {
        entry.count += 1;
    }
}
