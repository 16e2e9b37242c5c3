use serde::Serialize;

use super::{AnswerShape, Question};

/// An untyped value exactly as the form layer produced it: a string, a set of
/// labels, or a number. Typing happens in [`validate`], nowhere later.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Labels(Vec<String>),
    Integer(i64),
}

impl RawValue {
    /// Build a raw value from the wire pair `answer_text` / `answer_data`.
    /// Returns `None` when the field carried nothing usable.
    pub fn from_wire(
        answer_text: Option<&str>,
        answer_data: Option<&serde_json::Value>,
    ) -> Option<Self> {
        if let Some(text) = answer_text {
            return Some(Self::Text(text.to_owned()));
        }
        match answer_data? {
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Integer(i)),
                // Non-integral numbers surface as their display string so the
                // rating validator can name them in an out-of-range failure.
                None => Some(Self::Text(n.to_string())),
            },
            serde_json::Value::Array(items) => {
                let labels = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect();
                Some(Self::Labels(labels))
            }
            _ => None,
        }
    }
}

/// A validated, typed answer value. The shape matches the question's type at
/// the moment of creation and is never re-checked afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Selection(String),
    Selections(Vec<String>),
    Rating(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    MissingRequired,
    InvalidOption,
    OutOfRange,
}

/// One problem with one question's submitted value. Failures are collected
/// and reported as data; they never cross the assembler as errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub reason: FailureReason,
    pub question_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offending_value: Option<String>,
}

impl ValidationFailure {
    pub fn missing_required(question_id: i64) -> Self {
        Self {
            reason: FailureReason::MissingRequired,
            question_id,
            offending_value: None,
        }
    }

    pub fn invalid_option(question_id: i64, value: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::InvalidOption,
            question_id,
            offending_value: Some(value.into()),
        }
    }

    pub fn out_of_range(question_id: i64, value: impl Into<String>) -> Self {
        Self {
            reason: FailureReason::OutOfRange,
            question_id,
            offending_value: Some(value.into()),
        }
    }
}

/// Validate one raw value against one question.
///
/// `Ok(None)` is a valid omission: the question is optional and nothing was
/// submitted, so no answer record is produced. A raw value whose shape the
/// question cannot read at all counts as absent; the form layer may submit
/// stale or oddly-typed fields and absence is the only safe reading.
pub fn validate(
    question: &Question,
    raw: Option<&RawValue>,
) -> Result<Option<AnswerValue>, Vec<ValidationFailure>> {
    match question.expected_shape() {
        AnswerShape::FreeText => validate_text(question, raw),
        AnswerShape::OneOf(options) => validate_single(question, options, raw),
        AnswerShape::AnyOf(options) => validate_multi(question, options, raw),
        AnswerShape::IntegerInRange { min, max } => validate_rating(question, min, max, raw),
    }
}

fn absent(question: &Question) -> Result<Option<AnswerValue>, Vec<ValidationFailure>> {
    if question.is_required {
        Err(vec![ValidationFailure::missing_required(question.id)])
    } else {
        Ok(None)
    }
}

fn validate_text(
    question: &Question,
    raw: Option<&RawValue>,
) -> Result<Option<AnswerValue>, Vec<ValidationFailure>> {
    match raw {
        Some(RawValue::Text(s)) if !s.trim().is_empty() => {
            Ok(Some(AnswerValue::Text(s.clone())))
        }
        Some(RawValue::Integer(n)) => Ok(Some(AnswerValue::Text(n.to_string()))),
        _ => absent(question),
    }
}

fn validate_single(
    question: &Question,
    options: &[String],
    raw: Option<&RawValue>,
) -> Result<Option<AnswerValue>, Vec<ValidationFailure>> {
    let label = match raw {
        Some(RawValue::Text(s)) if !s.trim().is_empty() => s.clone(),
        Some(RawValue::Integer(n)) => n.to_string(),
        // A one-element set is readable as a single selection.
        Some(RawValue::Labels(labels)) if labels.len() == 1 => labels[0].clone(),
        _ => return absent(question),
    };

    if options.contains(&label) {
        Ok(Some(AnswerValue::Selection(label)))
    } else {
        Err(vec![ValidationFailure::invalid_option(question.id, label)])
    }
}

fn validate_multi(
    question: &Question,
    options: &[String],
    raw: Option<&RawValue>,
) -> Result<Option<AnswerValue>, Vec<ValidationFailure>> {
    let labels: Vec<String> = match raw {
        Some(RawValue::Labels(labels)) => labels.clone(),
        Some(RawValue::Text(s)) if !s.trim().is_empty() => vec![s.clone()],
        Some(RawValue::Integer(n)) => vec![n.to_string()],
        _ => Vec::new(),
    };
    if labels.is_empty() {
        return absent(question);
    }

    // Duplicates collapse to a single selection, first occurrence wins.
    let mut selected: Vec<String> = Vec::new();
    let mut failures = Vec::new();
    for label in labels {
        if selected.contains(&label) {
            continue;
        }
        if options.contains(&label) {
            selected.push(label);
        } else if !failures_contain(&failures, &label) {
            failures.push(ValidationFailure::invalid_option(question.id, label));
        }
    }

    if !failures.is_empty() {
        Err(failures)
    } else if selected.is_empty() {
        absent(question)
    } else {
        Ok(Some(AnswerValue::Selections(selected)))
    }
}

fn failures_contain(failures: &[ValidationFailure], label: &str) -> bool {
    failures
        .iter()
        .any(|f| f.offending_value.as_deref() == Some(label))
}

fn validate_rating(
    question: &Question,
    min: i64,
    max: i64,
    raw: Option<&RawValue>,
) -> Result<Option<AnswerValue>, Vec<ValidationFailure>> {
    let value = match raw {
        Some(RawValue::Integer(n)) => *n,
        // Forms serialize numbers as strings; parse them like numbers and
        // report everything else as out of range.
        Some(RawValue::Text(s)) if !s.trim().is_empty() => match s.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => {
                return Err(vec![ValidationFailure::out_of_range(question.id, s.clone())]);
            }
        },
        _ => return absent(question),
    };

    if (min..=max).contains(&value) {
        Ok(Some(AnswerValue::Rating(value)))
    } else {
        Err(vec![ValidationFailure::out_of_range(
            question.id,
            value.to_string(),
        )])
    }
}
