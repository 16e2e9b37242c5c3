use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::names;

/// The closed set of supported question kinds. Adding a variant forces every
/// consumer (validator, aggregator, wire mapping) to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    SingleChoice,
    MultiChoice,
    Rating,
    Dropdown,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::SingleChoice => "single_choice",
            Self::MultiChoice => "multi_choice",
            Self::Rating => "rating",
            Self::Dropdown => "dropdown",
        }
    }

    /// Parse a stored type tag. An unknown tag is a definition error raised
    /// at the boundary, never a silent fallthrough at dispatch time.
    pub fn from_tag(tag: &str) -> Result<Self, DefinitionError> {
        match tag {
            "text" => Ok(Self::Text),
            "single_choice" => Ok(Self::SingleChoice),
            "multi_choice" => Ok(Self::MultiChoice),
            "rating" => Ok(Self::Rating),
            "dropdown" => Ok(Self::Dropdown),
            other => Err(DefinitionError::UnknownQuestionType(other.to_owned())),
        }
    }

    /// Whether this type carries an options list.
    pub fn has_options(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice | Self::Dropdown)
    }
}

/// A survey definition that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("unknown question type '{0}'")]
    UnknownQuestionType(String),
    #[error("question '{0}' is choice-based and must have at least one option")]
    MissingOptions(String),
    #[error("question '{0}' of type {1} must not have options")]
    UnexpectedOptions(String, &'static str),
    #[error("question '{0}' lists option '{1}' more than once")]
    DuplicateOption(String, String),
}

/// The answer shape a question accepts; one row per question type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnswerShape<'a> {
    /// Free-form string, non-empty when required.
    FreeText,
    /// Exactly one label out of the options list.
    OneOf(&'a [String]),
    /// A duplicate-free set of labels out of the options list.
    AnyOf(&'a [String]),
    /// An integer within the inclusive bounds.
    IntegerInRange { min: i64, max: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub id: i64,
    pub survey_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub order_index: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Question {
    pub fn expected_shape(&self) -> AnswerShape<'_> {
        match self.question_type {
            QuestionType::Text => AnswerShape::FreeText,
            QuestionType::SingleChoice | QuestionType::Dropdown => {
                AnswerShape::OneOf(&self.options)
            }
            QuestionType::MultiChoice => AnswerShape::AnyOf(&self.options),
            QuestionType::Rating => AnswerShape::IntegerInRange {
                min: names::RATING_MIN,
                max: names::RATING_MAX,
            },
        }
    }
}

/// A question definition as submitted by an author, before it has an identity.
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub question_text: String,
    pub question_type: QuestionType,
    pub is_required: bool,
    pub order_index: i64,
    pub options: Vec<String>,
}

impl QuestionDraft {
    /// Enforce the options invariant: options are present and non-empty iff
    /// the type is choice-based, and labels are unambiguous.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.question_type.has_options() {
            if self.options.is_empty() {
                return Err(DefinitionError::MissingOptions(self.question_text.clone()));
            }
            for (idx, label) in self.options.iter().enumerate() {
                if self.options[..idx].contains(label) {
                    return Err(DefinitionError::DuplicateOption(
                        self.question_text.clone(),
                        label.clone(),
                    ));
                }
            }
        } else if !self.options.is_empty() {
            return Err(DefinitionError::UnexpectedOptions(
                self.question_text.clone(),
                self.question_type.as_str(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Survey {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<Question>,
}

impl Survey {
    /// Whether the survey accepts submissions at `now`: it must be active and
    /// inside its optional start/end window.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if self.start_date.is_some_and(|start| now < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| now > end) {
            return false;
        }
        true
    }
}
