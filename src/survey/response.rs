use std::collections::HashMap;

use super::{validate, AnswerValue, RawValue, Survey, ValidationFailure};

/// Submitter metadata captured by the transport layer. Both fields are
/// optional; anonymous submissions carry neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitterMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One validated answer awaiting persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnswer {
    pub question_id: i64,
    pub value: AnswerValue,
}

/// A fully validated submission, ready for a single transactional write.
/// Identity and timestamp are assigned by the storage layer at commit time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResponse {
    pub survey_id: i64,
    pub meta: SubmitterMeta,
    pub answers: Vec<NewAnswer>,
}

/// Validate a complete submission against every question of the survey.
///
/// All failures are collected before returning so the caller can report every
/// problem in one round trip; nobody should have to resubmit repeatedly to
/// discover each missing field. Map keys that match no question are ignored:
/// forms may submit stale fields and those are not the respondent's fault.
///
/// All-or-nothing: either every question validates and a persistable
/// [`NewResponse`] comes back, or the failure list does and nothing may be
/// stored.
pub fn assemble(
    survey: &Survey,
    raw_answers: &HashMap<i64, RawValue>,
    meta: SubmitterMeta,
) -> Result<NewResponse, Vec<ValidationFailure>> {
    let mut failures = Vec::new();
    let mut answers = Vec::new();

    for question in &survey.questions {
        match validate(question, raw_answers.get(&question.id)) {
            Ok(Some(value)) => answers.push(NewAnswer {
                question_id: question.id,
                value,
            }),
            Ok(None) => {}
            Err(mut more) => failures.append(&mut more),
        }
    }

    if failures.is_empty() {
        Ok(NewResponse {
            survey_id: survey.id,
            meta,
            answers,
        })
    } else {
        Err(failures)
    }
}
