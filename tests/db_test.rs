mod common;

use common::create_test_db;
use surveyor::db::SurveyDeletion;
use surveyor::survey::{
    AnswerValue, NewAnswer, NewResponse, QuestionDraft, QuestionType, SubmitterMeta,
};

fn draft(
    text: &str,
    question_type: QuestionType,
    is_required: bool,
    order_index: i64,
    options: &[&str],
) -> QuestionDraft {
    QuestionDraft {
        question_text: text.to_string(),
        question_type,
        is_required,
        order_index,
        options: options.iter().map(|s| s.to_string()).collect(),
    }
}

fn sample_drafts() -> Vec<QuestionDraft> {
    vec![
        draft("How was it?", QuestionType::Text, true, 0, &[]),
        draft(
            "Favourite colour?",
            QuestionType::SingleChoice,
            true,
            1,
            &["red", "green", "blue"],
        ),
        draft("Rate us", QuestionType::Rating, false, 2, &[]),
    ]
}

async fn create_sample_survey(db: &surveyor::db::Db) -> i64 {
    db.create_survey("Feedback", Some("How did we do?"), true, None, None, &sample_drafts())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_db_connection() {
    let db = create_test_db().await;
    assert!(!db.survey_exists(1).await.unwrap());
}

#[tokio::test]
async fn test_survey_roundtrip() {
    let db = create_test_db().await;

    let survey_id = create_sample_survey(&db).await;
    assert!(survey_id > 0);

    let surveys = db.surveys().await.unwrap();
    assert_eq!(surveys.len(), 1);
    assert_eq!(surveys[0].title, "Feedback");
    assert_eq!(surveys[0].question_count, 3);
    assert_eq!(surveys[0].response_count, 0);

    let survey = db.get_survey(survey_id).await.unwrap().unwrap();
    assert_eq!(survey.title, "Feedback");
    assert_eq!(survey.description.as_deref(), Some("How did we do?"));
    assert!(survey.is_active);
    assert_eq!(survey.questions.len(), 3);

    // Questions come back in display order with their typed definitions.
    assert_eq!(survey.questions[0].question_type, QuestionType::Text);
    assert_eq!(survey.questions[1].question_type, QuestionType::SingleChoice);
    assert_eq!(
        survey.questions[1].options,
        vec!["red".to_string(), "green".to_string(), "blue".to_string()]
    );
    assert_eq!(survey.questions[2].question_type, QuestionType::Rating);
    assert!(survey.questions[2].options.is_empty());
    assert_eq!(
        survey
            .questions
            .iter()
            .map(|q| q.order_index)
            .collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn test_get_missing_survey() {
    let db = create_test_db().await;
    assert!(db.get_survey(42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_survey() {
    let db = create_test_db().await;
    let survey_id = create_sample_survey(&db).await;

    let updated = db
        .update_survey(survey_id, "Renamed", None, false, None, None)
        .await
        .unwrap();
    assert!(updated);

    let survey = db.get_survey(survey_id).await.unwrap().unwrap();
    assert_eq!(survey.title, "Renamed");
    assert!(survey.description.is_none());
    assert!(!survey.is_active);

    // Updating a missing survey reports not-found, not an error.
    let updated = db
        .update_survey(9999, "Ghost", None, true, None, None)
        .await
        .unwrap();
    assert!(!updated);
}

#[tokio::test]
async fn test_add_question_appends_after_existing() {
    let db = create_test_db().await;
    let survey_id = create_sample_survey(&db).await;

    let next = db.next_order_index(survey_id).await.unwrap();
    assert_eq!(next, 3);

    let question_id = db
        .add_question(
            survey_id,
            &draft("Anything else?", QuestionType::Text, false, next, &[]),
        )
        .await
        .unwrap();

    let question = db.get_question(question_id).await.unwrap().unwrap();
    assert_eq!(question.survey_id, survey_id);
    assert_eq!(question.order_index, 3);
    assert_eq!(db.questions_count(survey_id).await.unwrap(), 4);
}

#[tokio::test]
async fn test_duplicate_order_index_rejected() {
    let db = create_test_db().await;
    let survey_id = create_sample_survey(&db).await;

    // Slot 0 is already taken; the unique index refuses a second occupant.
    let result = db
        .add_question(
            survey_id,
            &draft("Duplicate slot", QuestionType::Text, false, 0, &[]),
        )
        .await;
    assert!(result.is_err());
    assert_eq!(db.questions_count(survey_id).await.unwrap(), 3);
}

#[tokio::test]
async fn test_response_roundtrip() {
    let db = create_test_db().await;
    let survey_id = create_sample_survey(&db).await;
    let survey = db.get_survey(survey_id).await.unwrap().unwrap();

    let new_response = NewResponse {
        survey_id,
        meta: SubmitterMeta {
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: Some("integration-test".to_string()),
        },
        answers: vec![
            NewAnswer {
                question_id: survey.questions[0].id,
                value: AnswerValue::Text("great".to_string()),
            },
            NewAnswer {
                question_id: survey.questions[1].id,
                value: AnswerValue::Selection("green".to_string()),
            },
            NewAnswer {
                question_id: survey.questions[2].id,
                value: AnswerValue::Rating(5),
            },
        ],
    };

    let response_id = db.create_response(&new_response).await.unwrap();
    assert!(response_id > 0);
    assert_eq!(db.responses_count(survey_id).await.unwrap(), 1);

    let responses = db.responses(&survey).await.unwrap();
    assert_eq!(responses.len(), 1);
    let stored = &responses[0];
    assert_eq!(stored.id, response_id);
    assert_eq!(stored.ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(stored.user_agent.as_deref(), Some("integration-test"));
    assert_eq!(
        stored.answers[&survey.questions[0].id],
        AnswerValue::Text("great".to_string())
    );
    assert_eq!(
        stored.answers[&survey.questions[1].id],
        AnswerValue::Selection("green".to_string())
    );
    assert_eq!(
        stored.answers[&survey.questions[2].id],
        AnswerValue::Rating(5)
    );

    let fetched = db.get_response(&survey, response_id).await.unwrap().unwrap();
    assert_eq!(fetched, *stored);
}

#[tokio::test]
async fn test_multi_choice_answer_roundtrip() {
    let db = create_test_db().await;
    let survey_id = db
        .create_survey(
            "Toppings",
            None,
            true,
            None,
            None,
            &[draft(
                "Pick toppings",
                QuestionType::MultiChoice,
                true,
                0,
                &["cheese", "olives", "basil"],
            )],
        )
        .await
        .unwrap();
    let survey = db.get_survey(survey_id).await.unwrap().unwrap();

    let new_response = NewResponse {
        survey_id,
        meta: SubmitterMeta::default(),
        answers: vec![NewAnswer {
            question_id: survey.questions[0].id,
            value: AnswerValue::Selections(vec!["cheese".to_string(), "basil".to_string()]),
        }],
    };
    db.create_response(&new_response).await.unwrap();

    let responses = db.responses(&survey).await.unwrap();
    assert_eq!(
        responses[0].answers[&survey.questions[0].id],
        AnswerValue::Selections(vec!["cheese".to_string(), "basil".to_string()])
    );
}

#[tokio::test]
async fn test_response_insert_is_atomic() {
    let db = create_test_db().await;
    let survey_id = create_sample_survey(&db).await;
    let survey = db.get_survey(survey_id).await.unwrap().unwrap();

    // The second answer references a question that does not exist; the
    // foreign key fails and the whole bundle must roll back.
    let new_response = NewResponse {
        survey_id,
        meta: SubmitterMeta::default(),
        answers: vec![
            NewAnswer {
                question_id: survey.questions[0].id,
                value: AnswerValue::Text("about to vanish".to_string()),
            },
            NewAnswer {
                question_id: 9999,
                value: AnswerValue::Rating(3),
            },
        ],
    };

    let result = db.create_response(&new_response).await;
    assert!(result.is_err());
    assert_eq!(db.responses_count(survey_id).await.unwrap(), 0);
    assert!(db.responses(&survey).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_question_immutability_guards() {
    let db = create_test_db().await;
    let survey_id = create_sample_survey(&db).await;
    let survey = db.get_survey(survey_id).await.unwrap().unwrap();
    let question_id = survey.questions[0].id;

    assert!(!db.survey_has_responses(survey_id).await.unwrap());
    assert!(!db.question_has_answers(question_id).await.unwrap());

    db.create_response(&NewResponse {
        survey_id,
        meta: SubmitterMeta::default(),
        answers: vec![
            NewAnswer {
                question_id,
                value: AnswerValue::Text("locked in".to_string()),
            },
            NewAnswer {
                question_id: survey.questions[1].id,
                value: AnswerValue::Selection("red".to_string()),
            },
        ],
    })
    .await
    .unwrap();

    assert!(db.survey_has_responses(survey_id).await.unwrap());
    assert!(db.question_has_answers(question_id).await.unwrap());
    // The skipped optional rating has no answers.
    assert!(!db
        .question_has_answers(survey.questions[2].id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_delete_survey_without_responses_removes_it() {
    let db = create_test_db().await;
    let survey_id = create_sample_survey(&db).await;

    let outcome = db.delete_survey(survey_id).await.unwrap();
    assert_eq!(outcome, SurveyDeletion::Deleted);
    assert!(db.get_survey(survey_id).await.unwrap().is_none());
    assert!(db.surveys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_survey_with_responses_deactivates() {
    let db = create_test_db().await;
    let survey_id = create_sample_survey(&db).await;
    let survey = db.get_survey(survey_id).await.unwrap().unwrap();

    db.create_response(&NewResponse {
        survey_id,
        meta: SubmitterMeta::default(),
        answers: vec![
            NewAnswer {
                question_id: survey.questions[0].id,
                value: AnswerValue::Text("keep me".to_string()),
            },
            NewAnswer {
                question_id: survey.questions[1].id,
                value: AnswerValue::Selection("blue".to_string()),
            },
        ],
    })
    .await
    .unwrap();

    let outcome = db.delete_survey(survey_id).await.unwrap();
    assert_eq!(outcome, SurveyDeletion::Deactivated);

    // Still present, no longer accepting submissions, responses intact.
    let survey = db.get_survey(survey_id).await.unwrap().unwrap();
    assert!(!survey.is_active);
    assert_eq!(db.responses_count(survey_id).await.unwrap(), 1);
}
