#![allow(dead_code)]

use std::collections::BTreeMap;

use uuid::Uuid;

use screening_rules::snapshot::{AccountSnapshot, AnswerSnapshot, ScreeningSnapshot, SessionSnapshot};

pub fn answer(question_id: Uuid, score: i32) -> AnswerSnapshot {
    AnswerSnapshot {
        question_id,
        answer_option_id: Uuid::new_v4(),
        score,
        indicates_crisis: false,
        text: None,
    }
}

pub fn screening(screening_id: Uuid, order: u32, score: Option<i32>, answers: Vec<AnswerSnapshot>) -> ScreeningSnapshot {
    ScreeningSnapshot {
        session_screening_id: Uuid::new_v4(),
        screening_id,
        screening_version_id: Uuid::new_v4(),
        screening_order: order,
        completed: score.is_some(),
        score,
        answers,
    }
}

pub fn snapshot(screenings: Vec<ScreeningSnapshot>) -> SessionSnapshot {
    SessionSnapshot {
        session_id: Uuid::new_v4(),
        flow_version_id: Uuid::new_v4(),
        target_account: AccountSnapshot {
            account_id: Uuid::new_v4(),
            institution_id: Some("acme".to_string()),
            attributes: BTreeMap::from([("age_group".to_string(), "adult".to_string())]),
        },
        crisis_indicated: false,
        screenings,
    }
}
