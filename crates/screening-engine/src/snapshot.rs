use screening_core::models::session::Session;
use screening_rules::snapshot::{AccountSnapshot, AnswerSnapshot, ScreeningSnapshot, SessionSnapshot};
use screening_storage::tables::Tables;

use crate::collaborators::Account;

/// Project a session's valid answers into the view rules evaluate.
pub fn build(tables: &Tables, session: &Session, account: Option<&Account>) -> SessionSnapshot {
    let screenings = tables
        .session_screenings_for(session.id)
        .into_iter()
        .map(|ss| {
            let mut answered = tables.valid_answered_questions(ss.id);
            answered.sort_by_key(|aq| {
                tables
                    .questions
                    .get(&aq.question_id)
                    .map_or(u32::MAX, |q| q.display_order)
            });
            let answers = answered
                .into_iter()
                .flat_map(|aq| {
                    tables.answers_for(aq.id).into_iter().filter_map(move |answer| {
                        let option = tables.answer_options.get(&answer.answer_option_id)?;
                        Some(AnswerSnapshot {
                            question_id: aq.question_id,
                            answer_option_id: answer.answer_option_id,
                            score: option.score,
                            indicates_crisis: option.indicates_crisis,
                            text: answer.text.clone(),
                        })
                    })
                })
                .collect();
            ScreeningSnapshot {
                session_screening_id: ss.id,
                screening_id: ss.screening_id,
                screening_version_id: ss.screening_version_id,
                screening_order: ss.screening_order,
                completed: ss.completed,
                score: ss.score,
                answers,
            }
        })
        .collect();

    let target_account = match account {
        Some(account) => AccountSnapshot {
            account_id: account.account_id,
            institution_id: Some(account.institution_id.clone()),
            attributes: account.attributes.clone(),
        },
        None => AccountSnapshot {
            account_id: session.target_account_id,
            ..AccountSnapshot::default()
        },
    };

    SessionSnapshot {
        session_id: session.id,
        flow_version_id: session.flow_version_id,
        target_account,
        crisis_indicated: session.crisis_indicated,
        screenings,
    }
}
