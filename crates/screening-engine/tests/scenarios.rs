mod common;

use uuid::Uuid;

use screening_core::models::destination::Destination;
use screening_core::models::flow::FlowType;
use screening_core::models::recommendation::SupportRoleId;
use screening_core::models::session::{AdvanceOutcome, StartSession};
use screening_core::models::flow::FlowSelector;
use screening_core::models::triage::{CareType, FocusTypeId, TriageOverride, TriageSource};
use screening_engine::collaborators::CrisisSource;
use screening_engine::error::EngineError;
use screening_rules::RuleSpec;
use screening_rules::condition::Condition;
use screening_rules::output::NextStep;
use screening_rules::strategies::orchestration::{Branch, OrchestrationRule};
use screening_rules::strategies::results::{ResultsRule, RoleRule, TriageRule};

use common::*;

#[tokio::test]
async fn crisis_option_flags_the_session_immediately() {
    let fx = fixture();
    let detail = published_screening(
        &fx.engine,
        "PHQ9",
        vec![single_select(
            "Thoughts of self-harm?",
            vec![option("No", 0), crisis_option("Yes", 5)],
        )],
    );
    let (flow, _) = published_flow(
        &fx.engine,
        FlowType::Custom,
        detail.version.definition_id,
        FlowRules::default(),
    );
    let session = start(&fx, flow.id);
    let (q1, options) = question(&detail, 0);

    let result = fx.engine.submit_answers(session.id, choose(q1, &[options[1]])).unwrap();
    assert!(result.crisis_indicated);

    let stored = fx.engine.session(session.id).unwrap();
    assert!(stored.crisis_indicated);
    assert!(stored.crisis_indicated_at.is_some());
    assert!(!stored.completed);
    assert_eq!(fx.crisis.count(), 1);
    assert_eq!(
        fx.crisis.alerts.lock().unwrap()[0].source,
        CrisisSource::AnswerOption
    );

    // Changing the answer does not clear the flag, and routing follows it.
    let result = fx.engine.submit_answers(session.id, choose(q1, &[options[0]])).unwrap();
    assert!(result.changed);
    assert!(result.crisis_indicated);

    let outcome = fx.engine.advance(session.id).await.unwrap();
    assert_eq!(
        outcome,
        AdvanceOutcome::Completed {
            destination: Destination::Crisis
        }
    );
    assert_eq!(fx.engine.determine_destination(session.id).await.unwrap(), Destination::Crisis);
    assert_eq!(fx.crisis.count(), 1);
}

fn three_questions() -> Vec<screening_core::models::question::QuestionDraft> {
    (1..=3)
        .map(|n| {
            single_select(
                &format!("Question {n}"),
                vec![option("Not at all", 1), option("Nearly every day", 4)],
            )
        })
        .collect()
}

fn branch_rule(s1: Uuid, s2: Uuid) -> RuleSpec {
    RuleSpec::Orchestration(OrchestrationRule::Branching {
        branches: vec![Branch {
            after: s1,
            when: Condition::ScoreAtLeast {
                screening_id: None,
                value: 10,
            },
            then: NextStep::Screening { screening_id: s2 },
        }],
        crisis_when: None,
        skip_when: None,
    })
}

#[tokio::test]
async fn high_score_branches_to_the_second_screening() {
    let fx = fixture();
    let s1 = published_screening(&fx.engine, "Intake", three_questions());
    let s2 = published_screening(&fx.engine, "Followup", three_questions());
    let s1_id = s1.version.definition_id;
    let s2_id = s2.version.definition_id;
    fx.engine.register_rule("route_high", branch_rule(s1_id, s2_id)).unwrap();
    let (flow, _) = published_flow(
        &fx.engine,
        FlowType::Custom,
        s1_id,
        FlowRules {
            orchestration: "route_high",
            ..FlowRules::default()
        },
    );

    let high = start(&fx, flow.id);
    for index in 0..3 {
        let (q, options) = question(&s1, index);
        fx.engine.submit_answers(high.id, choose(q, &[options[1]])).unwrap();
    }
    let outcome = fx.engine.advance(high.id).await.unwrap();
    let AdvanceOutcome::NextScreening {
        screening_id,
        screening_order,
        session_screening_id,
    } = outcome
    else {
        panic!("expected a next screening, got {outcome:?}");
    };
    assert_eq!(screening_id, s2_id);
    assert_eq!(screening_order, 2);

    let state = fx.engine.session_state(high.id).unwrap();
    assert_eq!(state.screenings[0].screening.score, Some(12));
    assert!(state.screenings[0].screening.completed);
    assert_eq!(state.current_session_screening_id, Some(session_screening_id));

    // Answers summing to 3 finish instead.
    let low = start(&fx, flow.id);
    for index in 0..3 {
        let (q, options) = question(&s1, index);
        fx.engine.submit_answers(low.id, choose(q, &[options[0]])).unwrap();
    }
    assert_eq!(
        fx.engine.advance(low.id).await.unwrap(),
        AdvanceOutcome::Completed {
            destination: Destination::Home
        }
    );
}

#[tokio::test]
async fn in_flight_sessions_keep_their_pinned_flow_version() {
    let fx = fixture();
    let s1 = published_screening(
        &fx.engine,
        "Intake",
        vec![single_select("Q", vec![option("A", 0)])],
    );
    let s2 = published_screening(
        &fx.engine,
        "Extra",
        vec![single_select("Q", vec![option("A", 0)])],
    );
    let s1_id = s1.version.definition_id;
    let s2_id = s2.version.definition_id;
    fx.engine
        .register_rule(
            "then_extra",
            RuleSpec::Orchestration(OrchestrationRule::Sequence {
                screening_ids: vec![s2_id],
                crisis_when: None,
                skip_when: None,
            }),
        )
        .unwrap();

    let (flow, v1) = published_flow(&fx.engine, FlowType::Custom, s1_id, FlowRules::default());
    let pinned = start(&fx, flow.id);
    let (q, options) = question(&s1, 0);
    fx.engine.submit_answers(pinned.id, choose(q, &[options[0]])).unwrap();

    let v2 = fx
        .engine
        .create_flow_version(
            flow.id,
            flow_version_spec(
                s1_id,
                &FlowRules {
                    orchestration: "then_extra",
                    ..FlowRules::default()
                },
            ),
        )
        .unwrap();
    fx.engine.publish_flow_version(flow.id, v2.id).unwrap();
    assert_eq!(v2.version_number, 2);
    assert_eq!(fx.engine.active_flow_version(flow.id).unwrap().id, v2.id);

    // The pinned session still finishes under v1's rule.
    assert_eq!(fx.engine.session(pinned.id).unwrap().flow_version_id, v1.id);
    assert!(matches!(
        fx.engine.advance(pinned.id).await.unwrap(),
        AdvanceOutcome::Completed { .. }
    ));

    // A session started after the publish follows v2.
    let fresh = start(&fx, flow.id);
    assert_eq!(fresh.flow_version_id, v2.id);
    fx.engine.submit_answers(fresh.id, choose(q, &[options[0]])).unwrap();
    assert!(matches!(
        fx.engine.advance(fresh.id).await.unwrap(),
        AdvanceOutcome::NextScreening { screening_order: 2, .. }
    ));
}

#[tokio::test]
async fn override_without_reason_keeps_the_computed_group() {
    let fx = fixture();
    let patient_order_id = Uuid::new_v4();
    fx.patient_orders.insert(patient_order_id);

    let screening = published_screening(
        &fx.engine,
        "Triage",
        vec![single_select(
            "How often do you drink?",
            vec![option("Never", 0), option("Daily", 8)],
        )],
    );
    fx.engine
        .register_rule(
            "triage_results",
            RuleSpec::Results(ResultsRule {
                support_roles: vec![RoleRule {
                    when: Condition::ScoreAtLeast {
                        screening_id: None,
                        value: 5,
                    },
                    support_role_id: SupportRoleId::Psychiatrist,
                    weight: 0.8,
                }],
                triages: vec![TriageRule {
                    when: Condition::ScoreAtLeast {
                        screening_id: None,
                        value: 5,
                    },
                    focus_type_id: FocusTypeId::parse("SUD").unwrap(),
                    care_type_id: CareType::Specialty,
                    reason: "daily drinking".to_string(),
                }],
            }),
        )
        .unwrap();
    let (flow, _) = published_flow(
        &fx.engine,
        FlowType::IntegratedCare,
        screening.version.definition_id,
        FlowRules {
            results: Some("triage_results"),
            ..FlowRules::default()
        },
    );

    let session = fx
        .engine
        .start_session(StartSession {
            flow: FlowSelector::Id(flow.id),
            target_account_id: fx.patient,
            created_by_account_id: fx.staff,
            patient_order_id: Some(patient_order_id),
        })
        .unwrap();
    let (q, options) = question(&screening, 0);
    fx.engine.submit_answers(session.id, choose(q, &[options[1]])).unwrap();
    fx.engine.advance(session.id).await.unwrap();

    let computed = fx.engine.active_triage_group(patient_order_id).unwrap();
    assert_eq!(computed.source, TriageSource::Computed);
    assert_eq!(computed.care_type_id, CareType::Specialty);
    assert_eq!(computed.screening_session_id, Some(session.id));

    let err = fx
        .engine
        .create_triage_override(
            patient_order_id,
            TriageOverride {
                care_type_id: CareType::Collaborative,
                focus_type_id: FocusTypeId::parse("GENERAL").unwrap(),
                reason: "   ".to_string(),
                account_id: fx.staff,
            },
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(ref errors) if errors[0].field == "reason"));

    let still_active = fx.engine.active_triage_group(patient_order_id).unwrap();
    assert_eq!(still_active.id, computed.id);
    assert!(still_active.active);
    assert_eq!(fx.engine.triage_history(patient_order_id).len(), 1);

    let manual = fx
        .engine
        .create_triage_override(
            patient_order_id,
            TriageOverride {
                care_type_id: CareType::Collaborative,
                focus_type_id: FocusTypeId::parse("GENERAL").unwrap(),
                reason: "Patient prefers primary care".to_string(),
                account_id: fx.staff,
            },
        )
        .unwrap();
    assert_eq!(manual.source, TriageSource::Manual);
    assert_eq!(manual.override_reason.as_deref(), Some("Patient prefers primary care"));

    let history = fx.engine.triage_history(patient_order_id);
    assert_eq!(history.len(), 2);
    assert_eq!(history.iter().filter(|g| g.active).count(), 1);
    assert_eq!(fx.engine.active_triage_group(patient_order_id).unwrap().id, manual.id);
}
