mod common;

use std::collections::BTreeMap;

use uuid::Uuid;

use screening_rules::budget::EvaluationLimits;
use screening_rules::error::EvaluationErrorKind;
use screening_rules::output::RuleOutput;
use screening_rules::strategies::scoring::ScoringRule;
use screening_rules::{RuleSpec, evaluate};

use common::{answer, screening, snapshot};

fn score(rule: ScoringRule, snap: &screening_rules::snapshot::SessionSnapshot) -> i32 {
    evaluate("test_scoring", &RuleSpec::Scoring(rule), snap, EvaluationLimits::default())
        .and_then(|out| out.into_score("test_scoring"))
        .expect("scoring should succeed")
}

#[test]
fn option_sum_adds_current_screening_only() {
    let q1 = Uuid::new_v4();
    let q2 = Uuid::new_v4();
    let earlier = screening(Uuid::new_v4(), 1, Some(40), vec![answer(q1, 40)]);
    let current = screening(Uuid::new_v4(), 2, None, vec![answer(q1, 3), answer(q2, 4)]);
    let snap = snapshot(vec![earlier, current]);

    assert_eq!(score(ScoringRule::OptionSum, &snap), 7);
}

#[test]
fn weighted_sum_uses_default_for_unlisted_questions() {
    let q1 = Uuid::new_v4();
    let q2 = Uuid::new_v4();
    let snap = snapshot(vec![screening(
        Uuid::new_v4(),
        1,
        None,
        vec![answer(q1, 2), answer(q2, 5)],
    )]);
    let rule = ScoringRule::WeightedOptionSum {
        weights: BTreeMap::from([(q1, 3)]),
        default_weight: 1,
    };

    assert_eq!(score(rule, &snap), 2 * 3 + 5);
}

#[test]
fn max_option_score_is_zero_without_answers() {
    let snap = snapshot(vec![screening(Uuid::new_v4(), 1, None, vec![])]);
    assert_eq!(score(ScoringRule::MaxOptionScore, &snap), 0);

    let q = Uuid::new_v4();
    let snap = snapshot(vec![screening(
        Uuid::new_v4(),
        1,
        None,
        vec![answer(q, 1), answer(q, 9), answer(q, 4)],
    )]);
    assert_eq!(score(ScoringRule::MaxOptionScore, &snap), 9);
}

#[test]
fn overflow_is_a_runtime_error() {
    let q = Uuid::new_v4();
    let snap = snapshot(vec![screening(
        Uuid::new_v4(),
        1,
        None,
        vec![answer(q, i32::MAX), answer(q, 1)],
    )]);

    let err = evaluate(
        "overflowing",
        &RuleSpec::Scoring(ScoringRule::OptionSum),
        &snap,
        EvaluationLimits::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind, EvaluationErrorKind::RuntimeError);
    assert_eq!(err.rule_id, "overflowing");
}

#[test]
fn scoring_an_empty_session_fails() {
    let snap = snapshot(vec![]);
    let err = evaluate(
        "option_sum",
        &RuleSpec::Scoring(ScoringRule::OptionSum),
        &snap,
        EvaluationLimits::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind, EvaluationErrorKind::RuntimeError);
}

#[test]
fn scoring_output_is_not_a_destination() {
    let snap = snapshot(vec![screening(Uuid::new_v4(), 1, None, vec![])]);
    let out = evaluate(
        "option_sum",
        &RuleSpec::Scoring(ScoringRule::OptionSum),
        &snap,
        EvaluationLimits::default(),
    )
    .unwrap();
    assert_eq!(out, RuleOutput::Score(0));

    let err = out.into_destination("option_sum").unwrap_err();
    assert_eq!(err.kind, EvaluationErrorKind::InvalidResultShape);
}
