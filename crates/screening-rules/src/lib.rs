//! screening-rules
//!
//! Scoring, orchestration, results and destination rules. Pure data and
//! pure functions: a rule is a closed, serializable strategy resolved from a
//! [`RuleRegistry`] by identifier and evaluated against a
//! [`SessionSnapshot`] under an [`EvaluationLimits`] budget.

pub mod budget;
pub mod condition;
pub mod error;
pub mod output;
pub mod snapshot;
pub mod strategies;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use screening_core::models::destination::Destination;

use budget::{Budget, EvaluationLimits};
use error::{EvaluationError, RegistryError};
use output::{RuleKind, RuleOutput};
use snapshot::SessionSnapshot;
use strategies::destination::DestinationRule;
use strategies::orchestration::OrchestrationRule;
use strategies::results::ResultsRule;
use strategies::scoring::ScoringRule;

/// Behaviour shared by every rule strategy.
pub trait Rule: Send + Sync {
    /// The slot this rule can fill.
    fn kind(&self) -> RuleKind;

    /// Static checks run once at registration.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Evaluate against a snapshot, charging `budget` as work is done.
    fn evaluate(
        &self,
        snapshot: &SessionSnapshot,
        budget: &mut Budget,
    ) -> Result<RuleOutput, EvaluationError>;
}

/// A registered rule definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "spec", rename_all = "snake_case")]
#[ts(export)]
pub enum RuleSpec {
    Scoring(ScoringRule),
    Orchestration(OrchestrationRule),
    Results(ResultsRule),
    Destination(DestinationRule),
}

impl RuleSpec {
    pub fn as_rule(&self) -> &dyn Rule {
        match self {
            RuleSpec::Scoring(rule) => rule,
            RuleSpec::Orchestration(rule) => rule,
            RuleSpec::Results(rule) => rule,
            RuleSpec::Destination(rule) => rule,
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.as_rule().kind()
    }
}

/// Built-in rules available in every registry.
pub fn builtin_rules() -> Vec<(&'static str, RuleSpec)> {
    vec![
        ("option_sum", RuleSpec::Scoring(ScoringRule::OptionSum)),
        (
            "max_option_score",
            RuleSpec::Scoring(ScoringRule::MaxOptionScore),
        ),
        (
            "finish",
            RuleSpec::Orchestration(OrchestrationRule::Finish {
                crisis_when: None,
                skip_when: None,
            }),
        ),
        (
            "destination_home",
            RuleSpec::Destination(DestinationRule::Fixed {
                destination: Destination::Home,
            }),
        ),
        (
            "destination_crisis",
            RuleSpec::Destination(DestinationRule::Fixed {
                destination: Destination::Crisis,
            }),
        ),
    ]
}

/// Evaluate one rule definition. Deterministic for identical input.
pub fn evaluate(
    rule_id: &str,
    spec: &RuleSpec,
    snapshot: &SessionSnapshot,
    limits: EvaluationLimits,
) -> Result<RuleOutput, EvaluationError> {
    let mut budget = Budget::new(rule_id, limits);
    let output = spec.as_rule().evaluate(snapshot, &mut budget)?;
    if output.kind() != spec.kind() {
        return Err(EvaluationError::shape(
            rule_id,
            format!("{} rule produced a {} result", spec.kind(), output.kind()),
        ));
    }
    Ok(output)
}

/// Rules by identifier. Registered definitions never change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleRegistry {
    rules: BTreeMap<String, RuleSpec>,
}

impl RuleRegistry {
    pub fn with_builtins() -> Self {
        let rules = builtin_rules()
            .into_iter()
            .map(|(id, spec)| (id.to_string(), spec))
            .collect();
        Self { rules }
    }

    /// Register `spec` under `rule_id`.
    ///
    /// Returns `Ok(false)` when the identical definition is already present.
    pub fn register(&mut self, rule_id: &str, spec: RuleSpec) -> Result<bool, RegistryError> {
        let valid_id = !rule_id.is_empty()
            && rule_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid_id {
            return Err(RegistryError::InvalidId(rule_id.to_string()));
        }

        spec.as_rule()
            .validate()
            .map_err(|message| RegistryError::Invalid {
                rule_id: rule_id.to_string(),
                message,
            })?;

        match self.rules.get(rule_id) {
            Some(existing) if *existing == spec => Ok(false),
            Some(_) => Err(RegistryError::Conflict(rule_id.to_string())),
            None => {
                self.rules.insert(rule_id.to_string(), spec);
                Ok(true)
            }
        }
    }

    pub fn get(&self, rule_id: &str) -> Option<&RuleSpec> {
        self.rules.get(rule_id)
    }

    pub fn kind_of(&self, rule_id: &str) -> Option<RuleKind> {
        self.rules.get(rule_id).map(RuleSpec::kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.rules.iter().map(|(id, spec)| (id.as_str(), spec))
    }

    pub fn evaluate(
        &self,
        rule_id: &str,
        snapshot: &SessionSnapshot,
        limits: EvaluationLimits,
    ) -> Result<RuleOutput, EvaluationError> {
        let spec = self
            .rules
            .get(rule_id)
            .ok_or_else(|| EvaluationError::runtime(rule_id, "unknown rule"))?;
        evaluate(rule_id, spec, snapshot, limits)
    }
}
