use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use screening_core::models::destination::Destination;
use screening_core::models::recommendation::SupportRoleId;
use screening_core::models::triage::{CareType, TriageEntry};

use crate::error::EvaluationError;

/// The slot a rule fills in a flow or screening version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RuleKind {
    Scoring,
    Orchestration,
    Results,
    Destination,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleKind::Scoring => "scoring",
            RuleKind::Orchestration => "orchestration",
            RuleKind::Results => "results",
            RuleKind::Destination => "destination",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "step", rename_all = "snake_case")]
#[ts(export)]
pub enum NextStep {
    Screening { screening_id: Uuid },
    Finish,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrchestrationOutcome {
    pub next: NextStep,
    pub crisis_indicated: bool,
    /// Only meaningful with [`NextStep::Finish`]: close the session as
    /// skipped instead of producing results.
    #[serde(default)]
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoleWeight {
    pub support_role_id: SupportRoleId,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultsOutcome {
    pub support_roles: Vec<RoleWeight>,
    pub triages: Vec<TriageEntry>,
    /// Highest-acuity care type among `triages`.
    pub care_type: CareType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum RuleOutput {
    Score(i32),
    Orchestration(OrchestrationOutcome),
    Results(ResultsOutcome),
    Destination(Destination),
}

impl RuleOutput {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleOutput::Score(_) => RuleKind::Scoring,
            RuleOutput::Orchestration(_) => RuleKind::Orchestration,
            RuleOutput::Results(_) => RuleKind::Results,
            RuleOutput::Destination(_) => RuleKind::Destination,
        }
    }

    fn mismatch(&self, rule_id: &str, expected: RuleKind) -> EvaluationError {
        EvaluationError::shape(
            rule_id,
            format!("expected a {expected} result, got a {} result", self.kind()),
        )
    }

    pub fn into_score(self, rule_id: &str) -> Result<i32, EvaluationError> {
        match self {
            RuleOutput::Score(score) => Ok(score),
            other => Err(other.mismatch(rule_id, RuleKind::Scoring)),
        }
    }

    pub fn into_orchestration(self, rule_id: &str) -> Result<OrchestrationOutcome, EvaluationError> {
        match self {
            RuleOutput::Orchestration(outcome) => Ok(outcome),
            other => Err(other.mismatch(rule_id, RuleKind::Orchestration)),
        }
    }

    pub fn into_results(self, rule_id: &str) -> Result<ResultsOutcome, EvaluationError> {
        match self {
            RuleOutput::Results(outcome) => Ok(outcome),
            other => Err(other.mismatch(rule_id, RuleKind::Results)),
        }
    }

    pub fn into_destination(self, rule_id: &str) -> Result<Destination, EvaluationError> {
        match self {
            RuleOutput::Destination(destination) => Ok(destination),
            other => Err(other.mismatch(rule_id, RuleKind::Destination)),
        }
    }
}
