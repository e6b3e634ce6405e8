use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::budget::Budget;
use crate::condition::Condition;
use crate::error::EvaluationError;
use crate::output::{NextStep, OrchestrationOutcome, RuleKind, RuleOutput};
use crate::snapshot::SessionSnapshot;
use crate::Rule;

/// Decides what follows the screening that was just completed.
///
/// Every strategy may also raise the crisis flag through `crisis_when`, and
/// close a finishing session as skipped through `skip_when`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "strategy", rename_all = "snake_case")]
#[ts(export)]
pub enum OrchestrationRule {
    /// Always terminal.
    Finish {
        #[serde(default)]
        crisis_when: Option<Condition>,
        #[serde(default)]
        skip_when: Option<Condition>,
    },
    /// Visit the listed screenings in order, skipping ones already taken.
    Sequence {
        screening_ids: Vec<Uuid>,
        #[serde(default)]
        crisis_when: Option<Condition>,
        #[serde(default)]
        skip_when: Option<Condition>,
    },
    /// First branch whose `after` is the current screening and whose guard
    /// holds wins. No match finishes the session.
    Branching {
        branches: Vec<Branch>,
        #[serde(default)]
        crisis_when: Option<Condition>,
        #[serde(default)]
        skip_when: Option<Condition>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Branch {
    pub after: Uuid,
    pub when: Condition,
    pub then: NextStep,
}

impl OrchestrationRule {
    fn crisis_when(&self) -> Option<&Condition> {
        match self {
            OrchestrationRule::Finish { crisis_when, .. }
            | OrchestrationRule::Sequence { crisis_when, .. }
            | OrchestrationRule::Branching { crisis_when, .. } => crisis_when.as_ref(),
        }
    }

    fn skip_when(&self) -> Option<&Condition> {
        match self {
            OrchestrationRule::Finish { skip_when, .. }
            | OrchestrationRule::Sequence { skip_when, .. }
            | OrchestrationRule::Branching { skip_when, .. } => skip_when.as_ref(),
        }
    }

    fn conditions(&self) -> impl Iterator<Item = &Condition> {
        let guards: Vec<&Condition> = match self {
            OrchestrationRule::Branching { branches, .. } => branches.iter().map(|b| &b.when).collect(),
            _ => Vec::new(),
        };
        guards.into_iter().chain(self.crisis_when()).chain(self.skip_when())
    }

    fn next_step(
        &self,
        snapshot: &SessionSnapshot,
        budget: &mut Budget,
    ) -> Result<NextStep, EvaluationError> {
        match self {
            OrchestrationRule::Finish { .. } => Ok(NextStep::Finish),
            OrchestrationRule::Sequence { screening_ids, .. } => {
                for screening_id in screening_ids {
                    budget.charge()?;
                    if !snapshot.has_visited(*screening_id) {
                        return Ok(NextStep::Screening {
                            screening_id: *screening_id,
                        });
                    }
                }
                Ok(NextStep::Finish)
            }
            OrchestrationRule::Branching { branches, .. } => {
                let current = snapshot
                    .current()
                    .ok_or_else(|| budget.runtime("session has no current screening"))?;
                for branch in branches.iter().filter(|b| b.after == current.screening_id) {
                    if branch.when.evaluate(snapshot, budget)? {
                        return Ok(branch.then.clone());
                    }
                }
                Ok(NextStep::Finish)
            }
        }
    }
}

impl Rule for OrchestrationRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Orchestration
    }

    fn validate(&self) -> Result<(), String> {
        if let OrchestrationRule::Sequence { screening_ids, .. } = self
            && screening_ids.is_empty()
        {
            return Err("sequence must name at least one screening".to_string());
        }
        self.conditions().try_for_each(Condition::check_size)
    }

    fn evaluate(
        &self,
        snapshot: &SessionSnapshot,
        budget: &mut Budget,
    ) -> Result<RuleOutput, EvaluationError> {
        let next = self.next_step(snapshot, budget)?;
        let crisis_indicated = match self.crisis_when() {
            Some(condition) => condition.evaluate(snapshot, budget)?,
            None => false,
        };
        let skipped = match (&next, self.skip_when()) {
            (NextStep::Finish, Some(condition)) => condition.evaluate(snapshot, budget)?,
            _ => false,
        };
        Ok(RuleOutput::Orchestration(OrchestrationOutcome {
            next,
            crisis_indicated,
            skipped,
        }))
    }
}
