use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::budget::Budget;
use crate::error::EvaluationError;
use crate::output::{RuleKind, RuleOutput};
use crate::snapshot::SessionSnapshot;
use crate::Rule;

/// Scores the current screening from its valid answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "strategy", rename_all = "snake_case")]
#[ts(export)]
pub enum ScoringRule {
    /// Sum of every selected option's score.
    OptionSum,
    /// Sum of option scores multiplied by a per-question weight.
    WeightedOptionSum {
        #[serde(default)]
        weights: BTreeMap<Uuid, i32>,
        #[serde(default = "default_weight")]
        default_weight: i32,
    },
    /// Highest selected option score, 0 with no answers.
    MaxOptionScore,
}

fn default_weight() -> i32 {
    1
}

impl Rule for ScoringRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Scoring
    }

    fn evaluate(
        &self,
        snapshot: &SessionSnapshot,
        budget: &mut Budget,
    ) -> Result<RuleOutput, EvaluationError> {
        let screening = snapshot
            .current()
            .ok_or_else(|| budget.runtime("session has no screening to score"))?;

        let mut total: i32 = 0;
        for answer in &screening.answers {
            budget.charge()?;
            let contribution = match self {
                ScoringRule::OptionSum => answer.score,
                ScoringRule::WeightedOptionSum {
                    weights,
                    default_weight,
                } => {
                    let weight = weights
                        .get(&answer.question_id)
                        .copied()
                        .unwrap_or(*default_weight);
                    answer
                        .score
                        .checked_mul(weight)
                        .ok_or_else(|| budget.runtime("score overflow"))?
                }
                ScoringRule::MaxOptionScore => {
                    total = total.max(answer.score);
                    continue;
                }
            };
            total = total
                .checked_add(contribution)
                .ok_or_else(|| budget.runtime("score overflow"))?;
        }
        Ok(RuleOutput::Score(total))
    }
}
