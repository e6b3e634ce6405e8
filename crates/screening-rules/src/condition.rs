use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::budget::Budget;
use crate::error::EvaluationError;
use crate::snapshot::{ScreeningSnapshot, SessionSnapshot};

/// Largest condition tree a rule may register.
pub const MAX_CONDITION_NODES: usize = 256;

/// The bounded expression language rules use for guards.
///
/// Score comparisons name a screening explicitly or, when `screening_id`
/// is omitted, apply to the current screening. A screening that has not
/// been scored never satisfies a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "op", rename_all = "snake_case")]
#[ts(export)]
pub enum Condition {
    Always,
    ScoreAtLeast {
        #[serde(default)]
        screening_id: Option<Uuid>,
        value: i32,
    },
    ScoreBelow {
        #[serde(default)]
        screening_id: Option<Uuid>,
        value: i32,
    },
    OptionSelected {
        answer_option_id: Uuid,
    },
    CrisisIndicated,
    AccountAttributeEquals {
        key: String,
        value: String,
    },
    All {
        conditions: Vec<Condition>,
    },
    Any {
        conditions: Vec<Condition>,
    },
    Not {
        condition: Box<Condition>,
    },
}

impl Condition {
    pub fn evaluate(
        &self,
        snapshot: &SessionSnapshot,
        budget: &mut Budget,
    ) -> Result<bool, EvaluationError> {
        budget.charge()?;
        match self {
            Condition::Always => Ok(true),
            Condition::ScoreAtLeast {
                screening_id,
                value,
            } => Ok(score_of(snapshot, *screening_id).is_some_and(|score| score >= *value)),
            Condition::ScoreBelow {
                screening_id,
                value,
            } => Ok(score_of(snapshot, *screening_id).is_some_and(|score| score < *value)),
            Condition::OptionSelected { answer_option_id } => {
                for answer in snapshot.answers() {
                    budget.charge()?;
                    if answer.answer_option_id == *answer_option_id {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::CrisisIndicated => Ok(snapshot.crisis_indicated),
            Condition::AccountAttributeEquals { key, value } => Ok(snapshot
                .target_account
                .attributes
                .get(key)
                .is_some_and(|actual| actual == value)),
            Condition::All { conditions } => {
                for condition in conditions {
                    if !condition.evaluate(snapshot, budget)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Any { conditions } => {
                for condition in conditions {
                    if condition.evaluate(snapshot, budget)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Not { condition } => Ok(!condition.evaluate(snapshot, budget)?),
        }
    }

    /// Number of nodes in the expression tree.
    pub fn size(&self) -> usize {
        match self {
            Condition::All { conditions } | Condition::Any { conditions } => {
                1 + conditions.iter().map(Condition::size).sum::<usize>()
            }
            Condition::Not { condition } => 1 + condition.size(),
            _ => 1,
        }
    }

    /// Reject trees larger than [`MAX_CONDITION_NODES`].
    pub fn check_size(&self) -> Result<(), String> {
        let size = self.size();
        if size > MAX_CONDITION_NODES {
            return Err(format!(
                "condition has {size} nodes; at most {MAX_CONDITION_NODES} are allowed"
            ));
        }
        Ok(())
    }
}

fn score_of(snapshot: &SessionSnapshot, screening_id: Option<Uuid>) -> Option<i32> {
    let screening: Option<&ScreeningSnapshot> = match screening_id {
        Some(id) => snapshot.latest(id),
        None => snapshot.current(),
    };
    screening.and_then(|s| s.score)
}
