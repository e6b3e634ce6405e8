use serde::{Deserialize, Serialize};
use ts_rs::TS;

use screening_core::models::destination::Destination;

use crate::budget::Budget;
use crate::condition::Condition;
use crate::error::EvaluationError;
use crate::output::{RuleKind, RuleOutput};
use crate::snapshot::SessionSnapshot;
use crate::strategies::results::TriageRule;
use crate::Rule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "strategy", rename_all = "snake_case")]
#[ts(export)]
pub enum DestinationRule {
    Fixed {
        destination: Destination,
    },
    Conditional {
        branches: Vec<DestinationBranch>,
        otherwise: Destination,
    },
    /// First matching triage rule becomes a clinical-triage destination.
    ClinicalTriage {
        rules: Vec<TriageRule>,
        fallback: Destination,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DestinationBranch {
    pub when: Condition,
    pub destination: Destination,
}

impl Rule for DestinationRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Destination
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            DestinationRule::Fixed { .. } => Ok(()),
            DestinationRule::Conditional { branches, .. } => {
                branches.iter().try_for_each(|branch| branch.when.check_size())
            }
            DestinationRule::ClinicalTriage { rules, .. } => {
                rules.iter().try_for_each(|rule| rule.when.check_size())
            }
        }
    }

    fn evaluate(
        &self,
        snapshot: &SessionSnapshot,
        budget: &mut Budget,
    ) -> Result<RuleOutput, EvaluationError> {
        budget.charge()?;
        let destination = match self {
            DestinationRule::Fixed { destination } => destination.clone(),
            DestinationRule::Conditional {
                branches,
                otherwise,
            } => {
                let mut chosen = None;
                for branch in branches {
                    if branch.when.evaluate(snapshot, budget)? {
                        chosen = Some(branch.destination.clone());
                        break;
                    }
                }
                chosen.unwrap_or_else(|| otherwise.clone())
            }
            DestinationRule::ClinicalTriage { rules, fallback } => {
                let mut chosen = None;
                for rule in rules {
                    if rule.when.evaluate(snapshot, budget)? {
                        chosen = Some(Destination::ClinicalTriage {
                            care_type: rule.care_type_id,
                            focus_type: rule.focus_type_id.clone(),
                            reason: rule.reason.clone(),
                        });
                        break;
                    }
                }
                chosen.unwrap_or_else(|| fallback.clone())
            }
        };
        Ok(RuleOutput::Destination(destination))
    }
}
