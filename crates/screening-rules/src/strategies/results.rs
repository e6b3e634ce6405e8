use serde::{Deserialize, Serialize};
use ts_rs::TS;

use screening_core::models::recommendation::SupportRoleId;
use screening_core::models::triage::{CareType, FocusTypeId, TriageEntry};

use crate::budget::Budget;
use crate::condition::Condition;
use crate::error::EvaluationError;
use crate::output::{ResultsOutcome, RoleWeight, RuleKind, RuleOutput};
use crate::snapshot::SessionSnapshot;
use crate::Rule;

/// Turns a finished session into recommendation and triage inputs.
///
/// Every matching rule contributes; ordering and de-duplication are left
/// to the projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResultsRule {
    #[serde(default)]
    pub support_roles: Vec<RoleRule>,
    #[serde(default)]
    pub triages: Vec<TriageRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoleRule {
    pub when: Condition,
    pub support_role_id: SupportRoleId,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TriageRule {
    pub when: Condition,
    pub focus_type_id: FocusTypeId,
    pub care_type_id: CareType,
    pub reason: String,
}

impl TriageRule {
    pub fn entry(&self) -> TriageEntry {
        TriageEntry {
            focus_type_id: self.focus_type_id.clone(),
            care_type_id: self.care_type_id,
            reason: self.reason.clone(),
        }
    }
}

fn check_weight(weight: f64) -> Result<(), String> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight {weight} must be a finite, non-negative number"));
    }
    Ok(())
}

impl Rule for ResultsRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Results
    }

    fn validate(&self) -> Result<(), String> {
        for role in &self.support_roles {
            check_weight(role.weight)?;
            role.when.check_size()?;
        }
        self.triages.iter().try_for_each(|triage| triage.when.check_size())
    }

    fn evaluate(
        &self,
        snapshot: &SessionSnapshot,
        budget: &mut Budget,
    ) -> Result<RuleOutput, EvaluationError> {
        let mut support_roles = Vec::new();
        for role in &self.support_roles {
            if role.when.evaluate(snapshot, budget)? {
                check_weight(role.weight).map_err(|message| budget.shape(message))?;
                support_roles.push(RoleWeight {
                    support_role_id: role.support_role_id,
                    weight: role.weight,
                });
            }
        }

        let mut triages = Vec::new();
        for triage in &self.triages {
            if triage.when.evaluate(snapshot, budget)? {
                triages.push(triage.entry());
            }
        }

        let care_type = CareType::most_acute(triages.iter().map(|t| t.care_type_id));
        Ok(RuleOutput::Results(ResultsOutcome {
            support_roles,
            triages,
            care_type,
        }))
    }
}
