use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Read-only view of a session handed to a rule.
///
/// Screenings are ordered by `screening_order`; the last entry is the
/// screening currently being answered or just completed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub flow_version_id: Uuid,
    pub target_account: AccountSnapshot,
    pub crisis_indicated: bool,
    pub screenings: Vec<ScreeningSnapshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AccountSnapshot {
    pub account_id: Uuid,
    pub institution_id: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScreeningSnapshot {
    pub session_screening_id: Uuid,
    pub screening_id: Uuid,
    pub screening_version_id: Uuid,
    pub screening_order: u32,
    pub completed: bool,
    pub score: Option<i32>,
    /// Valid answers only, grouped by question in display order.
    pub answers: Vec<AnswerSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnswerSnapshot {
    pub question_id: Uuid,
    pub answer_option_id: Uuid,
    pub score: i32,
    pub indicates_crisis: bool,
    pub text: Option<String>,
}

impl SessionSnapshot {
    pub fn current(&self) -> Option<&ScreeningSnapshot> {
        self.screenings.iter().max_by_key(|s| s.screening_order)
    }

    /// Most recent traversal of `screening_id`.
    pub fn latest(&self, screening_id: Uuid) -> Option<&ScreeningSnapshot> {
        self.screenings
            .iter()
            .filter(|s| s.screening_id == screening_id)
            .max_by_key(|s| s.screening_order)
    }

    pub fn has_visited(&self, screening_id: Uuid) -> bool {
        self.screenings.iter().any(|s| s.screening_id == screening_id)
    }

    pub fn answers(&self) -> impl Iterator<Item = &AnswerSnapshot> {
        self.screenings.iter().flat_map(|s| s.answers.iter())
    }
}
