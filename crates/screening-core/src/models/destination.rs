use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::triage::{CareType, FocusTypeId};

/// Where a completed session routes the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum Destination {
    Crisis,
    Home,
    ProviderList,
    ContentList,
    ResourcePacket,
    ClinicalTriage {
        care_type: CareType,
        focus_type: FocusTypeId,
        reason: String,
    },
}

impl Destination {
    pub fn is_crisis(&self) -> bool {
        matches!(self, Destination::Crisis)
    }
}
