use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SupportRoleId {
    Clinician,
    Psychiatrist,
    Coach,
    CareManager,
    Chaplain,
    Peer,
    Other,
}

impl SupportRoleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportRoleId::Clinician => "clinician",
            SupportRoleId::Psychiatrist => "psychiatrist",
            SupportRoleId::Coach => "coach",
            SupportRoleId::CareManager => "care_manager",
            SupportRoleId::Chaplain => "chaplain",
            SupportRoleId::Peer => "peer",
            SupportRoleId::Other => "other",
        }
    }
}

/// A weighted role suggestion produced when a session completes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupportRoleRecommendation {
    pub id: Uuid,
    pub session_id: Uuid,
    pub support_role_id: SupportRoleId,
    pub weight: f64,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}
