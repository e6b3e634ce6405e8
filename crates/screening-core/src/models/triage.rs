use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

/// Care types in ascending order of acuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CareType {
    Unspecified,
    Subclinical,
    Collaborative,
    Specialty,
}

impl CareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CareType::Unspecified => "unspecified",
            CareType::Subclinical => "subclinical",
            CareType::Collaborative => "collaborative",
            CareType::Specialty => "specialty",
        }
    }

    /// Highest-acuity care type in `types`, or `Unspecified` when empty.
    pub fn most_acute(types: impl IntoIterator<Item = CareType>) -> CareType {
        types.into_iter().max().unwrap_or(CareType::Unspecified)
    }
}

/// Catalog identifier of a clinical focus (e.g. `GENERAL`, `SUD`).
///
/// Normalised to upper case; only ASCII letters, digits and `_` are allowed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export)]
pub struct FocusTypeId(String);

impl FocusTypeId {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= 64
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(CoreError::InvalidFocusType(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FocusTypeId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FocusTypeId> for String {
    fn from(value: FocusTypeId) -> Self {
        value.0
    }
}

impl fmt::Display for FocusTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TriageSource {
    /// Projected from a completed session.
    Computed,
    /// Entered by staff with an override reason.
    Manual,
}

/// One (focus type, care type) categorization within a triage group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TriageEntry {
    pub focus_type_id: FocusTypeId,
    pub care_type_id: CareType,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TriageGroup {
    pub id: Uuid,
    pub patient_order_id: Uuid,
    pub source: TriageSource,
    /// Overall care type for the group.
    pub care_type_id: CareType,
    pub triages: Vec<TriageEntry>,
    /// Required when `source` is `Manual`.
    pub override_reason: Option<String>,
    pub screening_session_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub active: bool,
    pub deactivated_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

/// Staff request to replace the active triage of a patient order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TriageOverride {
    pub care_type_id: CareType,
    pub focus_type_id: FocusTypeId,
    #[serde(default)]
    pub reason: String,
    pub account_id: Uuid,
}
