use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::definition::{Definition, VersionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FlowType {
    Custom,
    /// Selected per institution when an account starts provider triage.
    ProviderTriage,
    /// Clinical triage for patient orders; completion projects a triage group.
    IntegratedCare,
    Intake,
}

impl FlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Custom => "custom",
            FlowType::ProviderTriage => "provider_triage",
            FlowType::IntegratedCare => "integrated_care",
            FlowType::Intake => "intake",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FlowAttributes {
    pub flow_type: FlowType,
    #[serde(default)]
    pub institution_id: Option<String>,
}

/// The rules and entry point pinned by a flow version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FlowVersionSpec {
    pub initial_screening_id: Uuid,
    pub orchestration_rule: String,
    #[serde(default)]
    pub results_rule: Option<String>,
    pub destination_rule: String,
    #[serde(default)]
    pub skippable: bool,
    /// Shown before a session finishes; the client confirms by advancing
    /// again with `force`.
    #[serde(default)]
    pub pre_completion_confirmation_prompt: Option<String>,
    pub created_by_account_id: Uuid,
}

pub type Flow = Definition<FlowAttributes>;
pub type FlowVersion = VersionRecord<FlowVersionSpec>;

/// Request body for creating a flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewFlow {
    pub name: String,
    pub flow_type: FlowType,
    #[serde(default)]
    pub institution_id: Option<String>,
}

/// How a caller names the flow a session should run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FlowSelector {
    Id(Uuid),
    /// Resolved through the target account's institution.
    Type(FlowType),
}
