use std::collections::BTreeMap;

use uuid::Uuid;

use screening_core::models::recommendation::{SupportRoleId, SupportRoleRecommendation};
use screening_core::models::session::Session;
use screening_core::models::triage::{TriageEntry, TriageGroup, TriageOverride, TriageSource};
use screening_rules::output::{ResultsOutcome, RoleWeight};

use crate::ScreeningEngine;
use crate::error::EngineError;

/// Ordered recommendation rows for a completed session.
///
/// A role suggested more than once keeps its highest weight. Rows are
/// ordered by weight descending, then role id.
pub fn project_recommendations(
    session_id: Uuid,
    roles: &[RoleWeight],
    now: jiff::Timestamp,
) -> Vec<SupportRoleRecommendation> {
    let mut best: BTreeMap<SupportRoleId, f64> = BTreeMap::new();
    for role in roles {
        best.entry(role.support_role_id)
            .and_modify(|weight| *weight = weight.max(role.weight))
            .or_insert(role.weight);
    }

    let mut recommendations: Vec<_> = best
        .into_iter()
        .map(|(support_role_id, weight)| SupportRoleRecommendation {
            id: Uuid::new_v4(),
            session_id,
            support_role_id,
            weight,
            created_at: now,
            updated_at: now,
        })
        .collect();
    recommendations.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.support_role_id.as_str().cmp(b.support_role_id.as_str()))
    });
    recommendations
}

/// Candidate computed triage group for a session with a patient order.
///
/// Returns `None` when the session has no patient order or the results
/// produced no triage rows.
pub fn computed_triage_group(
    session: &Session,
    results: &ResultsOutcome,
    now: jiff::Timestamp,
) -> Option<TriageGroup> {
    let patient_order_id = session.patient_order_id?;
    if results.triages.is_empty() {
        return None;
    }
    Some(TriageGroup {
        id: Uuid::new_v4(),
        patient_order_id,
        source: TriageSource::Computed,
        care_type_id: results.care_type,
        triages: results.triages.clone(),
        override_reason: None,
        screening_session_id: Some(session.id),
        account_id: Some(session.created_by_account_id),
        active: false,
        deactivated_at: None,
        created_at: now,
        updated_at: now,
    })
}

impl ScreeningEngine {
    /// Replace the active triage of a patient order with a staff decision.
    pub fn create_triage_override(
        &self,
        patient_order_id: Uuid,
        request: TriageOverride,
    ) -> Result<TriageGroup, EngineError> {
        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(EngineError::validation(
                "reason",
                "A reason is required when overriding triage.",
            ));
        }

        let _guard = self.patient_order_locks.try_acquire(patient_order_id)?;
        if !self
            .collaborators
            .patient_orders
            .patient_order_exists(patient_order_id)
        {
            return Err(EngineError::not_found("patient order", patient_order_id));
        }
        let now = jiff::Timestamp::now();
        let group = TriageGroup {
            id: Uuid::new_v4(),
            patient_order_id,
            source: TriageSource::Manual,
            care_type_id: request.care_type_id,
            triages: vec![TriageEntry {
                focus_type_id: request.focus_type_id,
                care_type_id: request.care_type_id,
                reason: reason.to_string(),
            }],
            override_reason: Some(reason.to_string()),
            screening_session_id: None,
            account_id: Some(request.account_id),
            active: false,
            deactivated_at: None,
            created_at: now,
            updated_at: now,
        };
        let group = self
            .store
            .transact(|tables| Ok::<_, EngineError>(tables.activate_triage_group(group)))?;

        tracing::info!(
            patient_order_id = %patient_order_id,
            triage_group_id = %group.id,
            care_type = group.care_type_id.as_str(),
            account_id = %request.account_id,
            "triage override activated"
        );
        Ok(group)
    }

    pub fn active_triage_group(&self, patient_order_id: Uuid) -> Result<TriageGroup, EngineError> {
        self.store
            .read(|tables| tables.active_triage_group(patient_order_id).cloned())
            .ok_or_else(|| EngineError::not_found("active triage group", patient_order_id))
    }

    /// Every triage group of the patient order, oldest first.
    pub fn triage_history(&self, patient_order_id: Uuid) -> Vec<TriageGroup> {
        self.store.read(|tables| {
            tables
                .triage_groups_for(patient_order_id)
                .into_iter()
                .cloned()
                .collect()
        })
    }
}
