use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use screening_core::models::triage::{TriageGroup, TriageOverride};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_override(
    State(state): State<AppState>,
    Path(patient_order_id): Path<Uuid>,
    Json(request): Json<TriageOverride>,
) -> Result<Json<TriageGroup>, ApiError> {
    Ok(Json(state.engine.create_triage_override(patient_order_id, request)?))
}

pub async fn get_active_triage(
    State(state): State<AppState>,
    Path(patient_order_id): Path<Uuid>,
) -> Result<Json<TriageGroup>, ApiError> {
    Ok(Json(state.engine.active_triage_group(patient_order_id)?))
}

/// Every triage group of the order, oldest first, inactive ones included.
pub async fn get_triage_history(
    State(state): State<AppState>,
    Path(patient_order_id): Path<Uuid>,
) -> Json<Vec<TriageGroup>> {
    Json(state.engine.triage_history(patient_order_id))
}
