use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use screening_core::models::flow::{Flow, FlowVersion, FlowVersionSpec, NewFlow};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_flow(
    State(state): State<AppState>,
    Json(new): Json<NewFlow>,
) -> Result<Json<Flow>, ApiError> {
    Ok(Json(state.engine.create_flow(new)?))
}

pub async fn get_flow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flow>, ApiError> {
    Ok(Json(state.engine.flow(id)?))
}

pub async fn create_flow_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(spec): Json<FlowVersionSpec>,
) -> Result<Json<FlowVersion>, ApiError> {
    Ok(Json(state.engine.create_flow_version(id, spec)?))
}

pub async fn list_flow_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<FlowVersion>>, ApiError> {
    Ok(Json(state.engine.flow_versions(id)?))
}

pub async fn publish_flow_version(
    State(state): State<AppState>,
    Path((id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FlowVersion>, ApiError> {
    Ok(Json(state.engine.publish_flow_version(id, version_id)?))
}

pub async fn get_active_flow_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FlowVersion>, ApiError> {
    Ok(Json(state.engine.active_flow_version(id)?))
}
