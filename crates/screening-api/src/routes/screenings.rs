use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use screening_core::models::screening::{
    NewScreening, Screening, ScreeningVersion, ScreeningVersionDetail, ScreeningVersionDraft,
};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn create_screening(
    State(state): State<AppState>,
    Json(new): Json<NewScreening>,
) -> Result<Json<Screening>, ApiError> {
    Ok(Json(state.engine.create_screening(new)?))
}

pub async fn get_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Screening>, ApiError> {
    Ok(Json(state.engine.screening(id)?))
}

pub async fn create_screening_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<ScreeningVersionDraft>,
) -> Result<Json<ScreeningVersionDetail>, ApiError> {
    Ok(Json(state.engine.create_screening_version(id, draft)?))
}

pub async fn publish_screening_version(
    State(state): State<AppState>,
    Path((id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ScreeningVersion>, ApiError> {
    Ok(Json(state.engine.publish_screening_version(id, version_id)?))
}

/// The active version with its questions, as a respondent would see it.
pub async fn get_active_screening_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScreeningVersionDetail>, ApiError> {
    let version = state.engine.active_screening_version(id)?;
    Ok(Json(state.engine.screening_version_detail(version.id)?))
}

pub async fn get_screening_version(
    State(state): State<AppState>,
    Path(version_id): Path<Uuid>,
) -> Result<Json<ScreeningVersionDetail>, ApiError> {
    Ok(Json(state.engine.screening_version_detail(version_id)?))
}
