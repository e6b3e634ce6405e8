use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use uuid::Uuid;

use screening_core::models::destination::Destination;
use screening_core::models::recommendation::SupportRoleRecommendation;
use screening_core::models::session::{
    AdvanceOutcome, AdvanceRequest, AnswerSubmission, NextQuestion, Session, SessionState,
    StartSession,
};
use screening_core::models::validation::SubmissionResult;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ScreeningScore {
    session_screening_id: Uuid,
    score: i32,
}

#[derive(Serialize)]
pub struct SessionDestination {
    session_id: Uuid,
    destination: Destination,
}

pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSession>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.engine.start_session(request)?))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, ApiError> {
    Ok(Json(state.engine.session_state(id)?))
}

pub async fn submit_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(submission): Json<AnswerSubmission>,
) -> Result<Json<SubmissionResult>, ApiError> {
    Ok(Json(state.engine.submit_answers(id, submission)?))
}

pub async fn complete_screening(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScreeningScore>, ApiError> {
    let score = state.engine.complete_screening(id).await?;
    Ok(Json(ScreeningScore {
        session_screening_id: id,
        score,
    }))
}

/// The body is optional; without one the request is not forced.
pub async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<AdvanceRequest>>,
) -> Result<Json<AdvanceOutcome>, ApiError> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    Ok(Json(state.engine.advance_with(id, request).await?))
}

pub async fn get_next_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<NextQuestion>>, ApiError> {
    Ok(Json(state.engine.next_unanswered_question(id)?))
}

pub async fn skip_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.engine.skip_session(id)?))
}

pub async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionDestination>, ApiError> {
    let destination = state.engine.determine_destination(id).await?;
    Ok(Json(SessionDestination {
        session_id: id,
        destination,
    }))
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SupportRoleRecommendation>>, ApiError> {
    Ok(Json(state.engine.recommendations(id)?))
}
