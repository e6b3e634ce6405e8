use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use screening_engine::definitions::RuleEntry;
use screening_rules::RuleSpec;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRule {
    rule_id: String,
    rule: RuleSpec,
}

#[derive(Serialize)]
pub struct Registered {
    rule_id: String,
    created: bool,
}

pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<RuleEntry>> {
    Json(state.engine.rules())
}

pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RuleEntry>, ApiError> {
    Ok(Json(state.engine.rule(&id)?))
}

/// Registering the identical rule twice succeeds with `created: false`.
pub async fn register_rule(
    State(state): State<AppState>,
    Json(body): Json<RegisterRule>,
) -> Result<Json<Registered>, ApiError> {
    let created = state.engine.register_rule(&body.rule_id, body.rule)?;
    Ok(Json(Registered {
        rule_id: body.rule_id,
        created,
    }))
}
