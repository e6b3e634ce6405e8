//! screening-api
//!
//! HTTP surface of the screening engine: definition administration,
//! session runtime and patient-order triage.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        // Definitions
        .route("/flows", post(routes::flows::create_flow))
        .route("/flows/{id}", get(routes::flows::get_flow))
        .route(
            "/flows/{id}/versions",
            get(routes::flows::list_flow_versions).post(routes::flows::create_flow_version),
        )
        .route(
            "/flows/{id}/versions/{version_id}/publish",
            post(routes::flows::publish_flow_version),
        )
        .route(
            "/flows/{id}/active-version",
            get(routes::flows::get_active_flow_version),
        )
        .route("/screenings", post(routes::screenings::create_screening))
        .route("/screenings/{id}", get(routes::screenings::get_screening))
        .route(
            "/screenings/{id}/versions",
            post(routes::screenings::create_screening_version),
        )
        .route(
            "/screenings/{id}/versions/{version_id}/publish",
            post(routes::screenings::publish_screening_version),
        )
        .route(
            "/screenings/{id}/active-version",
            get(routes::screenings::get_active_screening_version),
        )
        .route(
            "/screening-versions/{id}",
            get(routes::screenings::get_screening_version),
        )
        .route(
            "/rules",
            get(routes::rules::list_rules).post(routes::rules::register_rule),
        )
        .route("/rules/{id}", get(routes::rules::get_rule))
        // Sessions
        .route("/sessions", post(routes::sessions::start_session))
        .route("/sessions/{id}", get(routes::sessions::get_session))
        .route("/sessions/{id}/answers", post(routes::sessions::submit_answers))
        .route("/sessions/{id}/advance", post(routes::sessions::advance))
        .route(
            "/sessions/{id}/next-question",
            get(routes::sessions::get_next_question),
        )
        .route("/sessions/{id}/skip", post(routes::sessions::skip_session))
        .route(
            "/sessions/{id}/destination",
            get(routes::sessions::get_destination),
        )
        .route(
            "/sessions/{id}/recommendations",
            get(routes::sessions::get_recommendations),
        )
        .route(
            "/session-screenings/{id}/complete",
            post(routes::sessions::complete_screening),
        )
        // Triage
        .route(
            "/patient-orders/{id}/triage-overrides",
            post(routes::triage::create_override),
        )
        .route(
            "/patient-orders/{id}/triage",
            get(routes::triage::get_active_triage),
        )
        .route(
            "/patient-orders/{id}/triage/history",
            get(routes::triage::get_triage_history),
        )
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
