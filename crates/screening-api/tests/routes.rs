use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt; // for oneshot
use uuid::Uuid;

use screening_api::router;
use screening_api::state::AppState;
use screening_engine::ScreeningEngine;
use screening_engine::collaborators::Collaborators;
use screening_engine::config::EngineConfig;

fn app_with(config: EngineConfig) -> Router {
    let collaborators = Collaborators::permissive(&config, "acme");
    let engine = ScreeningEngine::open(config, collaborators).unwrap();
    router(AppState::new(engine))
}

fn app() -> Router {
    app_with(EngineConfig::default())
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn id(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

/// Publishes a one-question screening and a flow over it; returns
/// (flow id, question id, option ids).
async fn publish_flow(app: &Router, flow_extra: Value) -> (String, String, Vec<String>) {
    let (status, screening) = call(
        app,
        "POST",
        "/screenings",
        Some(json!({ "name": "PHQ-2", "screening_type": "phq2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let screening_id = id(&screening);

    let (status, detail) = call(
        app,
        "POST",
        &format!("/screenings/{screening_id}/versions"),
        Some(json!({
            "scoring_rule": "option_sum",
            "questions": [{
                "answer_format": "single_select",
                "question_text": "Little interest or pleasure in doing things?",
                "minimum_answer_count": 1,
                "maximum_answer_count": 1,
                "options": [
                    { "answer_option_text": "Not at all", "score": 0 },
                    { "answer_option_text": "Every day", "score": 3, "indicates_crisis": true },
                ],
            }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let version_id = detail["version"]["id"].as_str().unwrap().to_string();
    let question = &detail["questions"][0];
    let question_id = question["question"]["id"].as_str().unwrap().to_string();
    let options = question["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(id)
        .collect();
    let (status, _) = call(
        app,
        "POST",
        &format!("/screenings/{screening_id}/versions/{version_id}/publish"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, flow) = call(
        app,
        "POST",
        "/flows",
        Some(json!({ "name": "Depression", "flow_type": "custom" })),
    )
    .await;
    let flow_id = id(&flow);
    let mut spec = json!({
        "initial_screening_id": screening_id,
        "orchestration_rule": "finish",
        "destination_rule": "destination_home",
        "created_by_account_id": Uuid::new_v4(),
    });
    if let (Some(spec), Some(extra)) = (spec.as_object_mut(), flow_extra.as_object()) {
        spec.extend(extra.clone());
    }
    let (status, version) = call(app, "POST", &format!("/flows/{flow_id}/versions"), Some(spec)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(
        app,
        "POST",
        &format!("/flows/{flow_id}/versions/{}/publish", id(&version)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (flow_id, question_id, options)
}

async fn start(app: &Router, flow_id: &str) -> String {
    let (status, session) = call(
        app,
        "POST",
        "/sessions",
        Some(json!({
            "flow": { "id": flow_id },
            "target_account_id": Uuid::new_v4(),
            "created_by_account_id": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    id(&session)
}

#[tokio::test]
async fn health_check() {
    let (status, body) = call(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn session_round_trip() {
    let app = app();
    let (flow_id, question_id, options) = publish_flow(&app, json!({})).await;
    let session_id = start(&app, &flow_id).await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/sessions/{session_id}/answers"),
        Some(json!({ "question_id": question_id, "answer_option_ids": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["valid"], false);
    assert_eq!(
        body["validation_errors"][0]["message"],
        "You must answer the question to proceed."
    );

    let (status, body) = call(
        &app,
        "POST",
        &format!("/sessions/{session_id}/answers"),
        Some(json!({ "question_id": question_id, "answer_option_ids": [options[0]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["crisis_indicated"], false);

    let (status, state) = call(&app, "GET", &format!("/sessions/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["status"], "awaiting_answers");
    let current = state["current_session_screening_id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/session-screenings/{current}/complete"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 0);

    let (status, outcome) = call(&app, "POST", &format!("/sessions/{session_id}/advance"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "completed");
    assert_eq!(outcome["destination"]["kind"], "home");

    let (status, body) = call(&app, "GET", &format!("/sessions/{session_id}/destination"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["destination"]["kind"], "home");

    let (status, body) = call(&app, "GET", &format!("/sessions/{session_id}/recommendations"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = call(&app, "POST", &format!("/sessions/{session_id}/advance"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn crisis_answer_routes_to_crisis() {
    let app = app();
    let (flow_id, question_id, options) = publish_flow(&app, json!({})).await;
    let session_id = start(&app, &flow_id).await;

    let (_, body) = call(
        &app,
        "POST",
        &format!("/sessions/{session_id}/answers"),
        Some(json!({ "question_id": question_id, "answer_option_ids": [options[1]] })),
    )
    .await;
    assert_eq!(body["crisis_indicated"], true);

    let (_, outcome) = call(&app, "POST", &format!("/sessions/{session_id}/advance"), None).await;
    assert_eq!(outcome["destination"]["kind"], "crisis");
}

#[tokio::test]
async fn skipping_needs_a_skippable_flow() {
    let app = app();
    let (strict, _, _) = publish_flow(&app, json!({})).await;
    let session_id = start(&app, &strict).await;
    let (status, _) = call(&app, "POST", &format!("/sessions/{session_id}/skip"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (lenient, _, _) = publish_flow(&app, json!({ "skippable": true })).await;
    let session_id = start(&app, &lenient).await;
    let (status, body) = call(&app, "POST", &format!("/sessions/{session_id}/skip"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skipped"], true);
    let (status, _) = call(&app, "GET", &format!("/sessions/{session_id}/destination"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn evaluation_failures_are_retryable() {
    let app = app_with(EngineConfig {
        evaluation_step_budget: 0,
        ..EngineConfig::default()
    });
    let (flow_id, question_id, options) = publish_flow(&app, json!({})).await;
    let session_id = start(&app, &flow_id).await;
    call(
        &app,
        "POST",
        &format!("/sessions/{session_id}/answers"),
        Some(json!({ "question_id": question_id, "answer_option_ids": [options[0]] })),
    )
    .await;

    let (status, body) = call(&app, "POST", &format!("/sessions/{session_id}/advance"), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retryable"], true);
    assert_eq!(body["kind"], "RUNTIME_ERROR");
    assert_eq!(body["rule_id"], "option_sum");

    let (_, state) = call(&app, "GET", &format!("/sessions/{session_id}"), None).await;
    assert_eq!(state["session"]["completed"], false);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = app();
    let missing = Uuid::new_v4();
    for uri in [
        format!("/sessions/{missing}"),
        format!("/flows/{missing}"),
        format!("/flows/{missing}/active-version"),
        format!("/screenings/{missing}"),
        format!("/patient-orders/{missing}/triage"),
        "/rules/nope".to_string(),
    ] {
        let (status, body) = call(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn rules_register_once() {
    let app = app();
    let rule = json!({
        "rule_id": "to_content",
        "rule": { "kind": "destination", "spec": { "strategy": "fixed", "destination": { "kind": "content_list" } } },
    });
    let (status, body) = call(&app, "POST", "/rules", Some(rule.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);
    let (_, body) = call(&app, "POST", "/rules", Some(rule)).await;
    assert_eq!(body["created"], false);

    let (status, _) = call(
        &app,
        "POST",
        "/rules",
        Some(json!({
            "rule_id": "to_content",
            "rule": { "kind": "destination", "spec": { "strategy": "fixed", "destination": { "kind": "home" } } },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, rules) = call(&app, "GET", "/rules", None).await;
    assert!(rules.as_array().unwrap().iter().any(|r| r["rule_id"] == "to_content"));
}

#[tokio::test]
async fn triage_override_requires_a_reason() {
    let app = app();
    let order = Uuid::new_v4();
    let (status, body) = call(
        &app,
        "POST",
        &format!("/patient-orders/{order}/triage-overrides"),
        Some(json!({
            "care_type_id": "specialty",
            "focus_type_id": "SUD",
            "account_id": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["validation_errors"][0]["field"], "reason");

    let (status, group) = call(
        &app,
        "POST",
        &format!("/patient-orders/{order}/triage-overrides"),
        Some(json!({
            "care_type_id": "specialty",
            "focus_type_id": "sud",
            "reason": "Referred by psychiatry",
            "account_id": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(group["source"], "manual");
    assert_eq!(group["triages"][0]["focus_type_id"], "SUD");

    let (_, active) = call(&app, "GET", &format!("/patient-orders/{order}/triage"), None).await;
    assert_eq!(active["id"], group["id"]);
    let (_, history) = call(&app, "GET", &format!("/patient-orders/{order}/triage/history"), None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn confirmation_prompt_holds_completion_until_forced() {
    let app = app();
    let (flow_id, question_id, options) = publish_flow(
        &app,
        json!({ "pre_completion_confirmation_prompt": "Ready to see your results?" }),
    )
    .await;
    let session_id = start(&app, &flow_id).await;

    let (status, next) = call(&app, "GET", &format!("/sessions/{session_id}/next-question"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(next["question"]["id"], question_id.as_str());
    assert_eq!(next["options"].as_array().unwrap().len(), 2);

    call(
        &app,
        "POST",
        &format!("/sessions/{session_id}/answers"),
        Some(json!({ "question_id": question_id, "answer_option_ids": [options[0]] })),
    )
    .await;
    let (_, next) = call(&app, "GET", &format!("/sessions/{session_id}/next-question"), None).await;
    assert_eq!(next, Value::Null);

    let (status, outcome) = call(&app, "POST", &format!("/sessions/{session_id}/advance"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "confirmation_required");
    assert_eq!(outcome["prompt"], "Ready to see your results?");

    let (_, session) = call(&app, "GET", &format!("/sessions/{session_id}"), None).await;
    assert_eq!(session["session"]["completed"], false);

    let (status, outcome) = call(
        &app,
        "POST",
        &format!("/sessions/{session_id}/advance"),
        Some(json!({ "force": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["outcome"], "completed");
    assert_eq!(outcome["destination"]["kind"], "home");
}
