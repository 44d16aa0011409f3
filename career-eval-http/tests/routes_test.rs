
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use career_eval_core::provider::ProviderError;
use career_eval_http::{
    cors::{CorsPolicy, Environment},
    handlers::test_helpers::create_test_state,
    models::{EvaluateResponse, HealthResponse, SessionResponse},
    server::build_app,
};
use mocks::{
    ScriptedProvider, UnconfiguredProvider, get, json_body, post_evaluate, send, test_app,
};
use pretty_assertions::assert_eq;
use serde_json::json;

const REPLY: &str = "Score: 37\nExplanation: Routine scheduling work is exposed.\nClient care is not.";

// 2025-01-01T00:00:00Z
const TEST_EPOCH_MS: i64 = 1_735_689_600_000;

fn answers() -> serde_json::Value {
    json!({"currentRole": "Nurse", "yearsExperience": "10+"})
}

#[tokio::test]
async fn test_status_route() {
    let (app, _) = test_app(ScriptedProvider::new(vec![]));

    let response = send(&app, get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.message, "Career Evaluator is running!");
    assert_eq!(health.status, "healthy");
    assert_eq!(health.timestamp, "2025-01-01T00:00:00.000Z");
    assert_eq!(health.active_sessions, 0);
}

#[tokio::test]
async fn test_health_route() {
    let (app, _) = test_app(ScriptedProvider::new(vec![]));

    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_evaluate_and_fetch_session() {
    let provider = ScriptedProvider::replying(REPLY);
    let (app, state) = test_app(provider.clone());

    let response = send(
        &app,
        post_evaluate(Some("abc"), json!({ "answers": answers() })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let evaluation: EvaluateResponse = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(
        evaluation,
        EvaluateResponse {
            score: 37,
            explanation: "Routine scheduling work is exposed.\nClient care is not.".to_string(),
            session_id: "abc".to_string(),
        }
    );
    assert_eq!(provider.calls(), 1);
    assert_eq!(state.service.registry().len(), 1);

    let response = send(&app, get("/session/abc")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let first = json_body(response).await;
    assert_eq!(
        first,
        json!({
            "sessionId": "abc",
            "status": "completed",
            "startTime": TEST_EPOCH_MS,
            "lastActivity": TEST_EPOCH_MS,
            "result": {
                "score": 37,
                "explanation": "Routine scheduling work is exposed.\nClient care is not."
            },
            "error": null
        })
    );

    // Reading a session does not touch it
    let second = json_body(send(&app, get("/session/abc")).await).await;
    assert_eq!(first, second);
    let session: SessionResponse = serde_json::from_value(second).unwrap();
    assert_eq!(session.result.map(|result| result.score), Some(37));
}

#[tokio::test]
async fn test_header_session_id_wins_over_body() {
    let provider = ScriptedProvider::replying(REPLY);
    let (app, state) = test_app(provider);

    let response = send(
        &app,
        post_evaluate(
            Some("from-header"),
            json!({ "answers": answers(), "sessionId": "from-body" }),
        ),
    )
    .await;

    let body = json_body(response).await;
    assert_eq!(body["sessionId"], "from-header");
    assert!(state.service.registry().get("from-header").is_ok());
    assert!(state.service.registry().get("from-body").is_err());
}

#[tokio::test]
async fn test_body_session_id_and_anonymous_fallback() {
    let provider = ScriptedProvider::new(vec![
        Ok(career_eval_core::provider::Completion::text(REPLY)),
        Ok(career_eval_core::provider::Completion::text(REPLY)),
    ]);
    let (app, _) = test_app(provider);

    let body = json_body(
        send(
            &app,
            post_evaluate(None, json!({ "answers": answers(), "sessionId": "from-body" })),
        )
        .await,
    )
    .await;
    assert_eq!(body["sessionId"], "from-body");

    let body = json_body(send(&app, post_evaluate(None, json!({ "answers": answers() }))).await).await;
    assert_eq!(body["sessionId"], "anonymous");
}

#[tokio::test]
async fn test_missing_answers() {
    let provider = ScriptedProvider::new(vec![]);
    let (app, state) = test_app(provider.clone());

    let response = send(&app, post_evaluate(Some("abc"), json!({ "answers": null }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Missing answers", "sessionId": "abc"})
    );

    assert_eq!(provider.calls(), 0);
    assert!(state.service.registry().is_empty());
}

#[tokio::test]
async fn test_blank_answers_are_missing() {
    let provider = ScriptedProvider::new(vec![]);
    let (app, state) = test_app(provider.clone());

    for blank in [json!(""), json!(0), json!(false)] {
        let response = send(&app, post_evaluate(Some("abc"), json!({ "answers": blank }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "answers: {blank}");
        assert_eq!(
            json_body(response).await,
            json!({"error": "Missing answers", "sessionId": "abc"})
        );
    }

    assert_eq!(provider.calls(), 0);
    assert!(state.service.registry().is_empty());
}

#[tokio::test]
async fn test_numeric_body_session_id() {
    let (app, state) = test_app(ScriptedProvider::replying(REPLY));

    let response = send(
        &app,
        post_evaluate(None, json!({ "answers": answers(), "sessionId": 5 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["sessionId"], "5");
    assert!(state.service.registry().get("5").is_ok());
}

#[tokio::test]
async fn test_empty_body_is_missing_answers() {
    let (app, _) = test_app(ScriptedProvider::new(vec![]));

    let request = Request::builder()
        .uri("/evaluate")
        .method("POST")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["sessionId"], "anonymous");
}

#[tokio::test]
async fn test_malformed_body_is_internal_error() {
    let provider = ScriptedProvider::new(vec![]);
    let (app, _) = test_app(provider.clone());

    let request = Request::builder()
        .uri("/evaluate")
        .method("POST")
        .header("X-Session-ID", "abc")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["sessionId"], "abc");
    assert!(body["details"].is_string());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_unparsable_reply() {
    let (app, _) = test_app(ScriptedProvider::replying("I cannot help with that."));

    let response = send(&app, post_evaluate(Some("abc"), json!({ "answers": answers() }))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "Failed to parse AI response",
            "details": "Could not extract score and explanation from the response",
            "sessionId": "abc",
            "rawResponse": "I cannot help with that."
        })
    );

    let session = json_body(send(&app, get("/session/abc")).await).await;
    assert_eq!(session["status"], "error");
    assert_eq!(session["error"], "Failed to parse AI response");
    assert_eq!(session["result"], json!(null));
}

#[tokio::test]
async fn test_out_of_range_score() {
    let (app, _) = test_app(ScriptedProvider::replying(
        "Score: 150\nExplanation: Off the scale.",
    ));

    let response = send(&app, post_evaluate(Some("abc"), json!({ "answers": answers() }))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Invalid score");
    assert_eq!(body["rawResponse"], "Score: 150\nExplanation: Off the scale.");

    let session = json_body(send(&app, get("/session/abc")).await).await;
    assert_eq!(session["status"], "error");
}

#[tokio::test]
async fn test_provider_error() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Api {
        message: "Incorrect API key provided".to_string(),
        details: Some(json!({"message": "Incorrect API key provided", "code": "invalid_api_key"})),
    })]);
    let (app, _) = test_app(provider);

    let response = send(&app, post_evaluate(Some("abc"), json!({ "answers": answers() }))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "Failed to evaluate answers",
            "details": "Incorrect API key provided",
            "sessionId": "abc",
            "raw": {"message": "Incorrect API key provided", "code": "invalid_api_key"}
        })
    );

    let session = json_body(send(&app, get("/session/abc")).await).await;
    assert_eq!(session["status"], "error");
    assert_eq!(session["error"], "Incorrect API key provided");
}

#[tokio::test]
async fn test_unconfigured_provider() {
    let (app, state) = test_app(Arc::new(UnconfiguredProvider));

    let response = send(&app, post_evaluate(Some("abc"), json!({ "answers": answers() }))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "OpenAI API key not configured",
            "details": "Please set OPENAI_API_KEY environment variable",
            "sessionId": "abc"
        })
    );
    assert!(state.service.registry().is_empty());
}

#[tokio::test]
async fn test_unknown_session() {
    let (app, _) = test_app(ScriptedProvider::new(vec![]));

    let response = send(&app, get("/session/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Session not found", "sessionId": "nope"})
    );
}

#[tokio::test]
async fn test_cors_headers() {
    let (app, _) = test_app(ScriptedProvider::new(vec![]));

    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://192.168.1.20:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://192.168.1.20:3000"
    );

    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
    assert_eq!(
        json_body(response).await,
        json!({"error": "Internal server error", "details": "Not allowed by CORS"})
    );
}

#[tokio::test]
async fn test_disallowed_origin_never_reaches_provider() {
    let provider = ScriptedProvider::replying(REPLY);
    let (app, state) = test_app(provider.clone());

    let mut request = post_evaluate(Some("abc"), json!({ "answers": answers() }));
    request.headers_mut().insert(
        header::ORIGIN,
        header::HeaderValue::from_static("https://evil.example.com"),
    );
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({
            "error": "Internal server error",
            "details": "Not allowed by CORS",
            "sessionId": "abc"
        })
    );

    assert_eq!(provider.calls(), 0);
    assert!(state.service.registry().is_empty());
}

#[tokio::test]
async fn test_cors_production_uses_allow_list() {
    let state = create_test_state(ScriptedProvider::new(vec![]));
    let cors = CorsPolicy {
        environment: Environment::Production,
        allowed_origins: vec!["https://careers.example.com".to_string()],
    };
    let app = build_app(state, &cors);

    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );

    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "https://careers.example.com")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://careers.example.com"
    );
}

#[tokio::test]
async fn test_openapi_document() {
    let (app, _) = test_app(ScriptedProvider::new(vec![]));

    let response = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let doc = json_body(response).await;
    assert!(doc["paths"]["/evaluate"]["post"].is_object());
    assert!(doc["paths"]["/session/{session_id}"]["get"].is_object());
    assert!(doc["components"]["schemas"]["EvaluateResponse"].is_object());
}
