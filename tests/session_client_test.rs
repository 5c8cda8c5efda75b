use echomind::account::types::UsageAction;
use echomind::api::identity::Identity;
use echomind::session::client::{HttpSessionBackend, SessionBackend, SessionUpload};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn identity() -> Identity {
    Identity {
        user_id: "user_1".to_string(),
        email: Some("user_1@example.com".to_string()),
        name: None,
    }
}

fn counters(used: i64) -> serde_json::Value {
    json!({
        "freeTrialUsed": used,
        "freeTrialLimit": 3,
        "premiumCallsRemaining": 0,
        "premiumCallsTotal": 0,
        "isPremium": false
    })
}

#[tokio::test]
async fn record_usage_posts_action_with_identity() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/subscription"))
        .and(header("x-user-id", "user_1"))
        .and(header("x-user-email", "user_1@example.com"))
        .and(body_json(json!({ "action": "useFreeCall" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(counters(2)))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpSessionBackend::new(&server.uri(), identity()).unwrap();
    let snapshot = backend.record_usage(UsageAction::UseFreeCall).await.unwrap();
    assert_eq!(snapshot.free_trial_used, 2);
    assert!(!snapshot.is_premium);
}

#[tokio::test]
async fn add_premium_calls_sends_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/subscription"))
        .and(body_json(json!({ "action": "addPremiumCalls", "calls": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "freeTrialUsed": 3,
            "freeTrialLimit": 3,
            "premiumCallsRemaining": 10,
            "premiumCallsTotal": 10,
            "isPremium": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpSessionBackend::new(&server.uri(), identity()).unwrap();
    let snapshot = backend
        .record_usage(UsageAction::AddPremiumCalls(10))
        .await
        .unwrap();
    assert!(snapshot.is_premium);
    assert_eq!(snapshot.premium_calls_remaining, 10);
}

#[tokio::test]
async fn save_session_posts_camel_case_upload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/history"))
        .and(body_json(json!({
            "sessionId": "s-1",
            "notes": "user: hello",
            "summary": "Brief session with minimal conversation.",
            "duration": "00:00:42"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpSessionBackend::new(&server.uri(), identity()).unwrap();
    let upload = SessionUpload {
        session_id: "s-1".to_string(),
        notes: "user: hello".to_string(),
        summary: "Brief session with minimal conversation.".to_string(),
        duration: "00:00:42".to_string(),
    };
    backend.save_session(&upload).await.unwrap();
}

#[tokio::test]
async fn error_status_surfaces_as_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/history"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "Session already saved" })),
        )
        .mount(&server)
        .await;

    let backend = HttpSessionBackend::new(&server.uri(), identity()).unwrap();
    let upload = SessionUpload {
        session_id: "s-1".to_string(),
        notes: String::new(),
        summary: "x".to_string(),
        duration: "00:00:01".to_string(),
    };
    let err = backend.save_session(&upload).await.unwrap_err();
    assert!(err.to_string().contains("409"));
}

#[tokio::test]
async fn summary_and_usage_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate-summary"))
        .and(body_json(json!({ "notes": "user: a long enough transcript" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "## Key Discussion Points" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/subscription"))
        .and(header("x-user-id", "user_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(counters(1)))
        .mount(&server)
        .await;

    let backend = HttpSessionBackend::new(&format!("{}/", server.uri()), identity()).unwrap();
    let summary = backend
        .request_summary("user: a long enough transcript")
        .await
        .unwrap();
    assert_eq!(summary, "## Key Discussion Points");

    let usage = backend.fetch_usage().await.unwrap();
    assert_eq!(usage.free_trial_used, 1);
}
