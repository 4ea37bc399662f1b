//! Integration tests for the YouTube gateway against a mock API.

use resubscribe::config::secrets::SecretString;
use resubscribe::gateway::{Gateway, YouTubeClient};
use resubscribe::model::{ChannelId, Outcome};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> YouTubeClient {
    YouTubeClient::new(
        reqwest::Client::new(),
        server.uri(),
        SecretString::from("test-token"),
        "YT-Subscriptions-Migrator",
    )
}

fn channel() -> ChannelId {
    ChannelId::parse("UCabc").unwrap()
}

fn api_error(code: u16, reason: &str) -> serde_json::Value {
    json!({
        "error": {
            "code": code,
            "message": format!("The request failed: {reason}"),
            "errors": [{ "domain": "youtube.subscription", "reason": reason }]
        }
    })
}

#[tokio::test]
async fn created_subscription_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/youtube/v3/subscriptions"))
        .and(query_param("part", "snippet"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("user-agent", "YT-Subscriptions-Migrator"))
        .and(body_json(json!({
            "snippet": { "resourceId": { "kind": "youtube#channel", "channelId": "UCabc" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "sub1"})))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = Gateway::new(client(&server)).subscribe(&channel()).await;
    assert_eq!(outcome, Outcome::Success);
}

#[tokio::test]
async fn duplicate_reason_is_already_subscribed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(api_error(400, "subscriptionDuplicate")),
        )
        .mount(&server)
        .await;

    let outcome = Gateway::new(client(&server)).subscribe(&channel()).await;
    assert_eq!(outcome, Outcome::AlreadySubscribed);
}

#[tokio::test]
async fn quota_reason_is_quota_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(api_error(403, "quotaExceeded")))
        .mount(&server)
        .await;

    let outcome = Gateway::new(client(&server)).subscribe(&channel()).await;
    match outcome {
        Outcome::QuotaExceeded { message } => assert!(message.contains("403")),
        other => panic!("expected QuotaExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_reason_is_other_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(api_error(404, "publisherNotFound")))
        .mount(&server)
        .await;

    let outcome = Gateway::new(client(&server)).subscribe(&channel()).await;
    match outcome {
        Outcome::OtherFailure { message } => assert!(message.contains("publisherNotFound")),
        other => panic!("expected OtherFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_error_is_other_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = YouTubeClient::new(
        reqwest::Client::new(),
        uri,
        SecretString::from("test-token"),
        "test",
    );
    let outcome = Gateway::new(client).subscribe(&channel()).await;
    assert!(matches!(outcome, Outcome::OtherFailure { .. }));
}

#[tokio::test]
async fn rejected_token_without_refresher_is_other_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(api_error(401, "authError")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = Gateway::new(client(&server)).subscribe(&channel()).await;
    assert!(matches!(outcome, Outcome::OtherFailure { .. }));
}
