//! SlackClient integration tests against a mock Web API.

use standupd::error::Error;
use standupd::slack::SlackClient;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> SlackClient {
  SlackClient::with_base_url("xoxb-test".into(), &format!("{}/", server.uri())).unwrap()
}

#[tokio::test]
async fn post_message_sends_bearer_auth_and_returns_payload() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/chat.postMessage"))
    .and(header("authorization", "Bearer xoxb-test"))
    .and(body_partial_json(serde_json::json!({ "channel": "#standup", "text": "hi" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
      "ok": true,
      "ts": "1724668800.000100",
      "channel": "C123"
    })))
    .expect(1)
    .mount(&server)
    .await;

  let payload = client(&server).post_message("#standup", "hi").await.unwrap();
  assert_eq!(payload["ts"], "1724668800.000100");
  assert_eq!(payload["channel"], "C123");
  // The status flag stays out of the payload.
  assert!(payload.get("ok").is_none());
}

#[tokio::test]
async fn ok_false_is_normalized_into_an_api_error() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/chat.postMessage"))
    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
      "ok": false,
      "error": "channel_not_found"
    })))
    .mount(&server)
    .await;

  let err = client(&server).post_message("#nope", "hi").await.unwrap_err();
  match err {
    Error::Api { status, ref message, .. } => {
      assert_eq!(status, 200);
      assert_eq!(message, "channel_not_found");
    }
    other => panic!("expected Api error, got {:?}", other),
  }
}

#[tokio::test]
async fn http_failure_keeps_the_upstream_status() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/conversations.history"))
    .respond_with(ResponseTemplate::new(429))
    .mount(&server)
    .await;

  let err = client(&server).channel_history("C123", 10).await.unwrap_err();
  match err {
    Error::Api { status, .. } => assert_eq!(status, 429),
    other => panic!("expected Api error, got {:?}", other),
  }
  assert!(err.is_transient());
}

#[tokio::test]
async fn schedule_message_posts_the_epoch_timestamp() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/chat.scheduleMessage"))
    .and(body_partial_json(serde_json::json!({
      "channel": "#standup",
      "text": "later",
      "post_at": 1724750000
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
      "ok": true,
      "scheduled_message_id": "Q123"
    })))
    .expect(1)
    .mount(&server)
    .await;

  let payload = client(&server)
    .schedule_message("#standup", "later", 1724750000)
    .await
    .unwrap();
  assert_eq!(payload["scheduled_message_id"], "Q123");
}
