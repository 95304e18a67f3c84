//! Integration tests for the tool surface over mock upstreams.

use standupd::config::Config;
use standupd::jira::JiraClient;
use standupd::slack::SlackClient;
use standupd::tools::ToolContext;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> Config {
  serde_yaml::from_str(
    "jira:\n  url: https://example.atlassian.net\n  email: dev@example.com\n\
     slack:\n  default_channel: \"#standup\"\n",
  )
  .unwrap()
}

fn context_for(jira: &MockServer, slack: Option<&MockServer>) -> ToolContext {
  let mut config = config();
  config.jira.url = jira.uri();

  let client = JiraClient::new(&config.jira, "token".into()).unwrap();
  let slack_client = slack
    .map(|s| SlackClient::with_base_url("xoxb-test".into(), &format!("{}/", s.uri())).unwrap());

  ToolContext::with_clients(config, client, slack_client)
}

fn sprint_body() -> serde_json::Value {
  serde_json::json!({
    "values": [{ "id": 7, "name": "Sprint 42", "state": "active", "originBoardId": 3 }]
  })
}

fn three_issue_page() -> serde_json::Value {
  serde_json::json!({
    "issues": [
      {
        "key": "WEB-1",
        "fields": {
          "summary": "Shipped",
          "status": { "name": "Done" },
          "assignee": { "displayName": "Ana" },
          "updated": "2026-08-16T10:00:00.000+0000",
          "project": { "key": "WEB" }
        }
      },
      {
        "key": "WEB-2",
        "fields": {
          "summary": "Slow migration",
          "status": { "name": "In Progress" },
          "assignee": { "displayName": "Bo" },
          "updated": "2026-08-21T10:00:00.000+0000",
          "duedate": "2026-08-25",
          "project": { "key": "WEB" }
        }
      },
      {
        "key": "WEB-3",
        "fields": {
          "summary": "Untriaged",
          "status": { "name": "To Do" },
          "updated": "2026-08-26T08:00:00.000+0000",
          "project": { "key": "WEB" }
        }
      }
    ],
    "startAt": 0,
    "maxResults": 50,
    "total": 3
  })
}

async fn mount_sprint_data(server: &MockServer) {
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/board/3/sprint"))
    .respond_with(ResponseTemplate::new(200).set_body_json(sprint_body()))
    .mount(server)
    .await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/sprint/7/issue"))
    .respond_with(ResponseTemplate::new(200).set_body_json(three_issue_page()))
    .mount(server)
    .await;
}

#[tokio::test]
async fn daily_standup_report_returns_structured_data() {
  let jira = MockServer::start().await;
  mount_sprint_data(&jira).await;

  let context = context_for(&jira, None);
  let response = context
    .dispatch("daily_standup_report", serde_json::json!({ "boardId": 3 }))
    .await;

  assert!(response.ok, "unexpected error: {:?}", response.error);
  let data = response.data.unwrap();
  assert_eq!(data["sprintName"], "Sprint 42");
  assert_eq!(data["summary"]["totalSprintIssues"], 3);
  assert_eq!(data["summary"]["completedIssues"], 1);
  assert_eq!(data["staleIssues"][0]["key"], "WEB-2");
  assert_eq!(data["overdueIssues"][0]["key"], "WEB-2");
  assert_eq!(data["unassignedIssues"][0]["key"], "WEB-3");
}

#[tokio::test]
async fn include_unassigned_false_strips_the_bucket() {
  let jira = MockServer::start().await;
  mount_sprint_data(&jira).await;

  let context = context_for(&jira, None);
  let response = context
    .dispatch(
      "daily_standup_report",
      serde_json::json!({ "boardId": 3, "includeUnassigned": false }),
    )
    .await;

  let data = response.data.unwrap();
  assert_eq!(data["unassignedIssues"], serde_json::json!([]));
  assert!(data["byAssignee"].get("Unassigned").is_none());
  assert!(data["byAssignee"].get("Bo").is_some());
}

#[tokio::test]
async fn no_active_sprint_yields_not_found_envelope() {
  let jira = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/board/3/sprint"))
    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "values": [] })))
    .mount(&jira)
    .await;

  let context = context_for(&jira, None);
  let response = context
    .dispatch("daily_standup_report", serde_json::json!({ "boardId": 3 }))
    .await;

  assert!(!response.ok);
  let error = response.error.unwrap();
  assert_eq!(error.code, "NOT_FOUND");
  assert!(error.message.contains("active sprint"));
}

#[tokio::test]
async fn generate_standup_pdf_writes_a_document() {
  let jira = MockServer::start().await;
  mount_sprint_data(&jira).await;

  let dir = tempfile::tempdir().unwrap();
  let output = dir.path().join("standup.pdf");

  let context = context_for(&jira, None);
  let response = context
    .dispatch(
      "generate_standup_pdf",
      serde_json::json!({ "boardId": 3, "outputPath": output }),
    )
    .await;

  assert!(response.ok, "unexpected error: {:?}", response.error);
  let data = response.data.unwrap();
  assert_eq!(data["reportSummary"]["totalSprintIssues"], 3);

  let bytes = std::fs::read(&output).unwrap();
  assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn create_issue_returns_key_and_browse_url() {
  let jira = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/rest/api/3/issue"))
    .and(body_partial_json(serde_json::json!({
      "fields": { "project": { "key": "WEB" }, "summary": "New login flow" }
    })))
    .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "key": "WEB-77" })))
    .expect(1)
    .mount(&jira)
    .await;

  let context = context_for(&jira, None);
  let response = context
    .dispatch(
      "create_issue",
      serde_json::json!({ "project": "WEB", "summary": "New login flow", "issueType": "Task" }),
    )
    .await;

  assert!(response.ok, "unexpected error: {:?}", response.error);
  let data = response.data.unwrap();
  assert_eq!(data["issueKey"], "WEB-77");
  assert_eq!(
    data["browseUrl"],
    format!("{}/browse/WEB-77", jira.uri().trim_end_matches('/'))
  );
}

#[tokio::test]
async fn update_issue_validates_before_any_io() {
  let jira = MockServer::start().await;
  let context = context_for(&jira, None);

  let response = context
    .dispatch("update_issue", serde_json::json!({ "issueKey": "WEB-1", "fields": {} }))
    .await;

  assert!(!response.ok);
  assert_eq!(response.error.unwrap().code, "VALIDATION_ERROR");
  assert!(jira.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn slack_post_message_uses_default_channel() {
  let jira = MockServer::start().await;
  let slack = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/chat.postMessage"))
    .and(body_partial_json(serde_json::json!({ "channel": "#standup", "text": "standup is up" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
      "ok": true,
      "ts": "1724668800.000100"
    })))
    .expect(1)
    .mount(&slack)
    .await;

  let context = context_for(&jira, Some(&slack));
  let response = context
    .dispatch("slack_post_message", serde_json::json!({ "text": "standup is up" }))
    .await;

  assert!(response.ok, "unexpected error: {:?}", response.error);
  assert_eq!(response.data.unwrap()["ts"], "1724668800.000100");
}

#[tokio::test]
async fn slack_error_envelope_is_normalized() {
  let jira = MockServer::start().await;
  let slack = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/chat.postMessage"))
    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
      "ok": false,
      "error": "channel_not_found"
    })))
    .mount(&slack)
    .await;

  let context = context_for(&jira, Some(&slack));
  let response = context
    .dispatch(
      "slack_post_message",
      serde_json::json!({ "channel": "#nope", "text": "hi" }),
    )
    .await;

  assert!(!response.ok);
  assert!(response.error.unwrap().message.contains("channel_not_found"));
}
