//! Integration tests for the cached gateway against a mock Jira upstream.

use standupd::cache::{CacheRegistry, CacheStore};
use standupd::config::JiraConfig;
use standupd::error::Error;
use standupd::jira::gateway::SprintSource;
use standupd::jira::{JiraClient, JiraGateway};
use standupd::report::{ReportBuilder, ReportRequest};
use standupd::retry::RetryOptions;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> JiraGateway {
  let client = JiraClient::new(
    &JiraConfig {
      url: server.uri(),
      email: "dev@example.com".into(),
    },
    "token".into(),
  )
  .unwrap();

  JiraGateway::new(client, CacheRegistry::new()).with_retry_options(RetryOptions {
    max_attempts: 3,
    initial_delay: Duration::from_millis(5),
    max_delay: Duration::from_millis(20),
    factor: 2,
  })
}

fn sprint_body() -> serde_json::Value {
  serde_json::json!({
    "values": [{
      "id": 7,
      "name": "Sprint 42",
      "state": "active",
      "startDate": "2026-08-17T08:00:00.000Z",
      "endDate": "2026-08-31T08:00:00.000Z",
      "originBoardId": 3
    }]
  })
}

fn issues_page(start_at: u64, count: u64, total: u64) -> serde_json::Value {
  let issues: Vec<serde_json::Value> = (start_at..start_at + count)
    .map(|i| {
      serde_json::json!({
        "key": format!("WEB-{}", i + 1),
        "fields": {
          "summary": format!("Issue {}", i + 1),
          "status": { "name": if i % 3 == 0 { "Done" } else { "To Do" } },
          "updated": "2026-08-25T10:00:00.000+0000",
          "project": { "key": "WEB" }
        }
      })
    })
    .collect();

  serde_json::json!({
    "issues": issues,
    "startAt": start_at,
    "maxResults": 50,
    "total": total
  })
}

#[tokio::test]
async fn active_sprint_is_fetched_once_then_cached() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/board/3/sprint"))
    .and(query_param("state", "active"))
    .respond_with(ResponseTemplate::new(200).set_body_json(sprint_body()))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = gateway_for(&server);
  let first = gateway.get_active_sprint(3).await.unwrap().unwrap();
  let second = gateway.get_active_sprint(3).await.unwrap().unwrap();

  assert_eq!(first.id, 7);
  assert_eq!(first.name, "Sprint 42");
  assert_eq!(second.id, 7);
}

#[tokio::test]
async fn missing_active_sprint_is_not_cached() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/board/9/sprint"))
    .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "values": [] })))
    .expect(2)
    .mount(&server)
    .await;

  let gateway = gateway_for(&server);
  assert!(gateway.get_active_sprint(9).await.unwrap().is_none());
  // Re-checked upstream instead of being served a cached "no sprint".
  assert!(gateway.get_active_sprint(9).await.unwrap().is_none());
}

#[tokio::test]
async fn pagination_fetches_exactly_three_pages_for_120_issues() {
  let server = MockServer::start().await;
  for (start, count) in [(0u64, 50u64), (50, 50), (100, 20)] {
    Mock::given(method("GET"))
      .and(path("/rest/agile/1.0/sprint/7/issue"))
      .and(query_param("startAt", start.to_string()))
      .and(query_param("maxResults", "50"))
      .respond_with(ResponseTemplate::new(200).set_body_json(issues_page(start, count, 120)))
      .expect(1)
      .mount(&server)
      .await;
  }

  let gateway = gateway_for(&server);
  let tickets = gateway.get_sprint_tickets(7).await.unwrap();

  assert_eq!(tickets.len(), 120);
  assert_eq!(tickets[0].key, "WEB-1");
  assert_eq!(tickets[119].key, "WEB-120");
}

#[tokio::test]
async fn transient_503_is_retried_until_success() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/board/3/sprint"))
    .respond_with(ResponseTemplate::new(503))
    .up_to_n_times(2)
    .expect(2)
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/board/3/sprint"))
    .respond_with(ResponseTemplate::new(200).set_body_json(sprint_body()))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = gateway_for(&server);
  let sprint = gateway.get_active_sprint(3).await.unwrap().unwrap();
  assert_eq!(sprint.name, "Sprint 42");
}

#[tokio::test]
async fn client_error_propagates_without_retry() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/board/404/sprint"))
    .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
      "errorMessages": ["Board does not exist"]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = gateway_for(&server);
  match gateway.get_active_sprint(404).await {
    Err(Error::Api { status, message, .. }) => {
      assert_eq!(status, 404);
      assert!(message.contains("Board does not exist"));
    }
    other => panic!("expected 404 Api error, got {:?}", other.map(|s| s.map(|x| x.name))),
  }
}

#[tokio::test]
async fn failure_mid_pagination_discards_partial_accumulation() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/sprint/8/issue"))
    .and(query_param("startAt", "0"))
    .respond_with(ResponseTemplate::new(200).set_body_json(issues_page(0, 50, 80)))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/sprint/8/issue"))
    .and(query_param("startAt", "50"))
    .respond_with(ResponseTemplate::new(400))
    .mount(&server)
    .await;

  let gateway = gateway_for(&server);
  assert!(gateway.get_sprint_tickets(8).await.is_err());

  // Nothing was cached: a full refetch hits page 0 again.
  let requests = server.received_requests().await.unwrap();
  let page_zero_hits = requests
    .iter()
    .filter(|r| r.url.query().is_some_and(|q| q.contains("startAt=0")))
    .count();
  assert_eq!(page_zero_hits, 1);

  assert!(gateway.get_sprint_tickets(8).await.is_err());
  let requests = server.received_requests().await.unwrap();
  let page_zero_hits = requests
    .iter()
    .filter(|r| r.url.query().is_some_and(|q| q.contains("startAt=0")))
    .count();
  assert_eq!(page_zero_hits, 2);
}

#[tokio::test]
async fn report_builds_end_to_end_over_the_gateway() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/board/3/sprint"))
    .respond_with(ResponseTemplate::new(200).set_body_json(sprint_body()))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/rest/agile/1.0/sprint/7/issue"))
    .respond_with(ResponseTemplate::new(200).set_body_json(issues_page(0, 30, 30)))
    .expect(1)
    .mount(&server)
    .await;

  let gateway = gateway_for(&server);
  let builder = ReportBuilder::new(gateway, CacheStore::new("report", 300, 100));
  let request = ReportRequest {
    board_id: 3,
    project_key: None,
    days_stale: 2,
  };

  let report = builder.build(&request).await.unwrap();
  assert_eq!(report.sprint_name, "Sprint 42");
  assert_eq!(report.summary.total_sprint_issues, 30);
  assert_eq!(
    report.summary.total_sprint_issues,
    report.summary.completed_issues + report.summary.in_progress_issues + report.summary.todo_issues
  );

  // Second build within the TTL is served from the report cache.
  let again = builder.build(&request).await.unwrap();
  assert_eq!(report, again);
}
