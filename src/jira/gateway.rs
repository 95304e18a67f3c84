//! Cached, retried access to sprint data.
//!
//! This wraps the raw [`JiraClient`] and provides the same data with
//! transparent caching and bounded retry, so callers never talk to the
//! upstream directly.

use crate::cache::CacheRegistry;
use crate::error::Result;
use crate::jira::api_types::{ApiSprint, RawIssue};
use crate::jira::client::JiraClient;
use crate::jira::types::{Sprint, SprintState};
use crate::retry::{retry, RetryOptions};

const PAGE_SIZE: u64 = 50;
const ACTIVE_SPRINT_TTL_SECS: i64 = 600;
const SPRINT_TICKETS_TTL_SECS: i64 = 300;

/// Read access to sprint data, abstracted so the report builder can be
/// exercised against a stub.
pub trait SprintSource {
  /// The board's active sprint, if it has one.
  fn get_active_sprint(&self, board_id: u64) -> impl std::future::Future<Output = Result<Option<Sprint>>>;

  /// Every issue in the sprint, fully paginated.
  fn get_sprint_tickets(&self, sprint_id: u64) -> impl std::future::Future<Output = Result<Vec<RawIssue>>>;

  /// Base URL issue permalinks hang off of.
  fn browse_base(&self) -> String;
}

#[derive(Clone)]
pub struct JiraGateway {
  client: JiraClient,
  caches: CacheRegistry,
  retry_options: RetryOptions,
}

impl JiraGateway {
  pub fn new(client: JiraClient, caches: CacheRegistry) -> Self {
    Self {
      client,
      caches,
      retry_options: RetryOptions::default(),
    }
  }

  pub fn with_retry_options(mut self, retry_options: RetryOptions) -> Self {
    self.retry_options = retry_options;
    self
  }

  pub fn client(&self) -> &JiraClient {
    &self.client
  }
}

impl SprintSource for JiraGateway {
  /// Cached per board for ten minutes. A board without an active sprint is
  /// not cached, so it is re-checked on every call instead of being
  /// treated as permanently sprintless.
  async fn get_active_sprint(&self, board_id: u64) -> Result<Option<Sprint>> {
    let cache_key = format!("active:{}", board_id);
    if let Some(sprint) = self.caches.sprints.get::<Sprint>(&cache_key) {
      tracing::debug!(board_id, "active sprint served from cache");
      return Ok(Some(sprint));
    }

    let sprints = retry(
      || self.client.get_board_sprints(board_id, "active"),
      &self.retry_options,
    )
    .await?;

    // Exactly one active sprint is expected per board; first match wins if
    // the upstream returns several.
    let sprint = sprints.into_iter().next().map(sprint_from_api);
    if let Some(ref sprint) = sprint {
      self
        .caches
        .sprints
        .set(&cache_key, sprint, Some(ACTIVE_SPRINT_TTL_SECS))?;
    }

    Ok(sprint)
  }

  /// Cached per sprint for five minutes. Pages are fetched strictly in
  /// sequence, each through the retry executor; a failure mid-pagination
  /// discards the partial accumulation.
  async fn get_sprint_tickets(&self, sprint_id: u64) -> Result<Vec<RawIssue>> {
    let cache_key = format!("tickets:{}", sprint_id);
    if let Some(issues) = self.caches.issues.get::<Vec<RawIssue>>(&cache_key) {
      tracing::debug!(sprint_id, count = issues.len(), "sprint tickets served from cache");
      return Ok(issues);
    }

    let mut all_issues = Vec::new();
    let mut start_at = 0u64;

    loop {
      let page = retry(
        || self.client.get_sprint_issues_page(sprint_id, start_at, PAGE_SIZE),
        &self.retry_options,
      )
      .await?;

      let total = page.total;
      all_issues.extend(page.issues);

      start_at += PAGE_SIZE;
      if start_at >= total {
        break;
      }
    }

    tracing::debug!(sprint_id, count = all_issues.len(), "fetched sprint tickets");
    self
      .caches
      .issues
      .set(&cache_key, &all_issues, Some(SPRINT_TICKETS_TTL_SECS))?;

    Ok(all_issues)
  }

  fn browse_base(&self) -> String {
    self.client.browse_base().to_string()
  }
}

fn sprint_from_api(api: ApiSprint) -> Sprint {
  Sprint {
    id: api.id,
    name: api.name,
    state: match api.state.as_str() {
      "active" => SprintState::Active,
      "future" => SprintState::Future,
      _ => SprintState::Closed,
    },
    start_date: api.start_date,
    end_date: api.end_date,
    origin_board_id: api.origin_board_id,
  }
}
