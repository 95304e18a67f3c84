//! Standup report builder: fetch, filter, classify, aggregate, sort, cache.

use crate::cache::CacheStore;
use crate::classify::classify_issue;
use crate::error::{Error, Result};
use crate::jira::gateway::SprintSource;
use crate::jira::types::{
  AssigneeReport, CategorizedIssue, IssueCategory, SprintSummary, StandupReport, StatusKind,
};
use chrono::Utc;
use std::collections::BTreeMap;

const REPORT_TTL_SECS: i64 = 300;
const UNASSIGNED: &str = "Unassigned";

/// One report request. `days_stale` is part of the cache key, so requests
/// with different thresholds never see each other's cached reports.
#[derive(Debug, Clone)]
pub struct ReportRequest {
  pub board_id: u64,
  pub project_key: Option<String>,
  pub days_stale: u32,
}

impl ReportRequest {
  fn cache_key(&self) -> String {
    format!(
      "standup:{}:{}:{}",
      self.board_id,
      self.project_key.as_deref().unwrap_or("all"),
      self.days_stale
    )
  }
}

pub struct ReportBuilder<S> {
  source: S,
  reports: CacheStore,
}

impl<S: SprintSource> ReportBuilder<S> {
  pub fn new(source: S, reports: CacheStore) -> Self {
    Self { source, reports }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Build a standup report, or serve one cached within the last five
  /// minutes for the same (board, project, threshold).
  pub async fn build(&self, request: &ReportRequest) -> Result<StandupReport> {
    let cache_key = request.cache_key();
    if let Some(report) = self.reports.get::<StandupReport>(&cache_key) {
      tracing::info!(board_id = request.board_id, "standup report served from cache");
      return Ok(report);
    }

    let sprint = self
      .source
      .get_active_sprint(request.board_id)
      .await?
      .ok_or_else(|| Error::NotFound(format!("active sprint for board {}", request.board_id)))?;

    let tickets = self.source.get_sprint_tickets(sprint.id).await?;
    let browse_base = self.source.browse_base();
    let now = Utc::now();

    let mut report = StandupReport {
      sprint_name: sprint.name,
      sprint_id: sprint.id,
      date: now.format("%Y-%m-%d").to_string(),
      stale_issues: Vec::new(),
      overdue_issues: Vec::new(),
      unassigned_issues: Vec::new(),
      blocked_issues: Vec::new(),
      by_assignee: BTreeMap::new(),
      summary: SprintSummary {
        project_filtered: request.project_key.is_some(),
        project_key: request.project_key.clone(),
        ..SprintSummary::default()
      },
    };

    for raw in &tickets {
      // Filtered-out issues are skipped entirely and never counted.
      if let Some(wanted) = request.project_key.as_deref() {
        let project = raw.fields.project.as_ref().map(|p| p.key.as_str());
        if project != Some(wanted) {
          continue;
        }
      }

      let issue = classify_issue(raw, request.days_stale, &browse_base, now);

      report.summary.total_sprint_issues += 1;
      match issue.status_kind {
        StatusKind::Completed => {
          report.summary.completed_issues += 1;
          // Completed issues count toward totals but never enter buckets.
          continue;
        }
        StatusKind::InProgress => report.summary.in_progress_issues += 1,
        StatusKind::Todo => report.summary.todo_issues += 1,
      }

      if issue.has_category(IssueCategory::Stale) {
        report.stale_issues.push(issue.clone());
      }
      if issue.has_category(IssueCategory::Overdue) {
        report.overdue_issues.push(issue.clone());
      }
      if issue.has_category(IssueCategory::Unassigned) {
        report.unassigned_issues.push(issue.clone());
      }
      if issue.has_category(IssueCategory::Blocked) {
        report.blocked_issues.push(issue.clone());
      }

      let assignee_name = issue.assignee.clone().unwrap_or_else(|| UNASSIGNED.to_string());
      let bucket = report
        .by_assignee
        .entry(assignee_name.clone())
        .or_insert_with(|| AssigneeReport {
          name: assignee_name,
          email: issue.assignee_email.clone(),
          ..AssigneeReport::default()
        });
      if issue.has_category(IssueCategory::Stale) {
        bucket.stale_count += 1;
      }
      if issue.has_category(IssueCategory::Overdue) {
        bucket.overdue_count += 1;
      }
      bucket.issues.push(issue);
    }

    // Most-neglected first; overdue by due date, empty dates first.
    report
      .stale_issues
      .sort_by(|a, b| b.days_since_update.cmp(&a.days_since_update));
    report.overdue_issues.sort_by(|a, b| {
      a.duedate
        .as_deref()
        .unwrap_or("")
        .cmp(b.duedate.as_deref().unwrap_or(""))
    });

    self.reports.set(&cache_key, &report, Some(REPORT_TTL_SECS))?;
    tracing::info!(
      board_id = request.board_id,
      sprint_id = report.sprint_id,
      total = report.summary.total_sprint_issues,
      stale = report.stale_issues.len(),
      overdue = report.overdue_issues.len(),
      "standup report built"
    );

    Ok(report)
  }
}

/// Aggregated view for the `get_sprint_issues` tool: raw status and
/// assignee counts without the problem-category machinery.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintOverview {
  pub sprint_name: String,
  pub total_issues: usize,
  pub by_status: BTreeMap<String, usize>,
  pub by_assignee: BTreeMap<String, usize>,
  pub summary: String,
}

pub async fn build_sprint_overview<S: SprintSource>(source: &S, board_id: u64) -> Result<SprintOverview> {
  let sprint = source
    .get_active_sprint(board_id)
    .await?
    .ok_or_else(|| Error::NotFound(format!("active sprint for board {}", board_id)))?;
  let tickets = source.get_sprint_tickets(sprint.id).await?;

  let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
  let mut by_assignee: BTreeMap<String, usize> = BTreeMap::new();
  for issue in &tickets {
    let status = issue
      .fields
      .status
      .as_ref()
      .map(|s| s.name.clone())
      .unwrap_or_else(|| "Unknown".to_string());
    *by_status.entry(status).or_default() += 1;

    let assignee = issue
      .fields
      .assignee
      .as_ref()
      .map(|a| a.display_name.clone())
      .unwrap_or_else(|| UNASSIGNED.to_string());
    *by_assignee.entry(assignee).or_default() += 1;
  }

  let summary = format!(
    "{}: {} issues across {} assignees",
    sprint.name,
    tickets.len(),
    by_assignee.len()
  );

  Ok(SprintOverview {
    sprint_name: sprint.name,
    total_issues: tickets.len(),
    by_status,
    by_assignee,
    summary,
  })
}
