//! Domain types produced by the gateway, classifier, and report builder.
//!
//! Reports and sprints are serialized both into the cache and back to tool
//! callers, so everything here derives Serialize/Deserialize with the
//! camelCase field names callers expect.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sprint as tracked by the issue tracker, scoped to a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
  pub id: u64,
  pub name: String,
  pub state: SprintState,
  pub start_date: Option<String>,
  pub end_date: Option<String>,
  pub origin_board_id: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
  Active,
  Future,
  Closed,
}

/// Coarse status bucket derived from the raw status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKind {
  Completed,
  InProgress,
  Todo,
}

/// Problem categories an open issue can fall into. An issue may carry
/// several at once; completed issues carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
  Stale,
  Overdue,
  Unassigned,
  Blocked,
}

/// One issue after classification. Fully detached from the raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedIssue {
  pub key: String,
  pub summary: String,
  pub status: String,
  pub status_kind: StatusKind,
  pub assignee: Option<String>,
  pub assignee_email: Option<String>,
  pub updated: Option<String>,
  pub duedate: Option<String>,
  pub priority: Option<String>,
  pub days_since_update: i64,
  pub url: String,
  pub labels: Vec<String>,
  pub last_comment: Option<LastComment>,
  pub categories: Vec<IssueCategory>,
}

impl CategorizedIssue {
  pub fn has_category(&self, category: IssueCategory) -> bool {
    self.categories.contains(&category)
  }
}

/// Display text and author of an issue's most recent comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastComment {
  pub author: Option<String>,
  pub text: String,
  pub created: Option<String>,
}

/// Per-assignee rollup inside a standup report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeReport {
  pub name: String,
  pub email: Option<String>,
  pub issues: Vec<CategorizedIssue>,
  pub stale_count: usize,
  pub overdue_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintSummary {
  pub total_sprint_issues: usize,
  pub completed_issues: usize,
  pub in_progress_issues: usize,
  pub todo_issues: usize,
  pub project_filtered: bool,
  pub project_key: Option<String>,
}

/// The built report. Immutable once constructed; the renderer never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandupReport {
  pub sprint_name: String,
  pub sprint_id: u64,
  pub date: String,
  pub stale_issues: Vec<CategorizedIssue>,
  pub overdue_issues: Vec<CategorizedIssue>,
  pub unassigned_issues: Vec<CategorizedIssue>,
  pub blocked_issues: Vec<CategorizedIssue>,
  pub by_assignee: BTreeMap<String, AssigneeReport>,
  pub summary: SprintSummary,
}
