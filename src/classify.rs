//! Pure classification of raw issues.
//!
//! Everything here is a function of its inputs: the raw record, the stale
//! threshold, the browse base URL, and an explicit `now`. No I/O, no shared
//! state with the input record.

use crate::jira::api_types::{AdfDoc, CommentBody, RawIssue};
use crate::jira::types::{CategorizedIssue, IssueCategory, LastComment, StatusKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const COMMENT_PREVIEW_CHARS: usize = 200;
const UNSUPPORTED_COMMENT: &str = "(comment format not supported)";

/// Bucket a raw status name into completed / in-progress / todo.
///
/// Completed statuses match exactly (case-insensitive); in-progress is a
/// substring match so names like "In Review" and "QA Testing" land there.
pub fn classify_status(status: &str) -> StatusKind {
  let lower = status.to_lowercase();
  match lower.as_str() {
    "done" | "closed" | "resolved" => StatusKind::Completed,
    _ if lower.contains("progress") || lower.contains("review") || lower.contains("testing") => {
      StatusKind::InProgress
    }
    _ => StatusKind::Todo,
  }
}

/// Whole days since the issue was last touched, preferring `updated` over
/// `created`. Zero when neither timestamp is present or parseable.
pub fn days_since_update(issue: &RawIssue, now: DateTime<Utc>) -> i64 {
  let reference = issue
    .fields
    .updated
    .as_deref()
    .and_then(parse_timestamp)
    .or_else(|| issue.fields.created.as_deref().and_then(parse_timestamp));

  match reference {
    Some(ts) => (now - ts).num_days().max(0),
    None => 0,
  }
}

/// Parse the timestamp shapes Jira emits: RFC 3339, the zone-without-colon
/// variant ("+0200"), and bare dates.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
  if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
    return Some(ts.with_timezone(&Utc));
  }
  if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
    return Some(ts.with_timezone(&Utc));
  }
  if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
    return date_start_utc(date);
  }
  None
}

fn date_start_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
  let start: NaiveDateTime = date.and_hms_opt(0, 0, 0)?;
  Some(Utc.from_utc_datetime(&start))
}

/// Display text for the issue's most recent comment, if any.
pub fn last_comment(issue: &RawIssue) -> Option<LastComment> {
  let comment = issue.fields.comment.comments.last()?;

  let text = match comment.body.as_ref() {
    Some(CommentBody::Text(s)) => truncate(s),
    Some(CommentBody::Doc(doc)) => doc_preview(doc).unwrap_or_else(|| UNSUPPORTED_COMMENT.to_string()),
    Some(CommentBody::Unrecognized(_)) | None => UNSUPPORTED_COMMENT.to_string(),
  };

  Some(LastComment {
    author: comment.author.as_ref().map(|a| a.display_name.clone()),
    text,
    created: if comment.created.is_empty() {
      None
    } else {
      Some(comment.created.clone())
    },
  })
}

/// First paragraph's first text node of a rich-document body.
fn doc_preview(doc: &AdfDoc) -> Option<String> {
  let paragraph = doc.content.first()?;
  let text_node = paragraph.content.first()?;
  text_node.text.as_deref().map(truncate)
}

fn truncate(text: &str) -> String {
  text.chars().take(COMMENT_PREVIEW_CHARS).collect()
}

/// Turn one raw issue into a categorized record.
///
/// Calling this twice with the same inputs yields identical output; the
/// result shares no state with the raw record.
pub fn classify_issue(
  issue: &RawIssue,
  days_stale: u32,
  browse_base: &str,
  now: DateTime<Utc>,
) -> CategorizedIssue {
  let fields = &issue.fields;
  let status = fields
    .status
    .as_ref()
    .map(|s| s.name.clone())
    .unwrap_or_default();
  let status_kind = classify_status(&status);
  let days = days_since_update(issue, now);

  let mut categories = Vec::new();
  // Completed issues carry no categories and never enter category buckets.
  if status_kind != StatusKind::Completed {
    if days > i64::from(days_stale) {
      categories.push(IssueCategory::Stale);
    }
    if let Some(due) = fields.duedate.as_deref() {
      if is_overdue(due, now) {
        categories.push(IssueCategory::Overdue);
      }
    }
    if fields.assignee.is_none() {
      categories.push(IssueCategory::Unassigned);
    }
    if is_blocked(&fields.labels, &status) {
      categories.push(IssueCategory::Blocked);
    }
  }

  CategorizedIssue {
    key: issue.key.clone(),
    summary: fields.summary.clone(),
    status,
    status_kind,
    assignee: fields.assignee.as_ref().map(|a| a.display_name.clone()),
    assignee_email: fields.assignee.as_ref().and_then(|a| a.email.clone()),
    updated: fields.updated.clone(),
    duedate: fields.duedate.clone(),
    priority: fields.priority.as_ref().map(|p| p.name.clone()),
    days_since_update: days,
    url: format!("{}/browse/{}", browse_base.trim_end_matches('/'), issue.key),
    labels: fields.labels.clone(),
    last_comment: last_comment(issue),
    categories,
  }
}

/// A due date counts as overdue once its midnight is strictly in the past.
fn is_overdue(duedate: &str, now: DateTime<Utc>) -> bool {
  match NaiveDate::parse_from_str(duedate, "%Y-%m-%d") {
    Ok(date) => match date_start_utc(date) {
      Some(start) => start < now,
      None => false,
    },
    Err(_) => false,
  }
}

fn is_blocked(labels: &[String], status: &str) -> bool {
  labels
    .iter()
    .any(|l| l.eq_ignore_ascii_case("blocked") || l.eq_ignore_ascii_case("impediment"))
    || status.to_lowercase().contains("blocked")
}
