//! Jira-facing tool handlers.

use super::{parse_params, ToolContext};
use crate::error::{Error, Result};
use crate::jira::api_types::UpdateFieldValue;
use crate::render::render_pdf;
use crate::report::{build_sprint_overview, ReportRequest};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn default_days_stale() -> u32 {
  2
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIssueParams {
  project: String,
  summary: String,
  issue_type: String,
  description: Option<String>,
  assignee: Option<String>,
  priority: Option<String>,
}

pub(super) async fn create_issue(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: CreateIssueParams = parse_params("create_issue", params)?;
  if p.project.trim().is_empty() || p.summary.trim().is_empty() || p.issue_type.trim().is_empty() {
    return Err(Error::Validation(
      "project, summary, and issueType must be non-empty".to_string(),
    ));
  }

  let created = ctx
    .jira()
    .create_issue(
      &p.project,
      &p.summary,
      &p.issue_type,
      p.description.as_deref(),
      p.assignee.as_deref(),
      p.priority.as_deref(),
    )
    .await?;

  Ok(serde_json::json!({
    "issueKey": created.key,
    "browseUrl": ctx.jira().browse_url(&created.key),
  }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateIssueParams {
  issue_key: String,
  fields: BTreeMap<String, UpdateFieldValue>,
}

pub(super) async fn update_issue(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: UpdateIssueParams = parse_params("update_issue", params)?;
  if p.issue_key.trim().is_empty() {
    return Err(Error::Validation("issueKey must be non-empty".to_string()));
  }
  if p.fields.is_empty() {
    return Err(Error::Validation("fields must contain at least one entry".to_string()));
  }

  ctx.jira().update_issue(&p.issue_key, &p.fields).await?;
  // Cached ticket lists and built reports are stale once the write lands;
  // the issue's sprint is unknown here, so both domains are cleared wholesale.
  ctx.caches.issues.invalidate_pattern("issue:tickets:*")?;
  ctx.caches.reports.invalidate_pattern("report:*")?;

  Ok(serde_json::json!({
    "issueKey": p.issue_key,
    "updated": p.fields.keys().collect::<Vec<_>>(),
  }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetSprintIssuesParams {
  board_id: u64,
}

pub(super) async fn get_sprint_issues(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: GetSprintIssuesParams = parse_params("get_sprint_issues", params)?;
  let overview = build_sprint_overview(ctx.gateway(), p.board_id).await?;
  serde_json::to_value(overview).map_err(|e| Error::Internal(e.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyStandupParams {
  board_id: u64,
  project_key: Option<String>,
  #[serde(default = "default_days_stale")]
  days_stale: u32,
  #[serde(default = "default_true")]
  include_unassigned: bool,
}

pub(super) async fn daily_standup_report(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: DailyStandupParams = parse_params("daily_standup_report", params)?;
  let mut report = ctx
    .builder
    .build(&ReportRequest {
      board_id: p.board_id,
      project_key: p.project_key,
      days_stale: p.days_stale,
    })
    .await?;

  // The cached report keeps everything; trimming unassigned data is a
  // per-response choice.
  if !p.include_unassigned {
    report.unassigned_issues.clear();
    report.by_assignee.remove("Unassigned");
  }

  let stats = ctx.caches.reports.stats();
  tracing::debug!(
    hits = stats.hits,
    misses = stats.misses,
    entries = stats.entries,
    "report cache stats"
  );

  serde_json::to_value(report).map_err(|e| Error::Internal(e.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateStandupPdfParams {
  board_id: u64,
  project_key: Option<String>,
  #[serde(default = "default_days_stale")]
  days_stale: u32,
  output_path: Option<PathBuf>,
}

pub(super) async fn generate_standup_pdf(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: GenerateStandupPdfParams = parse_params("generate_standup_pdf", params)?;

  // Any report failure aborts before rendering.
  let report = ctx
    .builder
    .build(&ReportRequest {
      board_id: p.board_id,
      project_key: p.project_key,
      days_stale: p.days_stale,
    })
    .await?;

  let preview_rows = ctx.config.report.preview_rows;
  let (bytes, path_taken) = render_pdf(&report, &ctx.pdf_engine, preview_rows).await;

  let output_path = p.output_path.unwrap_or_else(|| {
    std::env::temp_dir().join(format!("standup-{}-{}.pdf", p.board_id, report.date))
  });
  tokio::fs::write(&output_path, &bytes)
    .await
    .map_err(|e| Error::Internal(format!("failed to write {}: {}", output_path.display(), e)))?;

  tracing::info!(
    path = %output_path.display(),
    bytes = bytes.len(),
    renderer = ?path_taken,
    "standup PDF written"
  );

  Ok(serde_json::json!({
    "filePath": output_path,
    "reportSummary": report.summary,
    "renderer": format!("{:?}", path_taken).to_lowercase(),
  }))
}
