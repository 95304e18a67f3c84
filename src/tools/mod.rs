//! The tool surface consumed by the host protocol layer.
//!
//! Each named tool maps to one handler. Dispatch is the single top-level
//! error boundary: params are validated before any upstream I/O, and every
//! error kind comes back as the same structured envelope instead of a
//! fault.

mod jira_tools;
mod slack_tools;

use crate::cache::CacheRegistry;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::jira::{JiraClient, JiraGateway};
use crate::render::CommandEngine;
use crate::report::ReportBuilder;
use crate::slack::SlackClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const TOOL_NAMES: &[&str] = &[
  "create_issue",
  "update_issue",
  "get_sprint_issues",
  "daily_standup_report",
  "generate_standup_pdf",
  "slack_post_message",
  "slack_schedule_message",
  "slack_add_reminder",
  "slack_channel_history",
];

/// Uniform tool response. Exactly one of `data` and `error` is set.
#[derive(Debug, Serialize)]
pub struct ToolResponse {
  pub ok: bool,
  pub tool: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<ToolError>,
}

#[derive(Debug, Serialize)]
pub struct ToolError {
  pub code: &'static str,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub status: Option<u16>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<Value>,
}

impl ToolResponse {
  fn success(tool: &str, data: Value) -> Self {
    Self {
      ok: true,
      tool: tool.to_string(),
      data: Some(data),
      error: None,
    }
  }

  fn failure(tool: &str, err: &Error) -> Self {
    Self {
      ok: false,
      tool: tool.to_string(),
      data: None,
      error: Some(ToolError {
        code: err.code().as_str(),
        message: err.to_string(),
        status: err.status(),
        details: err.details(),
      }),
    }
  }
}

/// Everything the tool handlers need, constructed once at startup and
/// passed in explicitly.
pub struct ToolContext {
  pub(crate) builder: ReportBuilder<JiraGateway>,
  pub(crate) caches: CacheRegistry,
  pub(crate) slack: Option<SlackClient>,
  pub(crate) config: Config,
  pub(crate) pdf_engine: CommandEngine,
}

impl ToolContext {
  /// Wire up clients and caches from loaded configuration. Fails when the
  /// Jira credentials are missing; a missing Slack token is deferred to
  /// Slack tool calls.
  pub fn new(config: Config) -> Result<Self> {
    let token = Config::jira_api_token()?;
    let client = JiraClient::new(&config.jira, token)?;
    let slack = match Config::slack_bot_token() {
      Some(token) => Some(SlackClient::new(token)?),
      None => None,
    };
    Ok(Self::with_clients(config, client, slack))
  }

  /// Wire a context from pre-built clients. Lets callers point at
  /// non-default endpoints (used heavily by the integration tests).
  pub fn with_clients(config: Config, jira: JiraClient, slack: Option<SlackClient>) -> Self {
    let caches = CacheRegistry::new();
    let gateway = JiraGateway::new(jira, caches.clone());
    let builder = ReportBuilder::new(gateway, caches.reports.clone());

    Self {
      builder,
      caches,
      slack,
      config,
      pdf_engine: CommandEngine::default(),
    }
  }

  /// Start the periodic cache sweep; the handle must outlive the context
  /// and be shut down on exit.
  pub fn spawn_sweeper(&self) -> crate::cache::SweeperHandle {
    self.caches.spawn_sweeper()
  }

  pub(crate) fn gateway(&self) -> &JiraGateway {
    self.builder.source()
  }

  pub(crate) fn jira(&self) -> &JiraClient {
    self.gateway().client()
  }

  pub(crate) fn slack(&self) -> Result<&SlackClient> {
    self
      .slack
      .as_ref()
      .ok_or_else(|| Error::Config("Slack bot token not configured".to_string()))
  }

  /// Run one named tool. Never panics or leaks an unhandled error; every
  /// outcome is a [`ToolResponse`].
  pub async fn dispatch(&self, tool: &str, params: Value) -> ToolResponse {
    tracing::info!(tool, "tool invoked");

    let result = match tool {
      "create_issue" => jira_tools::create_issue(self, params).await,
      "update_issue" => jira_tools::update_issue(self, params).await,
      "get_sprint_issues" => jira_tools::get_sprint_issues(self, params).await,
      "daily_standup_report" => jira_tools::daily_standup_report(self, params).await,
      "generate_standup_pdf" => jira_tools::generate_standup_pdf(self, params).await,
      "slack_post_message" => slack_tools::post_message(self, params).await,
      "slack_schedule_message" => slack_tools::schedule_message(self, params).await,
      "slack_add_reminder" => slack_tools::add_reminder(self, params).await,
      "slack_channel_history" => slack_tools::channel_history(self, params).await,
      _ => Err(Error::Validation(format!(
        "unknown tool {:?}; available: {}",
        tool,
        TOOL_NAMES.join(", ")
      ))),
    };

    match result {
      Ok(data) => ToolResponse::success(tool, data),
      Err(err) => {
        tracing::error!(tool, code = err.code().as_str(), error = %err, "tool failed");
        ToolResponse::failure(tool, &err)
      }
    }
  }
}

/// Deserialize tool params, reporting malformed input as a validation
/// error before any I/O happens.
pub(crate) fn parse_params<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T> {
  serde_json::from_value(params).map_err(|e| Error::Validation(format!("{}: {}", tool, e)))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn context() -> ToolContext {
    let config: Config = serde_yaml::from_str(
      "jira:\n  url: https://example.atlassian.net\n  email: dev@example.com\n",
    )
    .unwrap();
    let client = JiraClient::new(&config.jira, "token".into()).unwrap();
    ToolContext::with_clients(config, client, None)
  }

  #[tokio::test]
  async fn unknown_tool_is_a_validation_error() {
    let response = context().dispatch("frobnicate", Value::Null).await;
    assert!(!response.ok);
    let error = response.error.unwrap();
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert!(error.message.contains("frobnicate"));
  }

  #[tokio::test]
  async fn malformed_params_fail_before_any_io() {
    let response = context()
      .dispatch("daily_standup_report", serde_json::json!({ "boardId": "not a number" }))
      .await;
    assert!(!response.ok);
    assert_eq!(response.error.unwrap().code, "VALIDATION_ERROR");
  }

  #[tokio::test]
  async fn slack_tools_report_missing_token_at_call_time() {
    let response = context()
      .dispatch(
        "slack_post_message",
        serde_json::json!({ "channel": "#standup", "text": "hi" }),
      )
      .await;
    assert!(!response.ok);
    let error = response.error.unwrap();
    assert_eq!(error.code, "CONFIG_ERROR");
    assert!(error.message.contains("Slack"));
  }

  #[test]
  fn envelope_shape() {
    let success = ToolResponse::success("t", serde_json::json!({ "x": 1 }));
    let json = serde_json::to_value(&success).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["tool"], "t");
    assert!(json.get("error").is_none());

    let failure = ToolResponse::failure(
      "t",
      &Error::Api {
        status: 503,
        endpoint: "/x".into(),
        method: "GET".into(),
        message: "down".into(),
      },
    );
    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "API_ERROR");
    assert_eq!(json["error"]["status"], 503);
    assert_eq!(json["error"]["details"]["endpoint"], "/x");
  }
}
