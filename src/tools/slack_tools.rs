//! Slack tool handlers: thin one-call wrappers over the Slack client.

use super::{parse_params, ToolContext};
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

fn default_history_limit() -> u32 {
  10
}

/// Use the explicit channel, or fall back to the configured default.
fn resolve_channel(ctx: &ToolContext, channel: Option<String>) -> Result<String> {
  channel
    .or_else(|| ctx.config.slack.default_channel.clone())
    .filter(|c| !c.trim().is_empty())
    .ok_or_else(|| Error::Validation("channel is required (no default configured)".to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostMessageParams {
  channel: Option<String>,
  text: String,
}

pub(super) async fn post_message(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: PostMessageParams = parse_params("slack_post_message", params)?;
  if p.text.trim().is_empty() {
    return Err(Error::Validation("text must be non-empty".to_string()));
  }
  let channel = resolve_channel(ctx, p.channel)?;
  ctx.slack()?.post_message(&channel, &p.text).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleMessageParams {
  channel: Option<String>,
  text: String,
  /// Unix timestamp for delivery
  post_at: i64,
}

pub(super) async fn schedule_message(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: ScheduleMessageParams = parse_params("slack_schedule_message", params)?;
  if p.text.trim().is_empty() {
    return Err(Error::Validation("text must be non-empty".to_string()));
  }
  if p.post_at <= 0 {
    return Err(Error::Validation("postAt must be a future unix timestamp".to_string()));
  }
  let channel = resolve_channel(ctx, p.channel)?;
  ctx.slack()?.schedule_message(&channel, &p.text, p.post_at).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddReminderParams {
  text: String,
  /// Natural-language or timestamp time spec, passed through verbatim
  time: String,
}

pub(super) async fn add_reminder(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: AddReminderParams = parse_params("slack_add_reminder", params)?;
  if p.text.trim().is_empty() || p.time.trim().is_empty() {
    return Err(Error::Validation("text and time must be non-empty".to_string()));
  }
  ctx.slack()?.add_reminder(&p.text, &p.time).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelHistoryParams {
  channel: Option<String>,
  #[serde(default = "default_history_limit")]
  limit: u32,
}

pub(super) async fn channel_history(ctx: &ToolContext, params: Value) -> Result<Value> {
  let p: ChannelHistoryParams = parse_params("slack_channel_history", params)?;
  let channel = resolve_channel(ctx, p.channel)?;
  ctx.slack()?.channel_history(&channel, p.limit.min(100)).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn history_limit_defaults() {
    let p: ChannelHistoryParams =
      serde_json::from_value(serde_json::json!({ "channel": "#eng" })).unwrap();
    assert_eq!(p.limit, 10);
  }
}
