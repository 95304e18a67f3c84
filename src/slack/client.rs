use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_BASE: &str = "https://slack.com/api/";

/// Slack Web API client: bearer-token auth, one method per endpoint.
///
/// Slack reports most failures as HTTP 200 with `{ok: false, error}`;
/// those are normalized into the same error taxonomy as real HTTP
/// failures.
#[derive(Clone)]
pub struct SlackClient {
  http: reqwest::Client,
  base_url: Url,
  token: String,
}

#[derive(Debug, Deserialize)]
struct SlackEnvelope {
  ok: bool,
  error: Option<String>,
  #[serde(flatten)]
  rest: Value,
}

impl SlackClient {
  pub fn new(token: String) -> Result<Self> {
    Self::with_base_url(token, DEFAULT_BASE)
  }

  pub fn with_base_url(token: String, base: &str) -> Result<Self> {
    let base_url = Url::parse(base)
      .map_err(|e| Error::Config(format!("invalid Slack base URL {:?}: {}", base, e)))?;
    let http = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;

    Ok(Self { http, base_url, token })
  }

  pub async fn post_message(&self, channel: &str, text: &str) -> Result<Value> {
    self
      .call(
        "chat.postMessage",
        serde_json::json!({ "channel": channel, "text": text }),
      )
      .await
  }

  pub async fn schedule_message(&self, channel: &str, text: &str, post_at: i64) -> Result<Value> {
    self
      .call(
        "chat.scheduleMessage",
        serde_json::json!({ "channel": channel, "text": text, "post_at": post_at }),
      )
      .await
  }

  pub async fn add_reminder(&self, text: &str, time: &str) -> Result<Value> {
    self
      .call("reminders.add", serde_json::json!({ "text": text, "time": time }))
      .await
  }

  pub async fn channel_history(&self, channel: &str, limit: u32) -> Result<Value> {
    self
      .call(
        "conversations.history",
        serde_json::json!({ "channel": channel, "limit": limit }),
      )
      .await
  }

  async fn call(&self, method: &str, body: Value) -> Result<Value> {
    let url = self
      .base_url
      .join(method)
      .map_err(|e| Error::Internal(format!("bad Slack method {:?}: {}", method, e)))?;

    let response = self
      .http
      .post(url)
      .bearer_auth(&self.token)
      .json(&body)
      .send()
      .await
      .map_err(|e| Error::from_reqwest(e, "POST", method))?;

    let status = response.status();
    if !status.is_success() {
      return Err(Error::Api {
        status: status.as_u16(),
        endpoint: method.to_string(),
        method: "POST".to_string(),
        message: status
          .canonical_reason()
          .unwrap_or("Slack request failed")
          .to_string(),
      });
    }

    let envelope: SlackEnvelope = response
      .json()
      .await
      .map_err(|e| Error::Internal(format!("POST {} returned an unexpected payload: {}", method, e)))?;

    if !envelope.ok {
      return Err(Error::Api {
        status: status.as_u16(),
        endpoint: method.to_string(),
        method: "POST".to_string(),
        message: envelope.error.unwrap_or_else(|| "unknown Slack error".to_string()),
      });
    }

    Ok(envelope.rest)
  }
}
