use crate::config::JiraConfig;
use crate::error::{Error, Result};
use crate::jira::api_types::{
  update_field_to_wire, ApiCreatedIssue, ApiErrorBody, ApiSprint, ApiSprintIssuesResponse,
  ApiSprintListResponse, UpdateFieldValue,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Jira REST client: basic auth over email + API token, fixed per-request
/// timeout, errors normalized with status/endpoint/method context.
#[derive(Clone)]
pub struct JiraClient {
  http: reqwest::Client,
  base_url: Url,
  email: String,
  token: String,
}

impl JiraClient {
  pub fn new(config: &JiraConfig, token: String) -> Result<Self> {
    let base_url = Url::parse(&config.url)
      .map_err(|e| Error::Config(format!("invalid Jira base URL {:?}: {}", config.url, e)))?;

    let http = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()
      .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;

    Ok(Self {
      http,
      base_url,
      email: config.email.clone(),
      token,
    })
  }

  /// Site root issue permalinks hang off of, without a trailing slash.
  pub fn browse_base(&self) -> &str {
    self.base_url.as_str().trim_end_matches('/')
  }

  /// Issue permalink shown in reports and tool results.
  pub fn browse_url(&self, issue_key: &str) -> String {
    format!("{}/browse/{}", self.browse_base(), issue_key)
  }

  /// Sprints for a board, filtered by state ("active", "future", "closed").
  pub async fn get_board_sprints(&self, board_id: u64, state: &str) -> Result<Vec<ApiSprint>> {
    let endpoint = format!("/rest/agile/1.0/board/{}/sprint?state={}", board_id, state);
    let response: ApiSprintListResponse = self.request(Method::GET, &endpoint, None).await?;
    Ok(response.values)
  }

  /// One page of issues in a sprint.
  pub async fn get_sprint_issues_page(
    &self,
    sprint_id: u64,
    start_at: u64,
    max_results: u64,
  ) -> Result<ApiSprintIssuesResponse> {
    let endpoint = format!(
      "/rest/agile/1.0/sprint/{}/issue?startAt={}&maxResults={}",
      sprint_id, start_at, max_results
    );
    self.request(Method::GET, &endpoint, None).await
  }

  pub async fn create_issue(
    &self,
    project: &str,
    summary: &str,
    issue_type: &str,
    description: Option<&str>,
    assignee: Option<&str>,
    priority: Option<&str>,
  ) -> Result<ApiCreatedIssue> {
    let mut fields = serde_json::json!({
      "project": { "key": project },
      "summary": summary,
      "issuetype": { "name": issue_type },
    });
    if let Some(text) = description {
      // API v3 wants descriptions as a rich document.
      fields["description"] = serde_json::json!({
        "type": "doc",
        "version": 1,
        "content": [
          { "type": "paragraph", "content": [{ "type": "text", "text": text }] }
        ]
      });
    }
    if let Some(account_id) = assignee {
      fields["assignee"] = serde_json::json!({ "accountId": account_id });
    }
    if let Some(name) = priority {
      fields["priority"] = serde_json::json!({ "name": name });
    }

    self
      .request(
        Method::POST,
        "/rest/api/3/issue",
        Some(serde_json::json!({ "fields": fields })),
      )
      .await
  }

  pub async fn update_issue(
    &self,
    issue_key: &str,
    fields: &BTreeMap<String, UpdateFieldValue>,
  ) -> Result<()> {
    let wire: serde_json::Map<String, Value> = fields
      .iter()
      .map(|(name, value)| (name.clone(), update_field_to_wire(value)))
      .collect();

    let endpoint = format!("/rest/api/3/issue/{}", issue_key);
    // 204 No Content on success; request() tolerates the empty body.
    self
      .request::<Value>(
        Method::PUT,
        &endpoint,
        Some(serde_json::json!({ "fields": Value::Object(wire) })),
      )
      .await?;
    Ok(())
  }

  async fn request<T: DeserializeOwned>(
    &self,
    method: Method,
    endpoint: &str,
    body: Option<Value>,
  ) -> Result<T> {
    let url = self
      .base_url
      .join(endpoint)
      .map_err(|e| Error::Internal(format!("bad endpoint {:?}: {}", endpoint, e)))?;
    let method_name = method.to_string();

    let mut request = self
      .http
      .request(method, url)
      .basic_auth(&self.email, Some(&self.token))
      .header("Accept", "application/json");
    if let Some(body) = body {
      request = request.json(&body);
    }

    let response = request
      .send()
      .await
      .map_err(|e| Error::from_reqwest(e, &method_name, endpoint))?;

    let status = response.status();
    if !status.is_success() {
      return Err(self.error_from_response(status, response, &method_name, endpoint).await);
    }

    let bytes = response
      .bytes()
      .await
      .map_err(|e| Error::from_reqwest(e, &method_name, endpoint))?;
    if bytes.is_empty() {
      // Some write endpoints respond 204 with no body.
      return serde_json::from_slice(b"null").map_err(|e| {
        Error::Internal(format!("{} {} returned no body: {}", method_name, endpoint, e))
      });
    }

    serde_json::from_slice(&bytes).map_err(|e| {
      Error::Internal(format!(
        "{} {} returned an unexpected payload: {}",
        method_name, endpoint, e
      ))
    })
  }

  async fn error_from_response(
    &self,
    status: StatusCode,
    response: reqwest::Response,
    method: &str,
    endpoint: &str,
  ) -> Error {
    let message = match response.json::<ApiErrorBody>().await {
      Ok(body) => body.into_message(),
      Err(_) => None,
    }
    .unwrap_or_else(|| {
      status
        .canonical_reason()
        .unwrap_or("upstream request failed")
        .to_string()
    });

    Error::Api {
      status: status.as_u16(),
      endpoint: endpoint.to_string(),
      method: method.to_string(),
      message,
    }
  }
}
