//! Serde-deserializable types matching Jira API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatus {
  pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUser {
  #[serde(rename = "displayName")]
  pub display_name: String,
  #[serde(rename = "emailAddress")]
  pub email: Option<String>,
  #[serde(rename = "accountId")]
  pub account_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPriority {
  pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiProject {
  pub key: String,
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCommentList {
  #[serde(default)]
  pub comments: Vec<ApiComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiComment {
  pub author: Option<ApiUser>,
  pub body: Option<CommentBody>,
  #[serde(default)]
  pub created: String,
}

/// Comment bodies arrive either as a plain string (API v2) or as a rich
/// document (API v3). Anything else is kept raw and rendered as a
/// placeholder downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentBody {
  Text(String),
  Doc(AdfDoc),
  Unrecognized(Value),
}

/// Minimal slice of the rich-document format: nested typed nodes where
/// `text` nodes carry the visible content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdfDoc {
  #[serde(default)]
  pub content: Vec<AdfNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdfNode {
  #[serde(rename = "type", default)]
  pub node_type: String,
  pub text: Option<String>,
  #[serde(default)]
  pub content: Vec<AdfNode>,
}

// ============================================================================
// Issue fields
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiIssueFields {
  #[serde(default)]
  pub summary: String,
  pub status: Option<ApiStatus>,
  pub assignee: Option<ApiUser>,
  pub priority: Option<ApiPriority>,
  pub project: Option<ApiProject>,
  #[serde(default)]
  pub labels: Vec<String>,
  pub created: Option<String>,
  pub updated: Option<String>,
  pub duedate: Option<String>,
  #[serde(default)]
  pub comment: ApiCommentList,
}

/// One issue exactly as the upstream returned it. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIssue {
  pub key: String,
  #[serde(default)]
  pub fields: ApiIssueFields,
}

// ============================================================================
// Sprint endpoints
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSprint {
  pub id: u64,
  pub name: String,
  pub state: String,
  #[serde(rename = "startDate")]
  pub start_date: Option<String>,
  #[serde(rename = "endDate")]
  pub end_date: Option<String>,
  #[serde(rename = "originBoardId")]
  pub origin_board_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSprintListResponse {
  #[serde(default)]
  pub values: Vec<ApiSprint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSprintIssuesResponse {
  #[serde(default)]
  pub issues: Vec<RawIssue>,
  #[serde(rename = "startAt", default)]
  pub start_at: u64,
  #[serde(rename = "maxResults", default)]
  pub max_results: u64,
  #[serde(default)]
  pub total: u64,
}

// ============================================================================
// Issue create / update
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCreatedIssue {
  pub key: String,
}

/// Field values accepted by `update_issue`. The upstream takes arbitrary
/// field sets; these are the shapes we know how to build, everything else
/// passes through raw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdateFieldValue {
  Text(String),
  Named {
    name: String,
  },
  User {
    #[serde(rename = "accountId")]
    account_id: String,
  },
  Raw(Value),
}

/// Normalize one update field into the upstream's wire shape.
pub fn update_field_to_wire(value: &UpdateFieldValue) -> Value {
  match value {
    UpdateFieldValue::Text(s) => Value::String(s.clone()),
    UpdateFieldValue::Named { name } => serde_json::json!({ "name": name }),
    UpdateFieldValue::User { account_id } => serde_json::json!({ "accountId": account_id }),
    UpdateFieldValue::Raw(v) => v.clone(),
  }
}

// ============================================================================
// Upstream error payloads
// ============================================================================

/// Jira error responses carry either `errorMessages` or a field-keyed
/// `errors` map; collapse both into one line for the error taxonomy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
  #[serde(rename = "errorMessages", default)]
  pub error_messages: Vec<String>,
  #[serde(default)]
  pub errors: std::collections::BTreeMap<String, String>,
}

impl ApiErrorBody {
  pub fn into_message(self) -> Option<String> {
    let mut parts = self.error_messages;
    parts.extend(self.errors.into_iter().map(|(field, msg)| format!("{}: {}", field, msg)));
    if parts.is_empty() {
      None
    } else {
      Some(parts.join("; "))
    }
  }
}
