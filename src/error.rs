//! Error taxonomy for the tool surface and upstream clients.
//!
//! Every failure that can reach a caller is one of these variants, so the
//! dispatch layer can turn it into a uniform structured response and the
//! retry executor can decide whether a failure is transient.

use serde_json::Value;

pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable error codes included in tool responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
  ConfigError,
  ValidationError,
  ApiError,
  Unauthorized,
  NotFound,
  RateLimited,
  Timeout,
  InternalError,
}

impl ErrorCode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ConfigError => "CONFIG_ERROR",
      Self::ValidationError => "VALIDATION_ERROR",
      Self::ApiError => "API_ERROR",
      Self::Unauthorized => "UNAUTHORIZED",
      Self::NotFound => "NOT_FOUND",
      Self::RateLimited => "RATE_LIMITED",
      Self::Timeout => "TIMEOUT",
      Self::InternalError => "INTERNAL_ERROR",
    }
  }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Missing or invalid required settings. Fatal at startup.
  #[error("configuration error: {0}")]
  Config(String),

  /// Malformed tool input. Reported per-call, never retried, and the call
  /// aborts before any upstream I/O.
  #[error("invalid input: {0}")]
  Validation(String),

  /// Upstream HTTP failure, normalized with request context.
  #[error("{method} {endpoint} failed with status {status}: {message}")]
  Api {
    status: u16,
    endpoint: String,
    method: String,
    message: String,
  },

  /// Upstream request timed out or never connected.
  #[error("{method} {endpoint} timed out: {message}")]
  Network {
    endpoint: String,
    method: String,
    message: String,
  },

  /// Domain object missing upstream (board, sprint, issue).
  #[error("{0} not found")]
  NotFound(String),

  /// Anything uncaught. Carries enough detail to log, never retried.
  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn code(&self) -> ErrorCode {
    match self {
      Self::Config(_) => ErrorCode::ConfigError,
      Self::Validation(_) => ErrorCode::ValidationError,
      Self::Api { status, .. } => match status {
        401 | 403 => ErrorCode::Unauthorized,
        404 => ErrorCode::NotFound,
        429 => ErrorCode::RateLimited,
        _ => ErrorCode::ApiError,
      },
      Self::Network { .. } => ErrorCode::Timeout,
      Self::NotFound(_) => ErrorCode::NotFound,
      Self::Internal(_) => ErrorCode::InternalError,
    }
  }

  /// HTTP status associated with the failure, if the upstream supplied one.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Api { status, .. } => Some(*status),
      _ => None,
    }
  }

  /// Whether the retry executor should consider this failure transient.
  ///
  /// Only server-side failures (5xx), rate limiting (429), and timeouts
  /// qualify. Client errors other than 429 never do.
  pub fn is_transient(&self) -> bool {
    match self {
      Self::Api { status, .. } => *status >= 500 || *status == 429,
      Self::Network { .. } => true,
      _ => false,
    }
  }

  /// Structured details for the tool response envelope.
  pub fn details(&self) -> Option<Value> {
    match self {
      Self::Api {
        status,
        endpoint,
        method,
        ..
      } => Some(serde_json::json!({
        "status": status,
        "endpoint": endpoint,
        "method": method,
      })),
      Self::Network {
        endpoint, method, ..
      } => Some(serde_json::json!({
        "endpoint": endpoint,
        "method": method,
      })),
      _ => None,
    }
  }

  /// Normalize a reqwest transport failure into the taxonomy.
  pub fn from_reqwest(err: reqwest::Error, method: &str, endpoint: &str) -> Self {
    if err.is_timeout() || err.is_connect() {
      Self::Network {
        endpoint: endpoint.to_string(),
        method: method.to_string(),
        message: err.to_string(),
      }
    } else if let Some(status) = err.status() {
      Self::Api {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
        method: method.to_string(),
        message: err.to_string(),
      }
    } else {
      Self::Internal(format!("{} {}: {}", method, endpoint, err))
    }
  }
}
