use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub jira: JiraConfig,
  #[serde(default)]
  pub slack: SlackConfig,
  #[serde(default)]
  pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraConfig {
  /// Base URL of the Jira site, e.g. "https://example.atlassian.net"
  pub url: String,
  /// Account email paired with the API token for basic auth
  pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackConfig {
  /// Channel used when a tool call omits one
  pub default_channel: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
  /// Days without an update before a non-completed issue counts as stale
  #[serde(default = "default_days_stale")]
  pub days_stale: u32,
  /// Rows shown per category table before the overflow line kicks in
  #[serde(default = "default_preview_rows")]
  pub preview_rows: usize,
}

fn default_days_stale() -> u32 {
  2
}

fn default_preview_rows() -> usize {
  10
}

impl Default for ReportConfig {
  fn default() -> Self {
    Self {
      days_stale: default_days_stale(),
      preview_rows: default_preview_rows(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./standupd.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/standupd/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(Error::Config(format!("config file not found: {}", p.display())));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(Error::Config(
        "no configuration file found; create one at ~/.config/standupd/config.yaml".to_string(),
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("standupd.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("standupd").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| Error::Config(format!("failed to read config file {}: {}", path.display(), e)))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| Error::Config(format!("failed to parse config file {}: {}", path.display(), e)))?;

    if config.jira.url.is_empty() || config.jira.email.is_empty() {
      return Err(Error::Config("jira.url and jira.email are required".to_string()));
    }

    Ok(config)
  }

  /// Get the Jira API token from environment variables.
  ///
  /// Checks STANDUPD_JIRA_TOKEN first, then JIRA_API_TOKEN as fallback.
  /// Required at startup.
  pub fn jira_api_token() -> Result<String> {
    std::env::var("STANDUPD_JIRA_TOKEN")
      .or_else(|_| std::env::var("JIRA_API_TOKEN"))
      .map_err(|_| {
        Error::Config(
          "Jira API token not found; set STANDUPD_JIRA_TOKEN or JIRA_API_TOKEN".to_string(),
        )
      })
  }

  /// Get the Slack bot token from environment variables, if configured.
  ///
  /// Unlike the Jira token this is optional at startup; Slack tools report
  /// the missing token at call time instead.
  pub fn slack_bot_token() -> Option<String> {
    std::env::var("STANDUPD_SLACK_TOKEN")
      .or_else(|_| std::env::var("SLACK_BOT_TOKEN"))
      .ok()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_minimal_config() {
    let yaml = "jira:\n  url: https://example.atlassian.net\n  email: dev@example.com\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.jira.email, "dev@example.com");
    assert_eq!(config.report.days_stale, 2);
    assert_eq!(config.report.preview_rows, 10);
    assert!(config.slack.default_channel.is_none());
  }

  #[test]
  fn report_overrides_apply() {
    let yaml = concat!(
      "jira:\n  url: https://example.atlassian.net\n  email: dev@example.com\n",
      "report:\n  days_stale: 5\n  preview_rows: 3\n",
      "slack:\n  default_channel: \"#standup\"\n",
    );
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.report.days_stale, 5);
    assert_eq!(config.report.preview_rows, 3);
    assert_eq!(config.slack.default_channel.as_deref(), Some("#standup"));
  }
}
