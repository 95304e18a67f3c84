//! standupd: Jira sprint standup reports and Slack tools behind a
//! host-driven tool surface.
//!
//! The host protocol layer calls [`tools::ToolContext::dispatch`] with a
//! tool name and JSON params; the cached gateway, pure classifier,
//! report builder, and renderers all live below that boundary.

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod jira;
pub mod render;
pub mod report;
pub mod retry;
pub mod slack;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};
