//! Slack Web API access.

pub mod client;

pub use client::SlackClient;
