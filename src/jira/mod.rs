//! Jira upstream access: wire types, raw client, and the cached gateway.

pub mod api_types;
pub mod client;
pub mod gateway;
pub mod types;

pub use client::JiraClient;
pub use gateway::{JiraGateway, SprintSource};
