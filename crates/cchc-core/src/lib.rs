//! Shared types and configuration for the CCHC topic dashboard.
//!
//! The message row schema, the immutable [`Dataset`] table and the
//! [`FilterSelection`] handed in by the presentation layer live here so that
//! the source, analytics, server and CLI crates agree on one shape.

pub mod app_config;
pub mod config;
pub mod messages;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{
    load_app_config, load_app_config_from_env, DEFAULT_DATASET_URL, DEFAULT_USER_AGENT,
};
pub use messages::{Dataset, FilterSelection, MessageId, MessageRow, EXCLUDED_TOPIC};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
