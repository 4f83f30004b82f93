use crate::scrapers::StopReason;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Collection error: {0}")]
    Collect(#[from] CollectError),

    #[error("Page driver error: {0}")]
    Driver(String),

    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Collection ended early: {0}")]
    Aborted(StopReason),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Failures that end a collection run early.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectError {
    #[error("Timed out after {timeout:?} waiting for '{selector}'")]
    PageTimeout { selector: String, timeout: Duration },

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Page driver error: {0}")]
    Driver(String),

    #[error("Invalid selector '{0}'")]
    Selector(String),
}

impl CollectError {
    pub fn driver(msg: impl std::fmt::Display) -> Self {
        Self::Driver(msg.to_string())
    }
}

/// A single listing node could not be turned into a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Listing node snapshot unavailable: {0}")]
    Snapshot(String),

    #[error("Listing node has no element content")]
    EmptyNode,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Failed to load artifact {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("Invalid artifact: {0}")]
    Invalid(String),
}

/// Reasons a single prediction request fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Model not loaded")]
    ServiceUnavailable,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Prediction failed: {0}")]
    PredictionFailed(#[from] ModelError),
}
