//! Error types for the session editor core
//!
//! Validation never fails - it reports `Issue`s. `CoreError` covers the
//! operations around it that can: building a validator from a schema,
//! loading configuration, and the YAML codec.

use session_types::Issue;
use thiserror::Error;

/// Main error type for the editor core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid device spec '{name}': {reason}")]
    DeviceSpec { name: String, reason: String },

    #[error("Document has {} validation issue(s); first: {}", .0.len(), first_issue(.0))]
    Invalid(Vec<Issue>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn first_issue(issues: &[Issue]) -> String {
    issues
        .first()
        .map(|i| i.to_string())
        .unwrap_or_else(|| "none".to_string())
}

impl CoreError {
    /// Issues carried by an `Invalid` error, empty otherwise
    pub fn issues(&self) -> &[Issue] {
        match self {
            CoreError::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

/// Result type alias for editor core operations
pub type Result<T> = std::result::Result<T, CoreError>;
