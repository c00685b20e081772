//! Two-stage validation
//!
//! The schema pass reports structural issues (required, type, pattern, enum,
//! range, format), the rules pass reports relational ones (reference,
//! duplicate, dependency). The passes are independent; results are
//! concatenated schema-first. Validation never fails - it only returns
//! (possibly empty) issue lists.

pub mod rules;
pub mod schema;

use serde_json::Value;
use session_types::{Issue, IssueCode, SessionDocument};
use std::sync::LazyLock;

pub use rules::validate_rules;
pub use schema::{validate_schema, SchemaValidator};

/// Validator bound to a compiled schema
#[derive(Debug, Clone)]
pub struct DocumentValidator {
    schema: SchemaValidator,
}

impl DocumentValidator {
    pub fn new(schema: SchemaValidator) -> Self {
        Self { schema }
    }

    /// Validate an in-app document
    pub fn validate(&self, doc: &SessionDocument) -> Vec<Issue> {
        match serde_json::to_value(doc) {
            Ok(value) => self.validate_value(&value),
            Err(e) => vec![serialization_issue(e)],
        }
    }

    /// Validate a raw candidate (e.g. an imported file)
    pub fn validate_value(&self, value: &Value) -> Vec<Issue> {
        with_rules(self.schema.validate(value), value)
    }
}

static DEFAULT_VALIDATOR: LazyLock<Option<DocumentValidator>> = LazyLock::new(|| {
    schema::shared_session()
        .ok()
        .map(|schema| DocumentValidator::new(schema.clone()))
});

/// Validate a document against the embedded schema and the rules
pub fn validate(doc: &SessionDocument) -> Vec<Issue> {
    match &*DEFAULT_VALIDATOR {
        Some(validator) => validator.validate(doc),
        None => match serde_json::to_value(doc) {
            Ok(value) => validate_value(&value),
            Err(e) => vec![serialization_issue(e)],
        },
    }
}

/// Validate a raw value against the embedded schema and the rules
pub fn validate_value(value: &Value) -> Vec<Issue> {
    match &*DEFAULT_VALIDATOR {
        Some(validator) => validator.validate_value(value),
        // schema failed to compile; validate_schema reports it
        None => with_rules(validate_schema(value), value),
    }
}

/// Append rule issues after the schema issues
fn with_rules(mut issues: Vec<Issue>, value: &Value) -> Vec<Issue> {
    let structural = issues.len();
    issues.extend(validate_rules(value));
    tracing::debug!(
        structural,
        relational = issues.len() - structural,
        "session document validated"
    );
    issues
}

fn serialization_issue(error: serde_json::Error) -> Issue {
    tracing::warn!("Session document could not be serialized for validation: {}", error);
    Issue::error("", IssueCode::Schema, error.to_string())
}
