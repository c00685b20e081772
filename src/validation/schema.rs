//! Schema Validator
//!
//! Structural validation (types, required fields, patterns, ranges, enums,
//! formats) of a session value against the metadata JSON Schema, with each
//! violation converted to an `Issue`.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde_json::Value;
use session_types::{Issue, IssueCode};
use std::sync::{Arc, LazyLock};

use crate::error::{CoreError, Result};
use crate::path::normalize;

/// The session metadata schema (draft-07)
pub const SESSION_SCHEMA: &str = include_str!("../../schema/session_metadata.schema.json");

/// Location of the subject's date of birth
pub const DATE_OF_BIRTH_PATH: &str = "subject.date_of_birth";

pub const DATE_OF_BIRTH_MESSAGE: &str =
    "Date of birth needs to comply with ISO 8601 format (YYYY-MM-DDTHH:MM:SS.sssZ, e.g. 2023-01-04T00:00:00.000Z)";

/// Compiled schema; cheap to clone
#[derive(Clone)]
pub struct SchemaValidator {
    validator: Arc<Validator>,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile an arbitrary schema
    pub fn new(schema: &Value, validate_formats: bool) -> Result<Self> {
        let validator = jsonschema::options()
            .should_validate_formats(validate_formats)
            .build(schema)
            .map_err(|e| CoreError::SchemaCompile(e.to_string()))?;
        Ok(Self {
            validator: Arc::new(validator),
        })
    }

    /// Compile the embedded session metadata schema
    pub fn session(validate_formats: bool) -> Result<Self> {
        let schema: Value = serde_json::from_str(SESSION_SCHEMA)?;
        Self::new(&schema, validate_formats)
    }

    /// All schema violations of `value`, in the order the engine reports them
    pub fn validate(&self, value: &Value) -> Vec<Issue> {
        self.validator
            .iter_errors(value)
            .map(|error| to_issue(&error))
            .collect()
    }
}

static SESSION_VALIDATOR: LazyLock<std::result::Result<SchemaValidator, String>> =
    LazyLock::new(|| SchemaValidator::session(true).map_err(|e| e.to_string()));

/// The embedded session schema, compiled once with format checks on
pub(crate) fn shared_session() -> std::result::Result<&'static SchemaValidator, &'static str> {
    match &*SESSION_VALIDATOR {
        Ok(validator) => Ok(validator),
        Err(message) => Err(message.as_str()),
    }
}

/// Validate against the embedded session schema
pub fn validate_schema(value: &Value) -> Vec<Issue> {
    match shared_session() {
        Ok(validator) => validator.validate(value),
        Err(message) => {
            tracing::error!("Embedded session schema failed to compile: {}", message);
            vec![Issue::error("", IssueCode::Schema, message)]
        }
    }
}

fn to_issue(error: &ValidationError<'_>) -> Issue {
    let schema_path = error.schema_path.to_string();
    let code = code_for_keyword(failing_keyword(&schema_path));

    // Required violations are reported at the parent; point at the field itself
    let path = match &error.kind {
        ValidationErrorKind::Required { property } => property
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| property.to_string()),
        _ => normalize(&error.instance_path.to_string()),
    };

    let message = if path == DATE_OF_BIRTH_PATH {
        DATE_OF_BIRTH_MESSAGE.to_string()
    } else if code == IssueCode::Pattern && is_blank(&error.instance) {
        format!("{} cannot be empty or contain only whitespace", path)
    } else {
        error.to_string()
    };

    Issue::error(path, code, message)
}

fn is_blank(instance: &Value) -> bool {
    instance.as_str().is_some_and(|s| s.trim().is_empty())
}

/// Last segment of a schema location, e.g. `pattern` in `/properties/lab/$ref/pattern`
fn failing_keyword(schema_path: &str) -> &str {
    schema_path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("")
}

fn code_for_keyword(keyword: &str) -> IssueCode {
    match keyword {
        "required" => IssueCode::Required,
        "type" => IssueCode::Type,
        "pattern" => IssueCode::Pattern,
        "enum" | "const" => IssueCode::Enum,
        "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" | "multipleOf"
        | "minItems" | "maxItems" | "minLength" | "maxLength" | "minProperties"
        | "maxProperties" => IssueCode::Range,
        "format" => IssueCode::Format,
        "uniqueItems" => IssueCode::Duplicate,
        "additionalProperties" | "additionalItems" | "unevaluatedProperties" => {
            IssueCode::Additional
        }
        _ => IssueCode::Schema,
    }
}
