//! Reconciliation Engine (partial import)
//!
//! Admits the valid subset of an externally authored candidate. With no
//! issues the candidate is adopted wholesale; otherwise each top-level field
//! is admitted whole or not at all:
//!
//! 1. no issue refers to the field
//! 2. the field is present in the candidate
//! 3. its JSON type matches the default's
//!
//! In both cases `subject.sex` is forced to `U` unless it holds a valid code.
//! In-app edits never come through here; they are validated before commit.

use serde::Serialize;
use serde_json::{Map, Value};
use session_types::{Issue, IssueCode, SessionDocument, Sex};

/// Reconciled document plus every issue found in the candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub document: SessionDocument,
    pub issues: Vec<Issue>,
}

impl ImportOutcome {
    /// True when the candidate was adopted without exclusions
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Reconcile a raw candidate against the issues found in it
pub fn reconcile(raw: &Value, mut issues: Vec<Issue>) -> ImportOutcome {
    let defaults = match serde_json::to_value(SessionDocument::default()) {
        Ok(Value::Object(fields)) => fields,
        _ => {
            return ImportOutcome {
                document: SessionDocument::default(),
                issues,
            }
        }
    };

    let empty = Map::new();
    let candidate = match raw.as_object() {
        Some(fields) => fields,
        None => {
            tracing::warn!("Import candidate is not an object; using defaults");
            &empty
        }
    };

    let mut merged = defaults.clone();
    let mut admitted: Vec<&str> = Vec::new();
    let mut excluded: Vec<&str> = Vec::new();

    for (field, default) in &defaults {
        let Some(value) = candidate.get(field) else {
            continue;
        };
        if issues.is_empty() || is_admissible(field, value, default, &issues) {
            merged.insert(field.clone(), value.clone());
            admitted.push(field);
        } else {
            excluded.push(field);
        }
    }

    force_valid_sex(&mut merged);

    if !excluded.is_empty() {
        tracing::warn!(
            excluded = ?excluded,
            issues = issues.len(),
            "Import excluded fields with validation issues"
        );
    }

    let document = match serde_json::from_value::<SessionDocument>(Value::Object(merged.clone())) {
        Ok(document) => document,
        Err(e) => {
            tracing::debug!("Whole-document conversion failed ({}), admitting field by field", e);
            admit_field_by_field(&defaults, &merged, &admitted, &mut issues)
        }
    };

    tracing::info!(
        admitted = admitted.len(),
        excluded = excluded.len(),
        issues = issues.len(),
        "Import reconciled"
    );

    ImportOutcome { document, issues }
}

fn is_admissible(field: &str, value: &Value, default: &Value, issues: &[Issue]) -> bool {
    !issues.iter().any(|issue| issue.refers_to_field(field)) && same_json_type(value, default)
}

fn same_json_type(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn force_valid_sex(fields: &mut Map<String, Value>) {
    let Some(Value::Object(subject)) = fields.get_mut("subject") else {
        return;
    };
    let valid = subject
        .get("sex")
        .and_then(Value::as_str)
        .is_some_and(|code| Sex::from_code(code).is_some());
    if !valid {
        subject.insert(
            "sex".to_string(),
            Value::String(Sex::Unknown.as_code().to_string()),
        );
    }
}

/// Fallback when the merged fields do not form a typed document: keep each
/// admitted field that converts on its own, drop the rest with a `type` issue.
fn admit_field_by_field(
    defaults: &Map<String, Value>,
    merged: &Map<String, Value>,
    admitted: &[&str],
    issues: &mut Vec<Issue>,
) -> SessionDocument {
    let mut accepted = defaults.clone();
    for field in admitted {
        let Some(value) = merged.get(*field) else {
            continue;
        };
        let mut trial = accepted.clone();
        trial.insert(field.to_string(), value.clone());
        match serde_json::from_value::<SessionDocument>(Value::Object(trial.clone())) {
            Ok(_) => accepted = trial,
            Err(e) => {
                tracing::warn!(field = *field, "Imported field dropped: {}", e);
                issues.push(Issue::error(
                    *field,
                    IssueCode::Type,
                    format!("{field} could not be imported: {e}"),
                ));
            }
        }
    }
    serde_json::from_value(Value::Object(accepted)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_no_issues_adopts_candidate() {
        let raw = json!({ "lab": "Frank Lab", "keywords": ["hippocampus"] });
        let outcome = reconcile(&raw, Vec::new());
        assert!(outcome.is_clean());
        assert_eq!(outcome.document.lab, "Frank Lab");
        assert_eq!(outcome.document.keywords, vec!["hippocampus"]);
        assert_eq!(outcome.document.raw_data_to_volts, 1.0);
    }

    #[test]
    fn test_issue_excludes_whole_field() {
        let raw = json!({
            "lab": "Frank Lab",
            "cameras": [{ "id": 0, "camera_name": "ok" }, { "id": "bad" }]
        });
        let issues = vec![Issue::error("cameras[1].id", IssueCode::Type, "not an integer")];
        let outcome = reconcile(&raw, issues);
        assert_eq!(outcome.document.lab, "Frank Lab");
        assert!(outcome.document.cameras.is_empty());
        assert_eq!(outcome.issues.len(), 1);
    }

    #[test]
    fn test_type_mismatch_is_not_admitted() {
        let raw = json!({ "lab": ["not", "a", "string"], "institution": "UCSF" });
        let issues = vec![Issue::error("session_id", IssueCode::Required, "missing")];
        let outcome = reconcile(&raw, issues);
        assert_eq!(outcome.document.lab, "");
        assert_eq!(outcome.document.institution, "UCSF");
    }

    #[test]
    fn test_invalid_sex_forced_to_unknown() {
        let raw = json!({ "subject": { "sex": "X", "subject_id": "rat1" } });
        let issues = vec![Issue::error("lab", IssueCode::Required, "missing")];
        let outcome = reconcile(&raw, issues);
        assert_eq!(outcome.document.subject.sex, Sex::Unknown);
        assert_eq!(outcome.document.subject.subject_id, "rat1");
    }

    #[test]
    fn test_valid_sex_kept() {
        let raw = json!({ "subject": { "sex": "F" } });
        let outcome = reconcile(&raw, Vec::new());
        assert_eq!(outcome.document.subject.sex, Sex::Female);
    }

    #[test]
    fn test_non_object_candidate_gives_defaults() {
        for raw in [json!(null), json!(3), json!("doc"), json!([1, 2])] {
            let outcome = reconcile(&raw, Vec::new());
            assert_eq!(outcome.document, SessionDocument::default());
        }
    }

    #[test]
    fn test_unconvertible_field_falls_back_to_default() {
        // Passes the JSON-type check but cannot become a typed camera list
        let raw = json!({ "lab": "Frank Lab", "cameras": [{ "id": "zero" }] });
        let outcome = reconcile(&raw, Vec::new());
        assert_eq!(outcome.document.lab, "Frank Lab");
        assert!(outcome.document.cameras.is_empty());
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].path, "cameras");
        assert_eq!(outcome.issues[0].code, IssueCode::Type);
    }

    #[test]
    fn test_unknown_top_level_fields_are_ignored() {
        let raw = json!({ "lab": "Frank Lab", "colour": "blue" });
        let outcome = reconcile(&raw, Vec::new());
        assert_eq!(outcome.document.lab, "Frank Lab");
    }
}
