//! Partial import of externally authored session files

mod common;

use common::valid_document;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use session_editor::{codec, import_candidate, import_yaml, IssueCode, SessionDocument};
use session_types::Sex;

fn valid_value() -> Value {
    serde_json::to_value(valid_document()).unwrap()
}

#[test]
fn test_clean_import_adopts_everything() {
    let outcome = import_candidate(&valid_value());
    assert!(outcome.is_clean(), "{:?}", outcome.issues);
    assert_eq!(outcome.document, valid_document());
}

#[test]
fn test_invalid_sex_is_reset_and_reported() {
    common::init_tracing();
    let mut raw = valid_value();
    raw["subject"]["sex"] = json!("X");

    let outcome = import_candidate(&raw);
    assert_eq!(outcome.document.subject.sex, Sex::Unknown);
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].path, "subject.sex");
    assert_eq!(outcome.issues[0].code, IssueCode::Enum);
    // the rest of the document is admitted
    assert_eq!(outcome.document.lab, "Frank Lab");
    assert_eq!(outcome.document.cameras, valid_document().cameras);
}

#[test]
fn test_one_bad_entry_excludes_whole_array() {
    let mut raw = valid_value();
    raw["cameras"][0]["meters_per_pixel"] = json!(-2.0);
    // the task now points at a camera that will not be imported
    let outcome = import_candidate(&raw);

    assert!(outcome.document.cameras.is_empty());
    assert!(outcome
        .issues
        .iter()
        .any(|i| i.path == "cameras[0].meters_per_pixel" && i.code == IssueCode::Range));
    assert_eq!(outcome.document.tasks, valid_document().tasks);
    assert_eq!(
        outcome.document.ntrode_electrode_group_channel_map,
        valid_document().ntrode_electrode_group_channel_map
    );
}

#[test]
fn test_exclusion_granularity() {
    let raw = json!({
        "lab": "Frank Lab",
        "institution": "UCSF",
        "session_id": "s1",
        "session_description": "run",
        "experiment_description": "   "
    });
    let outcome = import_candidate(&raw);
    let doc = outcome.document;
    let defaults = SessionDocument::default();

    assert_eq!(doc.lab, "Frank Lab");
    assert_eq!(doc.institution, "UCSF");
    assert_eq!(doc.session_id, "s1");
    assert_eq!(doc.session_description, "run");
    assert_eq!(doc.experiment_description, defaults.experiment_description);
    assert!(outcome
        .issues
        .iter()
        .any(|i| i.path == "experiment_description" && i.code == IssueCode::Pattern));
}

#[test]
fn test_dangling_reference_excludes_referring_field() {
    let mut raw = valid_value();
    raw["tasks"][0]["camera_id"] = json!([0, 7]);
    let outcome = import_candidate(&raw);

    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].path, "tasks[0].camera_id[1]");
    assert_eq!(outcome.issues[0].code, IssueCode::Reference);
    assert!(outcome.document.tasks.is_empty());
    assert_eq!(outcome.document.cameras.len(), 1);
}

#[test]
fn test_yaml_round_trip_import() {
    let text = codec::export_yaml(&valid_document()).unwrap();
    let outcome = import_yaml(&text).unwrap();
    assert!(outcome.is_clean(), "{:?}", outcome.issues);
    assert_eq!(outcome.document, valid_document());
}

#[test]
fn test_yaml_import_with_missing_fields() {
    let outcome = import_yaml(
        r#"
lab: Frank Lab
subject:
  subject_id: rat7
  sex: male
"#,
    )
    .unwrap();
    assert_eq!(outcome.document.lab, "Frank Lab");
    // subject has an enum issue, so it is not admitted; sex stays unknown
    assert_eq!(outcome.document.subject.subject_id, "");
    assert_eq!(outcome.document.subject.sex, Sex::Unknown);
    assert!(outcome.issues.iter().any(|i| i.path == "institution" && i.code == IssueCode::Required));
}
