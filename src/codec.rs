//! Session YAML codec
//!
//! Text in, text out: the caller owns file dialogs and disk access. Session
//! files use integer keys for channel maps, which JSON objects cannot hold,
//! so YAML is parsed into `serde_yaml::Value` first and converted (keys
//! become decimal strings).

use chrono::NaiveDate;
use serde_json::Value;
use session_types::SessionDocument;

use crate::error::{CoreError, Result};

/// Parse session YAML into a raw candidate for import
pub fn parse_yaml(text: &str) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    Ok(serde_json::to_value(yaml)?)
}

/// Serialize a document without validating it
pub fn to_yaml(doc: &SessionDocument) -> Result<String> {
    Ok(serde_yaml::to_string(doc)?)
}

/// Serialize a document for export; refuses documents with issues
pub fn export_yaml(doc: &SessionDocument) -> Result<String> {
    let issues = crate::validation::validate(doc);
    if !issues.is_empty() {
        tracing::warn!(issues = issues.len(), "Export refused: document has validation issues");
        return Err(CoreError::Invalid(issues));
    }
    to_yaml(doc)
}

/// File name for an exported session: `MMDDYYYY_<subject id>_metadata.yml`
pub fn export_file_name(doc: &SessionDocument, experiment_date: NaiveDate) -> String {
    format!(
        "{}_{}_metadata.yml",
        experiment_date.format("%m%d%Y"),
        doc.subject.subject_id.trim().to_lowercase()
    )
}
