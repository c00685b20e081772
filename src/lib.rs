//! Session Editor - editing, validation and import core for recording-session
//! metadata documents.
//!
//! The presentation layer owns the single authoritative `SessionDocument`
//! and calls into this crate through pure entry points:
//!
//! - Edits: `collection` (generic add / remove / duplicate) and
//!   `electrode_sync` (electrode groups with their channel maps)
//! - Validation: `validate` = schema issues followed by rule issues
//! - Import: `import_candidate` validates a raw candidate and reconciles it
//!   into a complete document
//!
//! # Architecture
//!
//! ```text
//! catalog ──> channel_map ──> electrode_sync ──> document_edit
//!                  collection ─────┘
//! path ──> validation::{schema, rules} ──> reconcile
//! ```
//!
//! # Example
//!
//! ```
//! use session_editor::{electrode_sync, ElectrodeGroup, SessionDocument};
//!
//! let doc = electrode_sync::on_electrode_group_added(
//!     &SessionDocument::new(),
//!     ElectrodeGroup { device_type: "tetrode_12.5".to_string(), ..Default::default() },
//! );
//! let doc = electrode_sync::on_device_type_changed(&doc, 0, "32c-2s8mm6cm-20um-40um-dl");
//! assert_eq!(doc.ntrode_electrode_group_channel_map.len(), 2);
//! ```

pub mod catalog;
pub mod channel_map;
pub mod codec;
pub mod collection;
pub mod config;
pub mod document_edit;
pub mod electrode_sync;
mod error;
pub mod path;
pub mod reconcile;
pub mod validation;

use serde_json::Value;

pub use catalog::{DeviceCatalog, DeviceSpec};
pub use config::EditorConfig;
pub use document_edit::Collection;
pub use electrode_sync::ElectrodeSync;
pub use error::{CoreError, Result};
pub use reconcile::{reconcile, ImportOutcome};
pub use session_types::{ChannelMap, ElectrodeGroup, Issue, IssueCode, SessionDocument, Severity};
pub use validation::{validate, validate_value, DocumentValidator, SchemaValidator};

/// Validate a raw candidate and reconcile it into a complete document
pub fn import_candidate(raw: &Value) -> ImportOutcome {
    reconcile(raw, validate_value(raw))
}

/// Parse session YAML and import it
pub fn import_yaml(text: &str) -> Result<ImportOutcome> {
    let raw = codec::parse_yaml(text)?;
    Ok(import_candidate(&raw))
}

/// Editor core bound to one configuration: device catalog plus compiled schema
#[derive(Debug, Clone)]
pub struct SessionEditor {
    sync: ElectrodeSync,
    validator: DocumentValidator,
}

impl SessionEditor {
    /// Build from configuration
    pub fn new(config: &EditorConfig) -> Result<Self> {
        config.validate()?;
        let catalog = config.catalog()?;
        let schema = SchemaValidator::session(config.validate_formats)?;
        tracing::debug!(
            devices = catalog.device_types().count(),
            validate_formats = config.validate_formats,
            "session editor configured"
        );
        Ok(Self {
            sync: ElectrodeSync::new(catalog),
            validator: DocumentValidator::new(schema),
        })
    }

    /// Build from YAML configuration text
    pub fn from_config_yaml(text: &str) -> Result<Self> {
        Self::new(&EditorConfig::from_yaml_str(text)?)
    }

    /// Electrode and collection transforms using this editor's catalog
    pub fn sync(&self) -> &ElectrodeSync {
        &self.sync
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        self.sync.catalog()
    }

    pub fn validate(&self, doc: &SessionDocument) -> Vec<Issue> {
        self.validator.validate(doc)
    }

    pub fn import_candidate(&self, raw: &Value) -> ImportOutcome {
        reconcile(raw, self.validator.validate_value(raw))
    }

    pub fn import_yaml(&self, text: &str) -> Result<ImportOutcome> {
        let raw = codec::parse_yaml(text)?;
        Ok(self.import_candidate(&raw))
    }

    /// Serialize for export, refusing documents with issues
    pub fn export_yaml(&self, doc: &SessionDocument) -> Result<String> {
        let issues = self.validate(doc);
        if !issues.is_empty() {
            return Err(CoreError::Invalid(issues));
        }
        codec::to_yaml(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_uses_configured_devices() {
        let editor = SessionEditor::from_config_yaml(
            "devices:\n  - name: lab-probe-8\n    channels: 8\n    shanks: 2\n",
        )
        .unwrap();
        let doc = editor.sync().add_item(&SessionDocument::new(), Collection::ElectrodeGroups);
        let doc = editor.sync().on_device_type_changed(&doc, 0, "lab-probe-8");
        assert_eq!(doc.ntrode_electrode_group_channel_map.len(), 2);
        assert_eq!(doc.ntrode_electrode_group_channel_map[1].map[&3], 7);
    }

    #[test]
    fn test_editor_rejects_bad_config() {
        assert!(SessionEditor::from_config_yaml("devices: 3").is_err());
    }

    #[test]
    fn test_editor_export_refuses_invalid() {
        let editor = SessionEditor::new(&EditorConfig::default()).unwrap();
        assert!(matches!(
            editor.export_yaml(&SessionDocument::new()),
            Err(CoreError::Invalid(_))
        ));
    }
}
