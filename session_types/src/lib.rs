//! Session Types - Level 1 Foundation Types
//!
//! Pure data structures for a recording-session metadata document. The field
//! names are the wire names of the session YAML file, so a document serializes
//! to exactly the shape the metadata schema describes.
//!
//! ## Contents
//!
//! - `SessionDocument` and its nested records
//! - `ChannelMap` (the "ntrode" record) linking a probe shank to global channels
//! - `Issue`, `IssueCode`, `Severity` for validation findings
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - editing, validation and import live in the editor core
//! 2. **SERIALIZABLE** - every type supports serde
//! 3. **TOLERANT** - every record is `#[serde(default)]` so partially-authored
//!    files deserialize with missing fields defaulted

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// DOCUMENT ROOT
// ============================================================================

/// Full in-memory metadata record for one recording session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDocument {
    pub experimenter_name: Vec<String>,
    pub lab: String,
    pub institution: String,
    pub experiment_description: String,
    pub session_description: String,
    pub session_id: String,
    pub keywords: Vec<String>,
    pub subject: Subject,
    pub data_acq_device: Vec<DataAcqDevice>,
    pub cameras: Vec<Camera>,
    pub tasks: Vec<Task>,
    pub associated_files: Vec<AssociatedFile>,
    pub associated_video_files: Vec<AssociatedVideoFile>,
    pub units: Units,
    pub times_period_multiplier: f64,
    pub raw_data_to_volts: f64,
    pub default_header_file_path: String,
    pub behavioral_events: Vec<BehavioralEvent>,
    pub device: Device,
    pub electrode_groups: Vec<ElectrodeGroup>,
    pub ntrode_electrode_group_channel_map: Vec<ChannelMap>,
    pub opto_excitation_source: Vec<OptoExcitationSource>,
    pub optical_fiber: Vec<OpticalFiber>,
    pub virus_injection: Vec<VirusInjection>,
}

impl Default for SessionDocument {
    fn default() -> Self {
        Self {
            experimenter_name: Vec::new(),
            lab: String::new(),
            institution: String::new(),
            experiment_description: String::new(),
            session_description: String::new(),
            session_id: String::new(),
            keywords: Vec::new(),
            subject: Subject::default(),
            data_acq_device: Vec::new(),
            cameras: Vec::new(),
            tasks: Vec::new(),
            associated_files: Vec::new(),
            associated_video_files: Vec::new(),
            units: Units::default(),
            times_period_multiplier: 1.0,
            raw_data_to_volts: 1.0,
            default_header_file_path: String::new(),
            behavioral_events: Vec::new(),
            device: Device::default(),
            electrode_groups: Vec::new(),
            ntrode_electrode_group_channel_map: Vec::new(),
            opto_excitation_source: Vec::new(),
            optical_fiber: Vec::new(),
            virus_injection: Vec::new(),
        }
    }
}

impl SessionDocument {
    /// Create an empty document with every field at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel maps owned by an electrode group, in document order
    pub fn channel_maps_for(&self, electrode_group_id: i64) -> impl Iterator<Item = &ChannelMap> {
        self.ntrode_electrode_group_channel_map
            .iter()
            .filter(move |m| m.electrode_group_id == electrode_group_id)
    }

    /// Find an electrode group by id
    pub fn electrode_group(&self, id: i64) -> Option<&ElectrodeGroup> {
        self.electrode_groups.iter().find(|g| g.id == id)
    }
}

// ============================================================================
// SUBJECT
// ============================================================================

/// Biological sex of the subject, using the single-letter wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "U")]
    Unknown,
    #[serde(rename = "O")]
    Other,
}

impl Sex {
    /// Every accepted wire code
    pub const CODES: [&'static str; 4] = ["M", "F", "U", "O"];

    pub fn as_code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Unknown => "U",
            Sex::Other => "O",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Sex::Male),
            "F" => Some(Sex::Female),
            "U" => Some(Sex::Unknown),
            "O" => Some(Sex::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subject {
    pub description: String,
    pub genotype: String,
    pub sex: Sex,
    pub species: String,
    pub subject_id: String,
    /// Weight in grams
    pub weight: f64,
    /// ISO 8601 date-time string
    pub date_of_birth: String,
}

// ============================================================================
// HARDWARE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataAcqDevice {
    pub name: String,
    pub system: String,
    pub amplifier: String,
    pub adc_circuit: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub id: i64,
    pub meters_per_pixel: f64,
    pub manufacturer: String,
    pub model: String,
    pub lens: String,
    pub camera_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
    pub name: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Units {
    pub analog: String,
    pub behavioral_events: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            analog: "1".to_string(),
            behavioral_events: "1".to_string(),
        }
    }
}

// ============================================================================
// TASKS AND FILES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub task_name: String,
    pub task_description: String,
    pub task_environment: String,
    /// Ids of the cameras recording this task
    pub camera_id: Vec<i64>,
    pub task_epochs: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociatedFile {
    pub name: String,
    pub description: String,
    pub path: String,
    pub task_epochs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociatedVideoFile {
    pub name: String,
    pub camera_id: i64,
    pub task_epochs: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehavioralEvent {
    pub description: String,
    pub name: String,
}

// ============================================================================
// ELECTRODES
// ============================================================================

/// A recording probe implanted at one location.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectrodeGroup {
    pub id: i64,
    pub location: String,
    pub device_type: String,
    pub description: String,
    pub targeted_location: String,
    pub targeted_x: f64,
    pub targeted_y: f64,
    pub targeted_z: f64,
    pub units: String,
}

/// One shank's channel map ("ntrode" record).
///
/// `map` goes from the shank's local channel index to the probe-wide channel
/// index. `ntrode_id` is numbered document-wide; 0 means not yet numbered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelMap {
    pub ntrode_id: u32,
    pub electrode_group_id: i64,
    pub bad_channels: BTreeSet<u32>,
    pub map: BTreeMap<u32, u32>,
}

// ============================================================================
// OPTOGENETICS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptoExcitationSource {
    pub name: String,
    pub model_name: String,
    pub description: String,
    pub wavelength_in_nm: f64,
    #[serde(rename = "power_in_W")]
    pub power_in_w: f64,
    #[serde(rename = "intensity_in_W_per_m2")]
    pub intensity_in_w_per_m2: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticalFiber {
    pub name: String,
    pub hardware_name: String,
    pub implanted_fiber_description: String,
    pub hemisphere: String,
    pub location: String,
    pub ap_in_mm: f64,
    pub ml_in_mm: f64,
    pub dv_in_mm: f64,
    pub roll_in_deg: f64,
    pub pitch_in_deg: f64,
    pub yaw_in_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VirusInjection {
    pub name: String,
    pub description: String,
    pub virus_name: String,
    pub volume_in_ul: f64,
    pub titer_in_vg_per_ml: f64,
    pub hemisphere: String,
    pub location: String,
    pub ap_in_mm: f64,
    pub ml_in_mm: f64,
    pub dv_in_mm: f64,
}

// ============================================================================
// VALIDATION ISSUES
// ============================================================================

/// Severity of a validation finding. Every finding blocks export, so the
/// only level is `error`; the field stays on the wire for consumers that
/// group findings by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
        }
    }
}

/// Machine-readable category of a validation finding.
///
/// `Reference` and `Dependency` only come from the rules pass; `Duplicate`
/// is raised by both (`uniqueItems` in the schema, id and channel clashes in
/// the rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCode {
    Required,
    Type,
    Pattern,
    Enum,
    Range,
    Format,
    Additional,
    Reference,
    Duplicate,
    Dependency,
    Schema,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::Required => "required",
            IssueCode::Type => "type",
            IssueCode::Pattern => "pattern",
            IssueCode::Enum => "enum",
            IssueCode::Range => "range",
            IssueCode::Format => "format",
            IssueCode::Additional => "additional",
            IssueCode::Reference => "reference",
            IssueCode::Duplicate => "duplicate",
            IssueCode::Dependency => "dependency",
            IssueCode::Schema => "schema",
        }
    }

    /// True for findings that relate several fields to each other
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            IssueCode::Reference | IssueCode::Duplicate | IssueCode::Dependency
        )
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized validation finding.
///
/// `path` uses the field-reference grammar: `name`, `name.child`,
/// `name[index]`, `name[index].child`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
    pub path: String,
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
}

impl Issue {
    /// Create an error-severity issue
    pub fn error(path: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// True if this issue's path points into the given top-level field
    pub fn refers_to_field(&self, field: &str) -> bool {
        match self.path.strip_prefix(field) {
            Some(rest) => rest.is_empty() || rest.starts_with('.') || rest.starts_with('['),
            None => false,
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity.as_str(),
            self.path,
            self.code,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_serializes_every_field() {
        let value = serde_json::to_value(SessionDocument::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 24);
        assert_eq!(obj["subject"]["sex"], "U");
        assert!(obj["ntrode_electrode_group_channel_map"].is_array());
    }

    #[test]
    fn test_channel_map_keys_round_trip_through_json() {
        let mut map = ChannelMap {
            ntrode_id: 1,
            electrode_group_id: 0,
            ..Default::default()
        };
        map.map.insert(0, 4);
        map.map.insert(1, 5);
        map.bad_channels.insert(1);

        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(value["map"]["0"], 4);
        assert_eq!(value["bad_channels"], serde_json::json!([1]));

        let back: ChannelMap = serde_json::from_value(value).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_partial_record_defaults_missing_fields() {
        let camera: Camera = serde_json::from_str(r#"{"id": 3, "model": "X"}"#).unwrap();
        assert_eq!(camera.id, 3);
        assert_eq!(camera.model, "X");
        assert_eq!(camera.lens, "");
    }

    #[test]
    fn test_sex_codes() {
        for code in Sex::CODES {
            assert_eq!(Sex::from_code(code).unwrap().as_code(), code);
        }
        assert_eq!(Sex::from_code("X"), None);
    }

    #[test]
    fn test_issue_refers_to_field_respects_boundaries() {
        let issue = Issue::error("cameras[0].id", IssueCode::Duplicate, "dup");
        assert!(issue.refers_to_field("cameras"));
        assert!(!issue.refers_to_field("camera"));

        let exact = Issue::error("lab", IssueCode::Required, "missing");
        assert!(exact.refers_to_field("lab"));
        assert!(!exact.refers_to_field("la"));
    }

    #[test]
    fn test_issue_severity_is_error() {
        let issue = Issue::error("lab", IssueCode::Required, "missing");
        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(serde_json::to_value(&issue).unwrap()["severity"], "error");
        assert!(serde_json::from_str::<Severity>(r#""warning""#).is_err());
    }

    #[test]
    fn test_yaml_channel_map_uses_integer_keys() {
        let mut map = ChannelMap::default();
        map.map.insert(2, 6);
        let yaml = serde_yaml::to_string(&map).unwrap();
        assert!(yaml.contains("2: 6"), "{yaml}");
    }
}
