//! Editor configuration
//!
//! Loaded from YAML text supplied by the caller; the core never reads files
//! itself. Every field has a default so an empty document is a valid config.
//!
//! ```yaml
//! validate_formats: true
//! devices:
//!   - name: lab-probe-16
//!     channels: 16
//!     shanks: 2
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{DeviceCatalog, DeviceSpec};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Assert `format` keywords (e.g. the date-of-birth date-time)
    pub validate_formats: bool,
    /// Extra probe types layered over the built-in catalog
    pub devices: Vec<DeviceSpec>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            validate_formats: true,
            devices: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Parse and check a YAML configuration
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: EditorConfig = if text.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject device specs that cannot be split into shanks, and duplicates
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.devices {
            spec.check()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(CoreError::Config(format!(
                    "device '{}' is listed more than once",
                    spec.name
                )));
            }
        }
        Ok(())
    }

    /// Build the device catalog this configuration describes
    pub fn catalog(&self) -> Result<DeviceCatalog> {
        DeviceCatalog::builtin().with_devices(self.devices.iter().cloned())
    }
}
