//! Device Catalog
//!
//! Static lookup from probe device type to its wiring: total channel count
//! and number of independently wired shanks. Lookups are total - an unknown
//! type reports zero channels and zero shanks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, Result};

/// Wiring of one probe type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Device type name as written in `electrode_groups[].device_type`
    pub name: String,
    /// Total channel count across all shanks
    pub channels: u32,
    /// Number of shanks
    pub shanks: u32,
}

impl DeviceSpec {
    pub fn new(name: impl Into<String>, channels: u32, shanks: u32) -> Self {
        Self {
            name: name.into(),
            channels,
            shanks,
        }
    }

    /// Channels wired to each shank
    pub fn channels_per_shank(&self) -> u32 {
        if self.shanks == 0 {
            0
        } else {
            self.channels / self.shanks
        }
    }

    /// Check the spec can be split evenly into shanks
    pub fn check(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::DeviceSpec {
                name: self.name.clone(),
                reason: "name is empty".to_string(),
            });
        }
        if self.shanks == 0 || self.channels == 0 {
            return Err(CoreError::DeviceSpec {
                name: self.name.clone(),
                reason: "channel and shank counts must be positive".to_string(),
            });
        }
        if self.channels % self.shanks != 0 {
            return Err(CoreError::DeviceSpec {
                name: self.name.clone(),
                reason: format!(
                    "{} channels do not divide evenly across {} shanks",
                    self.channels, self.shanks
                ),
            });
        }
        Ok(())
    }
}

/// Probe types every catalog knows about: (name, channels, shanks)
const BUILTIN_DEVICES: &[(&str, u32, u32)] = &[
    ("tetrode_12.5", 4, 1),
    ("A1x32-6mm-50-177-H32_21mm", 32, 1),
    ("128c-4s8mm6cm-20um-40um-sl", 128, 4),
    ("128c-4s6mm6cm-15um-26um-sl", 128, 4),
    ("32c-2s8mm6cm-20um-40um-dl", 32, 2),
    ("64c-4s6mm6cm-20um-40um-dl", 64, 4),
    ("NET-EBL-128ch-single-shank", 128, 1),
];

/// Lookup table of probe types.
///
/// `builtin()` carries the standard probes; `with_devices` layers extra
/// lab-specific probes from configuration on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCatalog {
    devices: BTreeMap<String, DeviceSpec>,
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DeviceCatalog {
    /// Catalog of the standard probe types
    pub fn builtin() -> Self {
        let devices = BUILTIN_DEVICES
            .iter()
            .map(|(name, channels, shanks)| {
                (name.to_string(), DeviceSpec::new(*name, *channels, *shanks))
            })
            .collect();
        Self { devices }
    }

    /// Add (or override) device specs after checking each one
    pub fn with_devices(mut self, specs: impl IntoIterator<Item = DeviceSpec>) -> Result<Self> {
        for spec in specs {
            spec.check()?;
            self.devices.insert(spec.name.clone(), spec);
        }
        Ok(self)
    }

    pub fn get(&self, device_type: &str) -> Option<&DeviceSpec> {
        self.devices.get(device_type)
    }

    pub fn channel_count(&self, device_type: &str) -> u32 {
        self.get(device_type).map(|d| d.channels).unwrap_or(0)
    }

    pub fn shank_count(&self, device_type: &str) -> u32 {
        self.get(device_type).map(|d| d.shanks).unwrap_or(0)
    }

    pub fn is_known(&self, device_type: &str) -> bool {
        self.devices.contains_key(device_type)
    }

    /// Device type names in sorted order (for pick lists)
    pub fn device_types(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(|k| k.as_str())
    }
}

/// Total channel count of a built-in device type (0 if unknown)
pub fn channel_count(device_type: &str) -> u32 {
    builtin_spec(device_type).map(|(_, c, _)| c).unwrap_or(0)
}

/// Shank count of a built-in device type (0 if unknown)
pub fn shank_count(device_type: &str) -> u32 {
    builtin_spec(device_type).map(|(_, _, s)| s).unwrap_or(0)
}

pub fn is_known(device_type: &str) -> bool {
    builtin_spec(device_type).is_some()
}

fn builtin_spec(device_type: &str) -> Option<(&'static str, u32, u32)> {
    BUILTIN_DEVICES
        .iter()
        .copied()
        .find(|(name, _, _)| *name == device_type)
}
