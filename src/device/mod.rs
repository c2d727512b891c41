//! Device and VRF records, and the location intersection algorithm.
//!
//! Devices are immutable once loaded from the deployment configuration.
//! [`DeviceDirectory`] is the synchronous lookup seam the controller uses
//! to map a selected location id to its device record.

mod vrf;

pub use vrf::{resolve_locations, LocationResolution, DEFAULT_VRF};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A routing context scoped to one device.
///
/// Identity is the `id` alone: two VRFs from different devices are the
/// same VRF iff their ids are equal, even when their family capabilities
/// differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vrf {
    pub id: String,
    #[serde(default)]
    pub ipv4: bool,
    #[serde(default)]
    pub ipv6: bool,
}

impl Vrf {
    pub fn new(id: impl Into<String>, ipv4: bool, ipv6: bool) -> Self {
        Self {
            id: id.into(),
            ipv4,
            ipv6,
        }
    }
}

/// One selectable network location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    /// Display name shown next to the id.
    #[serde(default)]
    pub name: String,
    pub vrfs: Vec<Vrf>,
}

/// Read-only directory of the configured devices, keyed by id.
///
/// Location ids originate from the same configuration source, so lookups
/// for UI-selected ids always succeed; the directory still returns
/// `Option` so a malformed caller cannot panic the pipeline.
#[derive(Debug, Default)]
pub struct DeviceDirectory {
    devices: HashMap<String, Device>,
}

impl DeviceDirectory {
    pub fn new(devices: impl IntoIterator<Item = Device>) -> Self {
        Self {
            devices: devices
                .into_iter()
                .map(|device| (device.id.clone(), device))
                .collect(),
        }
    }

    /// Load the directory from a JSON array of device records.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let devices: Vec<Device> = serde_json::from_str(raw)?;
        Ok(Self::new(devices))
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
