//! VRF intersection across selected locations.

use super::{DeviceDirectory, Vrf};
use crate::base::FamilySet;

/// The VRF every device exposes; also the fallback when a location change
/// invalidates the current selection.
pub const DEFAULT_VRF: &str = "default";

/// Result of resolving a location selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationResolution {
    /// VRFs common to every selected location, in the first location's
    /// order.
    pub vrfs: Vec<Vrf>,
    /// The selected VRF, reset to `"default"` if the previous selection
    /// is no longer in the intersection.
    pub query_vrf: String,
    /// Families derived from the intersection's capability counts.
    pub families: FamilySet,
}

/// Compute the VRF intersection and family set for `locations`.
///
/// Elements are compared by id only; an entry from the first location's
/// list survives iff every other location has a VRF with the same id.
/// A single location yields its list unchanged; no locations yield an
/// empty intersection and an empty family set.
pub fn resolve_locations(
    locations: &[String],
    directory: &DeviceDirectory,
    current_vrf: &str,
) -> LocationResolution {
    let mut all_vrfs: Vec<&[Vrf]> = Vec::with_capacity(locations.len());
    for id in locations {
        match directory.get(id) {
            Some(device) => all_vrfs.push(&device.vrfs),
            // Selected ids come from the directory's own configuration;
            // a miss means the caller is malformed, not the selection.
            None => tracing::warn!(location = %id, "unknown location id skipped"),
        }
    }

    let vrfs: Vec<Vrf> = match all_vrfs.split_first() {
        Some((first, rest)) => first
            .iter()
            .filter(|vrf| rest.iter().all(|other| other.iter().any(|o| o.id == vrf.id)))
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    let query_vrf = if current_vrf != DEFAULT_VRF && !vrfs.iter().any(|vrf| vrf.id == current_vrf) {
        tracing::debug!(previous = %current_vrf, "selected VRF left the intersection, falling back");
        DEFAULT_VRF.to_owned()
    } else {
        current_vrf.to_owned()
    };

    let ipv4 = vrfs.iter().filter(|vrf| vrf.ipv4).count();
    let ipv6 = vrfs.iter().filter(|vrf| vrf.ipv6).count();

    LocationResolution {
        vrfs,
        query_vrf,
        families: FamilySet::from_counts(ipv4, ipv6),
    }
}
