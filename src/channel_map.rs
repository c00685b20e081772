//! Channel Map Generator
//!
//! Builds the per-shank channel maps for a probe. Generated maps carry
//! `ntrode_id = 0`; numbering is done document-wide by the electrode sync
//! engine so the generator needs no knowledge of the rest of the document.

use session_types::ChannelMap;

use crate::catalog::DeviceCatalog;

/// Generate one channel map per shank of a built-in device type
pub fn generate(device_type: &str, group_id: i64) -> Vec<ChannelMap> {
    generate_with(&DeviceCatalog::builtin(), device_type, group_id)
}

/// Generate one channel map per shank using the given catalog.
///
/// Shank `s` maps local index `i` to `s * channels_per_shank + i`.
/// Unknown types produce no maps.
pub fn generate_with(catalog: &DeviceCatalog, device_type: &str, group_id: i64) -> Vec<ChannelMap> {
    let shanks = catalog.shank_count(device_type);
    if shanks == 0 {
        return Vec::new();
    }
    let per_shank = catalog.channel_count(device_type) / shanks;

    (0..shanks)
        .map(|shank| ChannelMap {
            ntrode_id: 0,
            electrode_group_id: group_id,
            bad_channels: Default::default(),
            map: (0..per_shank)
                .map(|local| (local, shank * per_shank + local))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DeviceSpec;

    #[test]
    fn test_tetrode_single_identity_map() {
        let maps = generate("tetrode_12.5", 7);
        assert_eq!(maps.len(), 1);
        let map = &maps[0];
        assert_eq!(map.electrode_group_id, 7);
        assert_eq!(map.ntrode_id, 0);
        assert!(map.bad_channels.is_empty());
        assert_eq!(
            map.map.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
            vec![(0, 0), (1, 1), (2, 2), (3, 3)]
        );
    }

    #[test]
    fn test_multi_shank_offsets() {
        let maps = generate("128c-4s8mm6cm-20um-40um-sl", 2);
        assert_eq!(maps.len(), 4);
        for (shank, map) in maps.iter().enumerate() {
            assert_eq!(map.map.len(), 32);
            assert_eq!(map.map[&0], shank as u32 * 32);
            assert_eq!(map.map[&31], shank as u32 * 32 + 31);
        }
    }

    #[test]
    fn test_unknown_device_generates_nothing() {
        assert!(generate("mystery", 0).is_empty());
        assert!(generate("", 0).is_empty());
    }

    #[test]
    fn test_custom_catalog_device() {
        let catalog = DeviceCatalog::builtin()
            .with_devices([DeviceSpec::new("lab-probe-6", 6, 3)])
            .unwrap();
        let maps = generate_with(&catalog, "lab-probe-6", 1);
        assert_eq!(maps.len(), 3);
        assert_eq!(maps[2].map[&1], 5);
    }
}
