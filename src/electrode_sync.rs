//! Electrode Synchronization Engine
//!
//! Keeps `electrode_groups` and `ntrode_electrode_group_channel_map`
//! consistent. Every structural change regenerates, removes or clones the
//! affected channel maps and then renumbers `ntrode_id` across the whole
//! document (1..N in array order) before returning.
//!
//! All transforms are pure: they take `&SessionDocument` and return a new
//! document.

use session_types::{ChannelMap, ElectrodeGroup, SessionDocument};

use crate::catalog::DeviceCatalog;
use crate::channel_map;
use crate::collection;

/// Renumber `ntrode_id` sequentially (1..N) by array order
pub fn renumber_ntrodes(maps: &[ChannelMap]) -> Vec<ChannelMap> {
    let mut out = maps.to_vec();
    renumber_in_place(&mut out);
    out
}

fn renumber_in_place(maps: &mut [ChannelMap]) {
    for (index, map) in maps.iter_mut().enumerate() {
        map.ntrode_id = index as u32 + 1;
    }
}

/// Channel-map synchronization bound to a device catalog
#[derive(Debug, Clone, Default)]
pub struct ElectrodeSync {
    catalog: DeviceCatalog,
}

impl ElectrodeSync {
    pub fn new(catalog: DeviceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    /// Append an electrode group (next id) and generate its channel maps
    pub fn on_electrode_group_added(
        &self,
        doc: &SessionDocument,
        template: ElectrodeGroup,
    ) -> SessionDocument {
        let mut out = doc.clone();
        out.electrode_groups = collection::add(&doc.electrode_groups, template);
        if let Some(added) = out.electrode_groups.last() {
            let maps = channel_map::generate_with(&self.catalog, &added.device_type, added.id);
            out.ntrode_electrode_group_channel_map.extend(maps);
        }
        renumber_in_place(&mut out.ntrode_electrode_group_channel_map);
        out
    }

    /// Set a group's device type and replace its channel maps.
    ///
    /// The group's old maps are removed, one map per shank of the new type is
    /// appended, and every ntrode is renumbered. Unknown `group_id` returns
    /// the document unchanged.
    pub fn on_device_type_changed(
        &self,
        doc: &SessionDocument,
        group_id: i64,
        new_type: &str,
    ) -> SessionDocument {
        let Some(position) = doc.electrode_groups.iter().position(|g| g.id == group_id) else {
            tracing::debug!(group_id, "device type change ignored: no such electrode group");
            return doc.clone();
        };

        let mut out = doc.clone();
        out.electrode_groups[position].device_type = new_type.to_string();

        let before = out.ntrode_electrode_group_channel_map.len();
        out.ntrode_electrode_group_channel_map
            .retain(|m| m.electrode_group_id != group_id);
        let removed = before - out.ntrode_electrode_group_channel_map.len();

        let generated = channel_map::generate_with(&self.catalog, new_type, group_id);
        if generated.is_empty() && !new_type.is_empty() {
            tracing::warn!(group_id, device_type = new_type, "unknown device type, no channel maps generated");
        }
        let added = generated.len();
        out.ntrode_electrode_group_channel_map.extend(generated);
        renumber_in_place(&mut out.ntrode_electrode_group_channel_map);

        tracing::debug!(
            group_id,
            device_type = new_type,
            removed,
            added,
            total = out.ntrode_electrode_group_channel_map.len(),
            "channel maps regenerated"
        );
        out
    }

    /// Remove the electrode group at `index` and every channel map it owns
    pub fn on_electrode_group_removed(&self, doc: &SessionDocument, index: usize) -> SessionDocument {
        let Some(group) = doc.electrode_groups.get(index) else {
            tracing::debug!(index, "electrode group removal ignored: index out of range");
            return doc.clone();
        };
        let group_id = group.id;

        let mut out = doc.clone();
        out.electrode_groups = collection::remove(&doc.electrode_groups, index);
        out.ntrode_electrode_group_channel_map
            .retain(|m| m.electrode_group_id != group_id);
        renumber_in_place(&mut out.ntrode_electrode_group_channel_map);

        tracing::debug!(
            group_id,
            remaining = out.ntrode_electrode_group_channel_map.len(),
            "electrode group removed with its channel maps"
        );
        out
    }

    /// Duplicate the electrode group at `index` together with its channel maps.
    ///
    /// The copy lands at `index + 1` with the next free id; cloned maps are
    /// re-pointed to it and appended after all existing maps.
    pub fn on_electrode_group_duplicated(
        &self,
        doc: &SessionDocument,
        index: usize,
    ) -> SessionDocument {
        let Some(source) = doc.electrode_groups.get(index) else {
            tracing::debug!(index, "electrode group duplicate ignored: index out of range");
            return doc.clone();
        };
        let source_id = source.id;

        let mut out = doc.clone();
        out.electrode_groups = collection::duplicate(&doc.electrode_groups, index);
        let new_id = out.electrode_groups[index + 1].id;

        let clones: Vec<ChannelMap> = doc
            .channel_maps_for(source_id)
            .cloned()
            .map(|mut m| {
                m.electrode_group_id = new_id;
                m
            })
            .collect();
        out.ntrode_electrode_group_channel_map.extend(clones);
        renumber_in_place(&mut out.ntrode_electrode_group_channel_map);

        tracing::debug!(source_id, new_id, "electrode group duplicated");
        out
    }

    /// Point local channel `local` of the map at `map_index` to `global`.
    ///
    /// No-op when the map index is out of range or `local` is not a channel
    /// of that map.
    pub fn set_channel_mapping(
        &self,
        doc: &SessionDocument,
        map_index: usize,
        local: u32,
        global: u32,
    ) -> SessionDocument {
        let mut out = doc.clone();
        if let Some(slot) = out
            .ntrode_electrode_group_channel_map
            .get_mut(map_index)
            .and_then(|m| m.map.get_mut(&local))
        {
            *slot = global;
        }
        out
    }

    /// Flip the bad-channel flag of `channel` in the map at `map_index`.
    ///
    /// Only the map's own local channels can be marked bad.
    pub fn toggle_bad_channel(
        &self,
        doc: &SessionDocument,
        map_index: usize,
        channel: u32,
    ) -> SessionDocument {
        let mut out = doc.clone();
        if let Some(map) = out.ntrode_electrode_group_channel_map.get_mut(map_index) {
            if map.map.contains_key(&channel) && !map.bad_channels.remove(&channel) {
                map.bad_channels.insert(channel);
            }
        }
        out
    }
}

/// Add an electrode group using the built-in catalog
pub fn on_electrode_group_added(doc: &SessionDocument, template: ElectrodeGroup) -> SessionDocument {
    ElectrodeSync::default().on_electrode_group_added(doc, template)
}

/// Change a group's device type using the built-in catalog
pub fn on_device_type_changed(doc: &SessionDocument, group_id: i64, new_type: &str) -> SessionDocument {
    ElectrodeSync::default().on_device_type_changed(doc, group_id, new_type)
}

pub fn on_electrode_group_removed(doc: &SessionDocument, index: usize) -> SessionDocument {
    ElectrodeSync::default().on_electrode_group_removed(doc, index)
}

pub fn on_electrode_group_duplicated(doc: &SessionDocument, index: usize) -> SessionDocument {
    ElectrodeSync::default().on_electrode_group_duplicated(doc, index)
}
