//! Document-level collection editing
//!
//! Dispatches add / remove / duplicate to the named collection of a
//! `SessionDocument`, using each item type's default as the add template.
//! Electrode groups go through the electrode sync engine so cascades and
//! ntrode renumbering always happen. Channel maps are not a `Collection`:
//! they follow their electrode group and are only edited in place.

use serde::{Deserialize, Serialize};
use session_types::{ElectrodeGroup, SessionDocument};

use crate::collection::{self, CollectionItem};
use crate::electrode_sync::ElectrodeSync;

/// Editable collections of a session document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    ExperimenterName,
    Keywords,
    DeviceName,
    DataAcqDevice,
    Cameras,
    Tasks,
    AssociatedFiles,
    AssociatedVideoFiles,
    BehavioralEvents,
    ElectrodeGroups,
    OptoExcitationSource,
    OpticalFiber,
    VirusInjection,
}

impl Collection {
    /// Every editable collection, in form order
    pub const ALL: [Collection; 13] = [
        Collection::ExperimenterName,
        Collection::Keywords,
        Collection::DeviceName,
        Collection::DataAcqDevice,
        Collection::Cameras,
        Collection::Tasks,
        Collection::AssociatedFiles,
        Collection::AssociatedVideoFiles,
        Collection::BehavioralEvents,
        Collection::ElectrodeGroups,
        Collection::OptoExcitationSource,
        Collection::OpticalFiber,
        Collection::VirusInjection,
    ];

    /// Field reference of the collection in the document
    pub fn field(&self) -> &'static str {
        match self {
            Collection::ExperimenterName => "experimenter_name",
            Collection::Keywords => "keywords",
            Collection::DeviceName => "device.name",
            Collection::DataAcqDevice => "data_acq_device",
            Collection::Cameras => "cameras",
            Collection::Tasks => "tasks",
            Collection::AssociatedFiles => "associated_files",
            Collection::AssociatedVideoFiles => "associated_video_files",
            Collection::BehavioralEvents => "behavioral_events",
            Collection::ElectrodeGroups => "electrode_groups",
            Collection::OptoExcitationSource => "opto_excitation_source",
            Collection::OpticalFiber => "optical_fiber",
            Collection::VirusInjection => "virus_injection",
        }
    }
}

#[derive(Clone, Copy)]
enum Op {
    Add,
    Remove(usize),
    Duplicate(usize),
}

fn apply<T: CollectionItem + Default>(items: &[T], op: Op) -> Vec<T> {
    match op {
        Op::Add => collection::add(items, T::default()),
        Op::Remove(index) => collection::remove(items, index),
        Op::Duplicate(index) => collection::duplicate(items, index),
    }
}

impl ElectrodeSync {
    /// Append a default item to `target`
    pub fn add_item(&self, doc: &SessionDocument, target: Collection) -> SessionDocument {
        self.edit(doc, target, Op::Add)
    }

    /// Remove the item at `index` of `target`; out of range is a no-op
    pub fn remove_item(&self, doc: &SessionDocument, target: Collection, index: usize) -> SessionDocument {
        self.edit(doc, target, Op::Remove(index))
    }

    /// Duplicate the item at `index` of `target` into `index + 1`
    pub fn duplicate_item(
        &self,
        doc: &SessionDocument,
        target: Collection,
        index: usize,
    ) -> SessionDocument {
        self.edit(doc, target, Op::Duplicate(index))
    }

    fn edit(&self, doc: &SessionDocument, target: Collection, op: Op) -> SessionDocument {
        let mut out = doc.clone();
        match target {
            Collection::ElectrodeGroups => {
                out = match op {
                    Op::Add => self.on_electrode_group_added(doc, ElectrodeGroup::default()),
                    Op::Remove(index) => self.on_electrode_group_removed(doc, index),
                    Op::Duplicate(index) => self.on_electrode_group_duplicated(doc, index),
                };
            }
            Collection::ExperimenterName => out.experimenter_name = apply(&doc.experimenter_name, op),
            Collection::Keywords => out.keywords = apply(&doc.keywords, op),
            Collection::DeviceName => out.device.name = apply(&doc.device.name, op),
            Collection::DataAcqDevice => out.data_acq_device = apply(&doc.data_acq_device, op),
            Collection::Cameras => out.cameras = apply(&doc.cameras, op),
            Collection::Tasks => out.tasks = apply(&doc.tasks, op),
            Collection::AssociatedFiles => out.associated_files = apply(&doc.associated_files, op),
            Collection::AssociatedVideoFiles => {
                out.associated_video_files = apply(&doc.associated_video_files, op)
            }
            Collection::BehavioralEvents => out.behavioral_events = apply(&doc.behavioral_events, op),
            Collection::OptoExcitationSource => {
                out.opto_excitation_source = apply(&doc.opto_excitation_source, op)
            }
            Collection::OpticalFiber => out.optical_fiber = apply(&doc.optical_fiber, op),
            Collection::VirusInjection => out.virus_injection = apply(&doc.virus_injection, op),
        }
        out
    }
}
