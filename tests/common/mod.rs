//! Shared fixtures for integration tests

#![allow(dead_code)]

use session_editor::electrode_sync::{on_device_type_changed, on_electrode_group_added};
use session_editor::{ElectrodeGroup, SessionDocument};
use session_types::{Camera, DataAcqDevice, Sex, Task};

/// Route editor logs to the test output; set RUST_LOG=session_editor=debug to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn electrode_group(device_type: &str) -> ElectrodeGroup {
    ElectrodeGroup {
        location: "CA1".to_string(),
        device_type: device_type.to_string(),
        description: "Dorsal hippocampus".to_string(),
        targeted_location: "CA1".to_string(),
        targeted_x: 1.5,
        targeted_y: -2.0,
        targeted_z: 3.25,
        units: "mm".to_string(),
        ..Default::default()
    }
}

/// A document that passes both validation stages
pub fn valid_document() -> SessionDocument {
    let mut doc = SessionDocument::new();
    doc.experimenter_name = vec!["Guidera, Jennifer".to_string()];
    doc.lab = "Frank Lab".to_string();
    doc.institution = "University of California, San Francisco".to_string();
    doc.experiment_description = "Spatial alternation".to_string();
    doc.session_description = "W-track run session".to_string();
    doc.session_id = "rat42_01".to_string();
    doc.keywords = vec!["hippocampus".to_string()];
    doc.subject.description = "Long-Evans rat".to_string();
    doc.subject.genotype = "wild type".to_string();
    doc.subject.sex = Sex::Male;
    doc.subject.species = "Rattus norvegicus".to_string();
    doc.subject.subject_id = "Rat42".to_string();
    doc.subject.weight = 450.0;
    doc.subject.date_of_birth = "2023-01-04T00:00:00.000Z".to_string();
    doc.data_acq_device = vec![DataAcqDevice {
        name: "SpikeGadgets".to_string(),
        system: "SpikeGadgets".to_string(),
        amplifier: "Intan".to_string(),
        adc_circuit: "Intan".to_string(),
    }];
    doc.device.name = vec!["Trodes".to_string()];
    doc.cameras = vec![Camera {
        id: 0,
        meters_per_pixel: 0.001,
        manufacturer: "Allied Vision".to_string(),
        model: "Mako G-158C".to_string(),
        lens: "Theia SL183M".to_string(),
        camera_name: "overhead".to_string(),
    }];
    doc.tasks = vec![Task {
        task_name: "run".to_string(),
        task_description: "alternation".to_string(),
        task_environment: "w-track".to_string(),
        camera_id: vec![0],
        task_epochs: vec![1, 3],
    }];

    let doc = on_electrode_group_added(&doc, electrode_group("tetrode_12.5"));
    let doc = on_electrode_group_added(&doc, electrode_group("tetrode_12.5"));
    on_device_type_changed(&doc, 1, "32c-2s8mm6cm-20um-40um-dl")
}

pub fn ntrode_ids(doc: &SessionDocument) -> Vec<u32> {
    doc.ntrode_electrode_group_channel_map
        .iter()
        .map(|m| m.ntrode_id)
        .collect()
}
