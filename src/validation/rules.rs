//! Rules Validator
//!
//! Cross-field checks the schema cannot express:
//! 1. Task and video-file camera ids resolve to existing cameras
//! 2. Channel maps point at existing electrode groups
//! 3. Identifiers are unique (cameras, electrode groups, ntrodes)
//! 4. No probe channel is claimed twice within an electrode group. The check
//!    is keyed by (electrode_group_id, channel), not document-wide: every
//!    group's generated maps number channels from 0, so the same channel
//!    number in two groups refers to two different probes.
//! 5. The optogenetics records are provided together or not at all
//!
//! Rules read the raw JSON value and skip anything mistyped (the schema pass
//! reports those), so they run on arbitrary input without failing.

use serde_json::Value;
use session_types::{Issue, IssueCode};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::path::normalize;

/// Top-level fields that form the optogenetics dependency group
pub const OPTOGENETICS_FIELDS: [&str; 3] =
    ["opto_excitation_source", "optical_fiber", "virus_injection"];

/// Run every relational rule
pub fn validate_rules(value: &Value) -> Vec<Issue> {
    let mut issues = Vec::new();

    let camera_ids = ids_of(value, "cameras", "id");
    let group_ids = ids_of(value, "electrode_groups", "id");

    check_task_cameras(value, &camera_ids, &mut issues);
    check_video_cameras(value, &camera_ids, &mut issues);
    check_channel_map_groups(value, &group_ids, &mut issues);
    check_unique(value, "cameras", "id", &mut issues);
    check_unique(value, "electrode_groups", "id", &mut issues);
    check_unique(value, "ntrode_electrode_group_channel_map", "ntrode_id", &mut issues);
    check_channel_assignments(value, &mut issues);
    check_optogenetics(value, &mut issues);

    issues
}

fn array<'a>(value: &'a Value, field: &str) -> &'a [Value] {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn ids_of(value: &Value, collection: &str, field: &str) -> BTreeSet<i64> {
    array(value, collection)
        .iter()
        .filter_map(|item| item.get(field).and_then(Value::as_i64))
        .collect()
}

fn check_task_cameras(value: &Value, camera_ids: &BTreeSet<i64>, issues: &mut Vec<Issue>) {
    for (t, task) in array(value, "tasks").iter().enumerate() {
        for (c, camera) in array(task, "camera_id").iter().enumerate() {
            let Some(id) = camera.as_i64() else { continue };
            if !camera_ids.contains(&id) {
                issues.push(Issue::error(
                    normalize(&format!("/tasks/{t}/camera_id/{c}")),
                    IssueCode::Reference,
                    format!("Task camera_id {id} does not match any camera id"),
                ));
            }
        }
    }
}

fn check_video_cameras(value: &Value, camera_ids: &BTreeSet<i64>, issues: &mut Vec<Issue>) {
    for (v, video) in array(value, "associated_video_files").iter().enumerate() {
        let Some(id) = video.get("camera_id").and_then(Value::as_i64) else {
            continue;
        };
        if !camera_ids.contains(&id) {
            issues.push(Issue::error(
                normalize(&format!("/associated_video_files/{v}/camera_id")),
                IssueCode::Reference,
                format!("Associated video file camera_id {id} does not match any camera id"),
            ));
        }
    }
}

fn check_channel_map_groups(value: &Value, group_ids: &BTreeSet<i64>, issues: &mut Vec<Issue>) {
    for (m, map) in array(value, "ntrode_electrode_group_channel_map")
        .iter()
        .enumerate()
    {
        let Some(id) = map.get("electrode_group_id").and_then(Value::as_i64) else {
            continue;
        };
        if !group_ids.contains(&id) {
            issues.push(Issue::error(
                normalize(&format!("/ntrode_electrode_group_channel_map/{m}/electrode_group_id")),
                IssueCode::Reference,
                format!("electrode_group_id {id} does not match any electrode group"),
            ));
        }
    }
}

fn check_unique(value: &Value, collection: &str, field: &str, issues: &mut Vec<Issue>) {
    let mut seen: HashMap<i64, usize> = HashMap::new();
    for (index, item) in array(value, collection).iter().enumerate() {
        let Some(id) = item.get(field).and_then(Value::as_i64) else {
            continue;
        };
        if let Some(first) = seen.get(&id) {
            issues.push(Issue::error(
                normalize(&format!("/{collection}/{index}/{field}")),
                IssueCode::Duplicate,
                format!("{field} {id} is already used by {collection}[{first}]"),
            ));
        } else {
            seen.insert(id, index);
        }
    }
}

/// A probe channel may be mapped once per electrode group, across all shanks
fn check_channel_assignments(value: &Value, issues: &mut Vec<Issue>) {
    // (electrode group, global channel) -> (map index, local key)
    let mut claimed: HashMap<(i64, u64), (usize, String)> = HashMap::new();

    for (m, record) in array(value, "ntrode_electrode_group_channel_map")
        .iter()
        .enumerate()
    {
        let Some(group) = record.get("electrode_group_id").and_then(Value::as_i64) else {
            continue;
        };
        let Some(map) = record.get("map").and_then(Value::as_object) else {
            continue;
        };

        let mut entries: Vec<(&String, u64)> = map
            .iter()
            .filter_map(|(local, global)| global.as_u64().map(|g| (local, g)))
            .collect();
        entries.sort_by(|(a, _), (b, _)| local_order(a).cmp(&local_order(b)));

        for (local, global) in entries {
            match claimed.get(&(group, global)) {
                Some((other_map, other_local)) => issues.push(Issue::error(
                    normalize(&format!("/ntrode_electrode_group_channel_map/{m}/map/{local}")),
                    IssueCode::Duplicate,
                    format!(
                        "Channel {global} of electrode group {group} is already mapped by ntrode_electrode_group_channel_map[{other_map}].map[{other_local}]"
                    ),
                )),
                None => {
                    claimed.insert((group, global), (m, local.clone()));
                }
            }
        }
    }
}

/// Numeric local keys first, in numeric order
fn local_order(local: &str) -> (u64, &str) {
    (local.parse::<u64>().unwrap_or(u64::MAX), local)
}

fn check_optogenetics(value: &Value, issues: &mut Vec<Issue>) {
    let present: HashSet<&str> = OPTOGENETICS_FIELDS
        .iter()
        .copied()
        .filter(|field| !array(value, field).is_empty())
        .collect();
    if present.is_empty() || present.len() == OPTOGENETICS_FIELDS.len() {
        return;
    }

    let missing: Vec<&str> = OPTOGENETICS_FIELDS
        .iter()
        .copied()
        .filter(|field| !present.contains(field))
        .collect();
    for field in OPTOGENETICS_FIELDS.iter().filter(|f| present.contains(*f)) {
        issues.push(Issue::error(
            *field,
            IssueCode::Dependency,
            format!(
                "{field} requires the other optogenetics records; missing: {}",
                missing.join(", ")
            ),
        ));
    }
}
