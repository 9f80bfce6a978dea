//! Share-list planning for managed folders.
//!
//! Linking must be safe to rerun: a device already on a folder's share list
//! produces no work, and a device named twice is linked once.

use crate::folder_id::is_managed;

/// Devices to add to one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTask {
    /// Target folder.
    pub folder_id: String,
    /// Devices not yet on the folder's share list, in request order.
    pub devices: Vec<String>,
}

/// Members of `wanted` missing from `current`, deduplicated, in `wanted` order.
pub fn missing_members(current: &[String], wanted: &[String]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for device in wanted {
        if !current.contains(device) && !missing.contains(device) {
            missing.push(device.clone());
        }
    }
    missing
}

/// Plan the share-list additions for every managed folder.
///
/// `folders` pairs each folder id with its current share list. Unmanaged
/// folders and folders needing no change are omitted.
pub fn plan_links(
    folders: &[(String, Vec<String>)],
    devices: &[String],
    prefix: &str,
) -> Vec<LinkTask> {
    folders
        .iter()
        .filter(|(folder_id, _)| is_managed(folder_id, prefix))
        .filter_map(|(folder_id, current)| {
            let devices = missing_members(current, devices);
            (!devices.is_empty()).then(|| LinkTask {
                folder_id: folder_id.clone(),
                devices,
            })
        })
        .collect()
}
