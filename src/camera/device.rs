//! Camera device enumeration.

use nokhwa::query;
use nokhwa::utils::ApiBackend;

use super::types::{CameraError, CameraInfo};

/// List all available camera devices on the system.
///
/// If no cameras are found, returns an empty vector (not an error).
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

/// Order in which device indices are probed: the preferred one first, then
/// every other enumerated device in enumeration order.
pub fn probe_order(preferred: u32, devices: &[CameraInfo]) -> Vec<u32> {
    let mut order = vec![preferred];
    for device in devices {
        if !order.contains(&device.index) {
            order.push(device.index);
        }
    }
    order
}
