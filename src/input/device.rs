//! Device identity and per-device session state.

use super::events::ButtonMask;
use super::history::CoordinateHistory;
use crate::draw::ToolContext;
use std::sync::Arc;

/// Stable opaque key for one logical pointing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u64);

/// Identity of the underlying hardware stream behind a logical device.
///
/// Hybrid hardware (stylus + mouse paired under one logical pointer) switches
/// sources mid-session; a source change forces tool re-resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(pub u64);

/// Enumeration record for a device, as reported by the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    /// Small stable index used by the remote toggle-by-id protocol
    pub index: u32,
    pub name: String,
    /// Devices need at least two axes (x and y) to draw
    pub num_axes: u32,
}

impl DeviceInfo {
    /// True when the device has positional capability.
    pub fn can_draw(&self) -> bool {
        self.num_axes >= 2
    }
}

/// Mutable drawing-session state for one physical device.
///
/// Created lazily on the first event from a device and destroyed when the
/// environment reports the device removed; no state outlives its hardware.
#[derive(Debug)]
pub struct DeviceState {
    pub info: DeviceInfo,
    /// Whether this device currently paints
    pub is_grabbed: bool,
    /// Resolved tool for the current button/modifier combination (shared)
    pub tool: Option<Arc<ToolContext>>,
    /// Mask the current tool was resolved against
    pub button_state: ButtonMask,
    /// Hardware stream that last drove this device
    pub last_source: Option<SourceId>,
    /// Last processed point
    pub last_x: f64,
    pub last_y: f64,
    /// Anchor for shape tools
    pub start_x: f64,
    pub start_y: f64,
    /// Timestamp of the last processed event, ms; 0 outside a stroke
    pub motion_time: u32,
    /// True between button-down and the matching button-up
    pub stroke_active: bool,
    /// Effective pressure width of the stroke in progress
    pub stroke_width: f64,
    /// Recent samples for end-of-stroke arrow geometry
    pub stroke: CoordinateHistory,
}

impl DeviceState {
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            is_grabbed: false,
            tool: None,
            button_state: ButtonMask::default(),
            last_source: None,
            last_x: 0.0,
            last_y: 0.0,
            start_x: 0.0,
            start_y: 0.0,
            motion_time: 0,
            stroke_active: false,
            stroke_width: 0.0,
            stroke: CoordinateHistory::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devices_without_two_axes_cannot_draw() {
        let scroll_wheel = DeviceInfo {
            id: DeviceId(9),
            index: 0,
            name: "wheel".into(),
            num_axes: 1,
        };
        assert!(!scroll_wheel.can_draw());

        let tablet = DeviceInfo {
            id: DeviceId(10),
            index: 1,
            name: "tablet".into(),
            num_axes: 4,
        };
        assert!(tablet.can_draw());
    }

    #[test]
    fn fresh_state_is_ungrabbed_and_idle() {
        let state = DeviceState::new(DeviceInfo {
            id: DeviceId(1),
            index: 0,
            name: "mouse".into(),
            num_axes: 2,
        });
        assert!(!state.is_grabbed);
        assert!(!state.stroke_active);
        assert!(state.tool.is_none());
        assert!(state.stroke.is_empty());
    }
}
