//! Multi-device input routing.
//!
//! This module turns raw pointer events from any number of physical devices
//! into drawing actions against the shared canvas. Each device carries its
//! own grab flag, resolved tool, stroke anchor, and coordinate history; the
//! [`InputRouter`] sequences everything through one control path.

pub mod device;
pub mod events;
pub mod history;
pub mod router;

// Re-export commonly used types at module level
pub use device::{DeviceId, DeviceInfo, DeviceState, SourceId};
pub use events::{ButtonEvent, ButtonMask, HistorySample, MotionEvent};
pub use history::{ArrowParams, CoordinateHistory};
pub use router::{InputRouter, ToolResolver, pressure_width};
