//! Generic pointer event types for cross-backend compatibility.
//!
//! Backend implementations map their native device events to these payloads
//! for unified routing. Coordinates are in canvas pixels; pressure is 0.0-1.0
//! with 1.0 assumed for devices without a pressure axis.

use super::device::{DeviceId, SourceId};

/// Button/modifier bitmask accompanying pointer events.
///
/// The layout follows the X11/GDK convention: modifier bits in the low byte,
/// button N occupying bit `N + 7`. The router folds the pressed button into
/// the mask itself on button-down so tool resolution sees a stable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask(pub u32);

impl ButtonMask {
    /// Returns the mask with the given button's bit set.
    pub fn with_button(self, button: u32) -> Self {
        Self(self.0 | 1 << (button + 7))
    }

    /// Highest-numbered button currently pressed, if any.
    pub fn top_button(self) -> Option<u32> {
        (1..=12).rev().find(|b| self.0 & (1 << (b + 7)) != 0)
    }
}

/// One buffered intermediate motion sample.
///
/// Input layers that coalesce fast motion hand the skipped positions over in
/// batches; replaying them keeps freehand strokes smooth.
#[derive(Debug, Clone, Copy)]
pub struct HistorySample {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
}

/// Button press or release.
#[derive(Debug, Clone)]
pub struct ButtonEvent {
    /// Logical device the event is routed for
    pub device: DeviceId,
    /// Underlying hardware stream that produced the event
    pub source: SourceId,
    pub x: f64,
    pub y: f64,
    /// Button number (1 = primary)
    pub button: u32,
    /// Modifier/button state *before* this press is folded in
    pub mask: ButtonMask,
    pub pressure: f64,
    /// Event timestamp in milliseconds
    pub time: u32,
}

/// Pointer motion.
#[derive(Debug, Clone)]
pub struct MotionEvent {
    pub device: DeviceId,
    pub source: SourceId,
    pub x: f64,
    pub y: f64,
    pub mask: ButtonMask,
    pub pressure: f64,
    pub time: u32,
    /// Coalesced intermediate samples since the last delivered motion,
    /// oldest first. Empty when the input layer delivers every motion.
    pub history: Vec<HistorySample>,
}
