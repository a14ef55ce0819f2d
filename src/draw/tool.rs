//! Drawing tool descriptions.

use super::color::Color;

/// Kind of drawing tool attached to a device button.
///
/// The kind decides both the compositing mode (eraser clears alpha, the rest
/// paint over) and the stroke protocol the router runs: freehand tools draw
/// segment by segment, shape tools redraw a live preview on every motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Freehand drawing - follows the pointer path (default)
    Pen,
    /// Clears alpha along the pointer path instead of painting
    Eraser,
    /// Straight line between stroke start and end, previewed live
    Line,
    /// Rectangle outline from corner to corner, previewed live
    Rect,
}

impl ToolKind {
    /// True for tools that redraw the whole shape on each motion event.
    pub fn is_shape(self) -> bool {
        matches!(self, ToolKind::Line | ToolKind::Rect)
    }
}

/// Immutable rendering parameters for one tool.
///
/// Tool contexts are resolved per device/button-state by the configuration
/// policy and shared between devices (`Arc<ToolContext>`), never owned by a
/// single device.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolContext {
    pub kind: ToolKind,
    pub color: Color,
    /// Stroke width at zero pressure, in pixels
    pub min_width: f64,
    /// Stroke width at full pressure, in pixels
    pub max_width: f64,
    /// Arrowhead scale factor; 0 disables the end-of-stroke arrowhead
    pub arrow_size: f64,
}

impl ToolContext {
    /// Builds a tool context, enforcing `min_width <= max_width`.
    ///
    /// An inverted width range is swapped rather than rejected so a bad
    /// config value degrades to something drawable.
    pub fn new(kind: ToolKind, color: Color, min_width: f64, max_width: f64, arrow_size: f64) -> Self {
        let (min_width, max_width) = if min_width > max_width {
            log::warn!(
                "Tool width range inverted ({min_width:.1} > {max_width:.1}), swapping"
            );
            (max_width, min_width)
        } else {
            (min_width, max_width)
        };
        Self {
            kind,
            color,
            min_width,
            max_width,
            arrow_size,
        }
    }

    /// Cairo compositing operator derived from the tool kind.
    pub fn operator(&self) -> cairo::Operator {
        match self.kind {
            ToolKind::Eraser => cairo::Operator::Clear,
            _ => cairo::Operator::Over,
        }
    }
}
