//! Rendering primitives and canvas state (Cairo-based).
//!
//! This module defines the drawing half of the annotation core:
//! - [`Color`]: RGBA color representation with predefined color constants
//! - [`ToolContext`]: immutable per-tool rendering parameters
//! - [`Canvas`]: the shared raster surface all devices draw into
//! - [`UndoStack`]: full-canvas snapshot history
//! - Stroke rendering functions (segments, arrowheads, rectangle outlines)

pub mod canvas;
pub mod color;
pub mod render;
pub mod tool;
pub mod undo;

// Re-export commonly used types at module level
pub use canvas::Canvas;
pub use color::Color;
pub use render::{draw_arrowhead, draw_rect_outline, draw_segment};
pub use tool::{ToolContext, ToolKind};
pub use undo::UndoStack;

// Re-export color constants for public API
#[allow(unused_imports)]
pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, TRANSPARENT, WHITE, YELLOW};
