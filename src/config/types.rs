//! Configuration type definitions.

use crate::draw::Color;
use crate::util;
use serde::{Deserialize, Serialize};

/// Color given either as a palette name or as RGB(A) components.
///
/// Accepts `"red"` or `[1.0, 0.0, 0.0]` / `[1.0, 0.0, 0.0, 0.5]` in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named palette color (red, green, blue, yellow, orange, pink, white, black)
    Named(String),
    /// RGB components, 0.0-1.0, fully opaque
    Rgb([f64; 3]),
    /// RGBA components, 0.0-1.0
    Rgba([f64; 4]),
}

impl ColorSpec {
    /// Resolves to a concrete color; `None` for unknown names.
    pub fn to_color(&self) -> Option<Color> {
        match self {
            ColorSpec::Named(name) => util::name_to_color(name),
            ColorSpec::Rgb([r, g, b]) => Some(Color::new(*r, *g, *b, 1.0)),
            ColorSpec::Rgba([r, g, b, a]) => Some(Color::new(*r, *g, *b, *a)),
        }
    }
}

/// Drawing defaults applied when a button has no explicit preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingConfig {
    /// Default pen color - a named color or an RGB array
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Stroke width at zero pressure, in pixels (valid range: 0.0 - 200.0)
    #[serde(default = "default_min_width")]
    pub min_width: f64,

    /// Stroke width at full pressure, in pixels (valid range: 0.0 - 200.0)
    #[serde(default = "default_max_width")]
    pub max_width: f64,

    /// Arrowhead scale for the default pen; 0 disables arrowheads
    #[serde(default)]
    pub arrow_size: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            min_width: default_min_width(),
            max_width: default_max_width(),
            arrow_size: 0.0,
        }
    }
}

/// One tool preset, attached to a device button in `[tools]` or
/// `[devices."<name>"]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolPreset {
    /// Tool kind: "pen", "eraser", "line", or "rect"
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Stroke color (ignored by the eraser, which clears alpha)
    #[serde(default = "default_color")]
    pub color: ColorSpec,

    /// Stroke width at zero pressure (valid range: 0.0 - 200.0)
    #[serde(default = "default_min_width")]
    pub min_width: f64,

    /// Stroke width at full pressure (valid range: 0.0 - 200.0)
    #[serde(default = "default_max_width")]
    pub max_width: f64,

    /// Arrowhead scale; 0 disables the end-of-stroke arrowhead
    #[serde(default)]
    pub arrow_size: f64,
}

impl Default for ToolPreset {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            color: default_color(),
            min_width: default_min_width(),
            max_width: default_max_width(),
            arrow_size: 0.0,
        }
    }
}

/// Remote-control socket settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Socket file name created under `$XDG_RUNTIME_DIR`
    #[serde(default = "default_socket_name")]
    pub socket_name: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            socket_name: default_socket_name(),
        }
    }
}

fn default_color() -> ColorSpec {
    ColorSpec::Named("red".to_string())
}

fn default_kind() -> String {
    "pen".to_string()
}

fn default_min_width() -> f64 {
    1.0
}

fn default_max_width() -> f64 {
    7.0
}

fn default_socket_name() -> String {
    "multimark.sock".to_string()
}
