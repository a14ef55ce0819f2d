//! Configuration file support for multimark.
//!
//! This module handles loading and validating tool presets from the
//! configuration file located at `~/.config/multimark/config.toml`, and
//! turns them into the tool-resolution policy the router consults per
//! device/button-state.
//!
//! If no config file exists, sensible defaults are used automatically: a red
//! pressure pen on button 1 and a wide eraser on button 3.

pub mod types;

// Re-export commonly used types at module level
pub use types::{ColorSpec, DrawingConfig, RemoteConfig, ToolPreset};

use crate::draw::{ToolContext, ToolKind, color};
use crate::input::{ButtonMask, ToolResolver};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [drawing]
/// default_color = "red"
/// min_width = 1.0
/// max_width = 7.0
///
/// [tools.button2]
/// kind = "line"
/// color = "blue"
/// arrow_size = 2.0
///
/// [devices."Wacom Pen".button1]
/// kind = "pen"
/// color = [1.0, 0.5, 0.0]
/// max_width = 12.0
///
/// [remote]
/// socket_name = "multimark.sock"
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for buttons without an explicit preset
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Global per-button tool presets, keyed `button1` .. `button12`
    #[serde(default = "default_tools")]
    pub tools: HashMap<String, ToolPreset>,

    /// Per-device overrides: device name -> buttonN -> preset
    #[serde(default)]
    pub devices: HashMap<String, HashMap<String, ToolPreset>>,

    /// Remote-control socket settings
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            drawing: DrawingConfig::default(),
            tools: default_tools(),
            devices: HashMap::new(),
            remote: RemoteConfig::default(),
        }
    }
}

/// Out-of-the-box presets: pen on the primary button, eraser on button 3.
fn default_tools() -> HashMap<String, ToolPreset> {
    let mut tools = HashMap::new();
    tools.insert("button1".to_string(), ToolPreset::default());
    tools.insert(
        "button3".to_string(),
        ToolPreset {
            kind: "eraser".to_string(),
            max_width: 75.0,
            ..ToolPreset::default()
        },
    );
    tools
}

/// Parses a `buttonN` preset key. Returns `None` for anything else.
fn button_number(key: &str) -> Option<u32> {
    key.strip_prefix("button")?
        .parse()
        .ok()
        .filter(|n| (1..=12).contains(n))
}

fn parse_kind(kind: &str) -> ToolKind {
    match kind.to_lowercase().as_str() {
        "pen" => ToolKind::Pen,
        "eraser" => ToolKind::Eraser,
        "line" => ToolKind::Line,
        "rect" | "rectangle" => ToolKind::Rect,
        other => {
            log::warn!("Unknown tool kind '{other}', falling back to 'pen'");
            ToolKind::Pen
        }
    }
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning
    /// is logged; an unknown color name falls back to red.
    ///
    /// Validated ranges:
    /// - stroke widths: 0.0 - 200.0
    /// - `arrow_size`: 0.0 - 20.0
    fn validate_and_clamp(&mut self) {
        fn clamp_widths(what: &str, min: &mut f64, max: &mut f64, arrow: &mut f64) {
            if !(0.0..=200.0).contains(min) {
                log::warn!("Invalid {what} min_width {min:.1}, clamping to 0.0-200.0 range");
                *min = min.clamp(0.0, 200.0);
            }
            if !(0.0..=200.0).contains(max) {
                log::warn!("Invalid {what} max_width {max:.1}, clamping to 0.0-200.0 range");
                *max = max.clamp(0.0, 200.0);
            }
            if !(0.0..=20.0).contains(arrow) {
                log::warn!("Invalid {what} arrow_size {arrow:.1}, clamping to 0.0-20.0 range");
                *arrow = arrow.clamp(0.0, 20.0);
            }
        }

        clamp_widths(
            "drawing",
            &mut self.drawing.min_width,
            &mut self.drawing.max_width,
            &mut self.drawing.arrow_size,
        );

        let presets = self
            .tools
            .iter_mut()
            .chain(self.devices.values_mut().flat_map(|table| table.iter_mut()));
        for (key, preset) in presets {
            if button_number(key).is_none() {
                log::warn!("Preset key '{key}' is not of the form 'buttonN', it will be ignored");
            }
            clamp_widths(
                key,
                &mut preset.min_width,
                &mut preset.max_width,
                &mut preset.arrow_size,
            );
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g.,
    /// HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("multimark");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from file, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))
            .inspect(|_| info!("Loaded config from {}", config_path.display()))
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(toml_str)?;
        config.validate_and_clamp();
        debug!("Config: {config:?}");
        Ok(config)
    }

    /// Saves the current configuration to file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Builds the tool-resolution policy from the presets.
    pub fn build_tool_table(&self) -> ToolTable {
        let default_pen = Arc::new(ToolContext::new(
            ToolKind::Pen,
            self.drawing.default_color.to_color().unwrap_or_else(|| {
                log::warn!("Unknown default color, falling back to red");
                color::RED
            }),
            self.drawing.min_width,
            self.drawing.max_width,
            self.drawing.arrow_size,
        ));

        let build = |preset: &ToolPreset| {
            Arc::new(ToolContext::new(
                parse_kind(&preset.kind),
                preset.color.to_color().unwrap_or_else(|| {
                    log::warn!("Unknown preset color, falling back to red");
                    color::RED
                }),
                preset.min_width,
                preset.max_width,
                preset.arrow_size,
            ))
        };

        let by_button = self
            .tools
            .iter()
            .filter_map(|(key, preset)| Some((button_number(key)?, build(preset))))
            .collect();

        let by_device = self
            .devices
            .iter()
            .map(|(device, table)| {
                let buttons = table
                    .iter()
                    .filter_map(|(key, preset)| Some((button_number(key)?, build(preset))))
                    .collect();
                (device.clone(), buttons)
            })
            .collect();

        ToolTable {
            default_pen,
            by_button,
            by_device,
        }
    }
}

/// Tool-resolution policy built from the config presets.
///
/// Resolution order for the highest pressed button: the device's own preset,
/// then the global preset, then the default pen. Events with no button bit
/// set resolve nothing.
pub struct ToolTable {
    default_pen: Arc<ToolContext>,
    by_button: HashMap<u32, Arc<ToolContext>>,
    by_device: HashMap<String, HashMap<u32, Arc<ToolContext>>>,
}

impl ToolResolver for ToolTable {
    fn resolve(&self, device_name: &str, mask: ButtonMask) -> Option<Arc<ToolContext>> {
        let button = mask.top_button()?;
        if let Some(tool) = self
            .by_device
            .get(device_name)
            .and_then(|table| table.get(&button))
        {
            return Some(tool.clone());
        }
        if let Some(tool) = self.by_button.get(&button) {
            return Some(tool.clone());
        }
        Some(self.default_pen.clone())
    }
}
