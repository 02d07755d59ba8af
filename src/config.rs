//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/nomouse/config.json`.
//! The top-level schema is split into sections so the file can grow without
//! breaking backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "grid": { "rows": 26, "cols": 26 },
//!   "input": { "timeout_ms": 2000, "click_offset_y": 18 },
//!   "overlay": { "label_color": [1.0, 0.0, 0.0, 0.9] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
///
/// Every section is optional — a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Grid dimensions.
    #[serde(default)]
    pub grid: GridConfig,

    /// Input timing and click placement.
    #[serde(default)]
    pub input: InputConfig,

    /// Fallback screen rectangle, used only by builds without a screen
    /// backend (no `pointer-x11` feature).
    #[serde(default)]
    pub screen: ScreenConfig,

    /// Overlay rendering settings.
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Grid dimensions.
///
/// `rows × cols` may not exceed 676, the number of two-letter codes; the
/// check happens when the overlay is shown, so an oversized config fails
/// loudly instead of silently truncating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of grid rows.
    pub rows: u16,
    /// Number of grid columns.
    pub cols: u16,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 26, cols: 26 }
    }
}

/// Input timing and click placement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Inactivity deadline for a partial code, in milliseconds.
    pub timeout_ms: u64,
    /// Pixels added to the click target's Y coordinate. Compensates for the
    /// label glyph sitting visually higher than the cell's true center; the
    /// displayed label position is unaffected.
    pub click_offset_y: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            click_offset_y: 18,
        }
    }
}

/// Fallback screen rectangle for builds without a screen backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Overlay rendering settings.
///
/// Colors are RGBA components in `0.0..=1.0`. Label font size is derived
/// from the cell size (`min(cell_w, cell_h) / label_divisor`); the buffer
/// is drawn at twice the label size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Color of the per-cell code labels.
    pub label_color: [f64; 4],
    /// Color of the centered in-progress buffer.
    pub buffer_color: [f64; 4],
    /// Divisor applied to the smaller cell dimension to get the label font
    /// size in pixels.
    pub label_divisor: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            label_color: [1.0, 0.0, 0.0, 0.9],
            buffer_color: [1.0, 1.0, 0.0, 1.0],
            label_divisor: 4,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "grid": { "rows": 13, "cols": 20 },
            "input": { "timeout_ms": 1500, "click_offset_y": 0 },
            "screen": { "width": 2560, "height": 1440 },
            "overlay": { "label_divisor": 3 }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.grid.rows, 13);
        assert_eq!(cfg.grid.cols, 20);
        assert_eq!(cfg.input.timeout_ms, 1500);
        assert_eq!(cfg.input.click_offset_y, 0);
        assert_eq!(cfg.screen.width, 2560);
        assert_eq!(cfg.overlay.label_divisor, 3);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.grid.rows, 26);
        assert_eq!(cfg.grid.cols, 26);
        assert_eq!(cfg.input.timeout_ms, 2000);
        assert_eq!(cfg.input.click_offset_y, 18);
        assert_eq!(cfg.screen.width, 1920);
        assert_eq!(cfg.screen.height, 1080);
        let od = OverlayConfig::default();
        assert_eq!(cfg.overlay.label_color, od.label_color);
        assert_eq!(cfg.overlay.buffer_color, od.buffer_color);
    }

    #[test]
    fn deserialize_partial_section() {
        let json = r#"{ "input": { "timeout_ms": 500 } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.input.timeout_ms, 500);
        assert_eq!(
            cfg.input.click_offset_y,
            InputConfig::default().click_offset_y
        );
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "grid": {}, "future_section": { "key": 42 } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }
}
