// Chunk: docs/chunks/layout_config - TOML configuration for the layout engine
//!
//! Layout engine configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document (or no
//! file at all) yields `LayoutConfig::default()`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::pane_layout::SplitDirection;

/// Tunables for the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Ratio given to the first child of a freshly created split
    pub default_split_ratio: f32,
    /// Resizes are clamped into `[min_split_ratio, 1 - min_split_ratio]`
    pub min_split_ratio: f32,
    /// Direction used when a non-terminal tab is routed away from a terminal pane
    pub page_split_direction: SplitDirection,
    pub default_terminal_title: String,
    pub default_page_title: String,
    /// Fallback tracing filter when `CANOPY_LOG` is unset
    pub log_filter: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            default_split_ratio: 0.5,
            min_split_ratio: 0.1,
            page_split_direction: SplitDirection::Horizontal,
            default_terminal_title: "Terminal".into(),
            default_page_title: "Page".into(),
            log_filter: "info".into(),
        }
    }
}

impl LayoutConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LayoutConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, falling back to defaults if the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No layout config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| LayoutError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded layout config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_split_ratio > 0.0 && self.min_split_ratio < 0.5) {
            return Err(LayoutError::config(format!(
                "min_split_ratio must be in (0, 0.5), got {}",
                self.min_split_ratio
            )));
        }
        let (lo, hi) = self.ratio_bounds();
        if !(self.default_split_ratio >= lo && self.default_split_ratio <= hi) {
            return Err(LayoutError::config(format!(
                "default_split_ratio must be in [{}, {}], got {}",
                lo, hi, self.default_split_ratio
            )));
        }
        Ok(())
    }

    /// Clamps a requested split ratio into the configured bounds.
    ///
    /// Non-finite input falls back to the default ratio.
    pub fn clamp_ratio(&self, ratio: f32) -> f32 {
        if !ratio.is_finite() {
            return self.default_split_ratio;
        }
        let (lo, hi) = self.ratio_bounds();
        ratio.clamp(lo, hi)
    }

    fn ratio_bounds(&self) -> (f32, f32) {
        (self.min_split_ratio, 1.0 - self.min_split_ratio)
    }
}
