//! Rendering configuration for diagnostics.
//!
//! Diagnostics are laid out when they are printed, not when they are created,
//! so the same [`ErrInfo`](crate::ErrInfo) can be shown at different widths.
//! A configuration can be built in code or loaded from a YAML file:
//!
//! ```yaml
//! width: 100
//! ribbon: 0.8
//! color: false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::TrefoilError;

/// Narrowest width a diagnostic is ever wrapped to.
pub const MIN_WIDTH: usize = 20;

/// Layout settings for rendered diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum characters per printed line.
    pub width: usize,
    /// Fraction of `width` a line may fill with text, excluding indentation.
    pub ribbon: f32,
    /// Whether terminal output may use color.
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 80,
            ribbon: 1.0,
            color: true,
        }
    }
}

impl RenderConfig {
    pub fn with_width(self, width: usize) -> Self {
        Self { width, ..self }
    }

    pub fn with_ribbon(self, ribbon: f32) -> Self {
        Self { ribbon, ..self }
    }

    /// The usable line width, never below [`MIN_WIDTH`].
    pub fn line_width(&self) -> usize {
        self.width.max(MIN_WIDTH)
    }

    /// Characters of text allowed on one line once indentation is excluded.
    pub fn ribbon_width(&self) -> usize {
        let ribbon = if self.ribbon.is_finite() {
            self.ribbon.clamp(0.0, 1.0)
        } else {
            1.0
        };
        ((self.line_width() as f32 * ribbon) as usize).max(MIN_WIDTH)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, TrefoilError> {
        let text = fs::read_to_string(path).map_err(|source| TrefoilError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| TrefoilError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = RenderConfig::from_yaml_str("width: 40\n").unwrap();
        assert_eq!(config.width, 40);
        assert_eq!(config.ribbon, 1.0);
        assert!(config.color);
    }

    #[test]
    fn ribbon_is_clamped() {
        let config = RenderConfig::default().with_width(100).with_ribbon(0.5);
        assert_eq!(config.ribbon_width(), 50);
        let config = RenderConfig::default().with_ribbon(7.0);
        assert_eq!(config.ribbon_width(), 80);
        let config = RenderConfig::default().with_width(4).with_ribbon(0.1);
        assert_eq!(config.line_width(), MIN_WIDTH);
        assert_eq!(config.ribbon_width(), MIN_WIDTH);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(RenderConfig::from_yaml_str("width: [").is_err());
    }
}
