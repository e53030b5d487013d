//! Interpreter configuration: screen, neutral zone, sensitivity, debounce.
//!
//! Fixed for the lifetime of a session. Loaded from TOML; every section is
//! optional and falls back to the defaults below.
//!
//! ```toml
//! debounce_secs = 0.4
//!
//! [screen]
//! width = 1920
//! height = 1080
//!
//! [neutral_zone]
//! x_min = 0.3
//! x_max = 0.7
//! y_min = 0.3
//! y_max = 0.7
//!
//! [sensitivity]
//! x = 0.5
//! y = 0.5
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::motion::NeutralZone;

/// Target screen size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSize {
    pub width:  u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        ScreenSize { width: 1920, height: 1080 }
    }
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        ScreenSize { width, height }
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }
}

/// Per-axis multiplier applied to the penetration depth past the zone edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensitivity {
    pub x: f64,
    pub y: f64,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Sensitivity { x: 0.5, y: 0.5 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InterpreterConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Minimum time between two accepted clicks of the same button.
    pub debounce_secs: f64,
    pub screen:        ScreenSize,
    pub neutral_zone:  NeutralZone,
    pub sensitivity:   Sensitivity,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            debounce_secs: 0.4,
            screen:        ScreenSize::default(),
            neutral_zone:  NeutralZone::default(),
            sensitivity:   Sensitivity::default(),
        }
    }
}

impl InterpreterConfig {
    pub fn debounce(&self) -> Duration {
        Duration::try_from_secs_f64(self.debounce_secs).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.neutral_zone.validate()?;

        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(ConfigError::InvalidScreen {
                width:  self.screen.width,
                height: self.screen.height,
            });
        }
        for (axis, value) in [('x', self.sensitivity.x), ('y', self.sensitivity.y)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSensitivity { axis, value });
            }
        }
        if !self.debounce_secs.is_finite() || self.debounce_secs < 0.0 {
            return Err(ConfigError::InvalidDebounce(self.debounce_secs));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: InterpreterConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
