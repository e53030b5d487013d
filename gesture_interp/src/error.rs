use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid neutral zone: {0}")]
    InvalidZone(String),

    #[error("screen size must be non-zero, got {width}x{height}")]
    InvalidScreen { width: u32, height: u32 },

    #[error("sensitivity {axis} must be finite and >= 0, got {value}")]
    InvalidSensitivity { axis: char, value: f64 },

    #[error("debounce must be finite and >= 0 seconds, got {0}")]
    InvalidDebounce(f64),
}
