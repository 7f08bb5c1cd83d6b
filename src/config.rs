//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/hyprarrange/config.json`.
//! Every section is optional so the file can grow new keys later without
//! breaking older files.
//!
//! # Example
//!
//! ```json
//! {
//!   "layout": { "gap": 8.0, "cascade_delta": 30.0, "others": "split" },
//!   "todo": { "enabled": true, "app": "org.gnome.Todo" },
//!   "cache": { "timeout_ms": 100 }
//! }
//! ```

use crate::layout::{FocusSplit, OthersLayout, FOCUS_RATIO};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional.  A minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Layout geometry settings.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// To-do window opt-out.
    #[serde(default)]
    pub todo: TodoConfig,

    /// Compositor query cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Layout geometry settings.  All lengths are in logical pixels.
///
/// The focus ratio is fixed at [`FOCUS_RATIO`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Gap around the screen edges and between focus-layout columns.
    pub gap: f64,
    /// Diagonal step between cascaded windows.
    pub cascade_delta: f64,
    /// Arrangement of the right-hand column of the focus layout.
    pub others: OthersLayout,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap: 0.0,
            cascade_delta: 30.0,
            others: OthersLayout::Stack,
        }
    }
}

impl LayoutConfig {
    /// Focus-layout parameters derived from this section.
    pub fn focus_split(&self) -> FocusSplit {
        FocusSplit {
            ratio: FOCUS_RATIO,
            gap: self.gap,
            others: self.others,
        }
    }
}

/// To-do window opt-out: when enabled, windows of `app` are never arranged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    pub enabled: bool,
    /// Application name (window class) of the to-do app.
    pub app: Option<String>,
}

/// Compositor query cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a compositor snapshot stays fresh (ms).
    pub timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { timeout_ms: 100 }
    }
}

impl CacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
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
