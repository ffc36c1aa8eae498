//! Configuration management (config.toml)
//!
//! Settings live in TOML in the platform-specific config directory. Every
//! field has a default, and a missing or unreadable file yields defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::modes::{DEFAULT_MODE_KEY, Mode3D, ModeCatalog};
use crate::surface::{DEFAULT_SCREEN_X, DEFAULT_SCREEN_Y};

const CONFIG_FILE: &str = "config.toml";

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Video and 3D presentation settings
    #[serde(default)]
    pub video: VideoConfig,
    /// Emulation loop pacing
    #[serde(default)]
    pub emulation: EmulationConfig,
    /// Debug overlay settings
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// 3D mode key (default: white_black)
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Output window width in pixels (default: 640)
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Output window height in pixels (default: 480)
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Width of the emulated screen quad (default: 499)
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    /// Height of the emulated screen quad (default: 291)
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
    /// Display refresh rate in Hz (default: 60)
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmulationConfig {
    /// Emulated frames per second (default: 50)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Largest frame delta fed to the pacer, in milliseconds (default: 100)
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: u64,
    /// Warn when one frame takes longer than this, in microseconds (default: 20000)
    #[serde(default = "default_cpu_budget_us")]
    pub cpu_budget_us: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DebugConfig {
    /// Draw the frame rate overlay (default: false)
    #[serde(default)]
    pub show_fps: bool,
}

fn default_mode() -> String {
    DEFAULT_MODE_KEY.to_string()
}
fn default_window_width() -> u32 {
    640
}
fn default_window_height() -> u32 {
    480
}
fn default_screen_width() -> u32 {
    DEFAULT_SCREEN_X
}
fn default_screen_height() -> u32 {
    DEFAULT_SCREEN_Y
}
fn default_refresh_rate() -> u32 {
    60
}

fn default_tick_rate() -> u32 {
    50
}
fn default_max_delta_ms() -> u64 {
    100
}
fn default_cpu_budget_us() -> u64 {
    20_000
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            refresh_rate: default_refresh_rate(),
        }
    }
}

impl Default for EmulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            max_delta_ms: default_max_delta_ms(),
            cpu_budget_us: default_cpu_budget_us(),
        }
    }
}

impl EmulationConfig {
    pub fn max_delta(&self) -> Duration {
        Duration::from_millis(self.max_delta_ms)
    }

    pub fn cpu_budget(&self) -> Duration {
        Duration::from_micros(self.cpu_budget_us)
    }
}

impl Config {
    /// The configured 3D mode, or the catalog default if the key is unknown.
    pub fn active_mode(&self) -> &'static Mode3D {
        ModeCatalog::resolve(&self.video.mode)
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Linux: `~/.config/redview`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "redview", "redview")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory (screenshots).
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "redview", "redview")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads `config.toml` from the platform config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    match config_dir() {
        Some(dir) => load_from(&dir.join(CONFIG_FILE)),
        None => Config::default(),
    }
}

/// Loads a config file, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    let Ok(content) = std::fs::read_to_string(path) else {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Config::default();
    };
    toml::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
        Config::default()
    })
}

/// Saves the configuration to the platform config directory.
///
/// Returns the path written.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    let path = dir.join(CONFIG_FILE);
    save_to(config, &path)?;
    Ok(path)
}

/// Writes pretty TOML to `path`, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
