//! TOML-based application configuration.
//!
//! Stores user preferences for the timer and its alerts:
//! - Notification preferences (enabled, volume, custom sound)
//! - Timer defaults (active preset, polling interval, custom presets)
//!
//! Configuration is stored at `~/.config/focuslife/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::timer::preset::{self, Preset};

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_volume")]
    pub volume: u32,
    /// Path to a custom alert sound file (optional).
    #[serde(default)]
    pub custom_sound: Option<String>,
}

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Preset id activated on first run, before any snapshot exists.
    #[serde(default = "default_preset_id")]
    pub default_preset: String,
    /// Polling cadence for display refresh in milliseconds. Correctness does
    /// not depend on it; the value is recomputed from timestamps.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// User-defined presets, listed after the built-ins.
    #[serde(default)]
    pub custom_presets: Vec<Preset>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focuslife/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

fn default_true() -> bool {
    true
}
fn default_volume() -> u32 {
    50
}
fn default_preset_id() -> String {
    "pomo-short".into()
}
fn default_tick_interval_ms() -> u64 {
    500
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 50,
            custom_sound: None,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_preset: default_preset_id(),
            tick_interval_ms: default_tick_interval_ms(),
            custom_presets: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notifications: NotificationsConfig::default(),
            timer: TimerConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err("config key is empty".into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse()?),
                    serde_json::Value::Number(_) => {
                        serde_json::Value::Number(value.parse::<i64>()?.into())
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.to_string()),
                    serde_json::Value::Null => serde_json::Value::String(value.to_string()),
                    _ => return Err(format!("cannot set structured key: {key}").into()),
                };
                obj.insert(part.to_string(), new_value);
            } else {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
            }
        }
        Ok(())
    }

    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// Built-in presets followed by any custom ones from the config file.
    pub fn presets(&self) -> Vec<Preset> {
        let mut all = preset::builtin();
        all.extend(self.timer.custom_presets.iter().cloned());
        all
    }

    /// Resolve a preset by id, searching built-ins then custom presets.
    pub fn find_preset(&self, id: &str) -> Option<Preset> {
        self.presets().into_iter().find(|p| p.id == id)
    }

    /// The preset the timer boots with when no snapshot exists.
    pub fn default_preset(&self) -> Preset {
        self.find_preset(&self.timer.default_preset)
            .unwrap_or_default()
    }
}
