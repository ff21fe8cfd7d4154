mod config;
pub mod database;
pub mod store;

pub use config::{Config, NotificationsConfig, TimerConfig};
pub use database::{Database, SessionRecord, Stats};
pub use store::{MemoryStore, SnapshotStore};

use std::path::PathBuf;

/// Returns `~/.config/focuslife[-dev]/` based on FOCUSLIFE_ENV.
///
/// Set FOCUSLIFE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSLIFE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focuslife-dev")
    } else {
        base_dir.join("focuslife")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
