//! Host configuration file.
//!
//! Read from `<config dir>/filament/config.toml`; every field is optional
//! and CLI flags win over the file.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct HostConfig {
    /// Machine selected when the CLI names none.
    pub default_machine: Option<String>,
    /// Cycle budget per displayed frame (defaults to clock/60 per machine).
    pub frame_cycles: Option<u64>,
}

impl HostConfig {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("filament").join("config.toml"))
    }

    /// Load the config file if present; a missing or unparsable file is
    /// just the default config (the host never refuses to start over it).
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        let Ok(text) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed {}: {err}", path.display());
                Self::default()
            }
        }
    }
}
