use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HostError, Result};

pub const CONFIG_PATH_VAR: &str = "EPOCHPEEK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "epochpeek.toml";

const DEBUG_VAR: &str = "EPOCHPEEK_DEBUG";
const SELECTION_DEBOUNCE_VAR: &str = "EPOCHPEEK_SELECTION_DEBOUNCE_MS";
const POINTER_SETTLE_VAR: &str = "EPOCHPEEK_POINTER_SETTLE_MS";

/// Host settings persisted as TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log every settled selection before it is parsed.
    pub debug: bool,
    pub selection_debounce_ms: u64,
    pub pointer_settle_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            selection_debounce_ms: 300,
            pointer_settle_ms: 10,
        }
    }
}

impl Settings {
    /// `$EPOCHPEEK_CONFIG`, falling back to `epochpeek.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        info!(path = %path.display(), "saved settings");
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|var| std::env::var(var).ok())
    }

    /// Applies overrides from any key/value lookup; `apply_env_overrides`
    /// passes the process environment.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        if let Some(value) = lookup(DEBUG_VAR) {
            self.debug = parse_flag(DEBUG_VAR, &value)?;
        }
        if let Some(value) = lookup(SELECTION_DEBOUNCE_VAR) {
            self.selection_debounce_ms = parse_millis(SELECTION_DEBOUNCE_VAR, &value)?;
        }
        if let Some(value) = lookup(POINTER_SETTLE_VAR) {
            self.pointer_settle_ms = parse_millis(POINTER_SETTLE_VAR, &value)?;
        }
        Ok(())
    }

    pub fn selection_debounce(&self) -> Duration {
        Duration::from_millis(self.selection_debounce_ms)
    }

    pub fn pointer_settle(&self) -> Duration {
        Duration::from_millis(self.pointer_settle_ms)
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HostError::InvalidEnv {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_millis(var: &'static str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| HostError::InvalidEnv {
        var,
        value: value.to_string(),
    })
}
