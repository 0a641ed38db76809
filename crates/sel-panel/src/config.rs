//! Session configuration.

use crate::types::SYSCAP_SELECTION;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings a session is built from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Capabilities available on this platform, e.g. "SystemCapability.SelectionInput.Selection"
    pub capabilities: Vec<String>,
    /// Initial value of the text-selection session flag
    pub selection_active: bool,
    /// Backend name overriding environment detection, e.g. "headless"
    pub backend: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capabilities: vec![SYSCAP_SELECTION.to_string()],
            selection_active: true,
            backend: None,
        }
    }
}

impl SessionConfig {
    /// `$XDG_CONFIG_HOME/selpanel/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("selpanel").join("config.json"))
    }

    /// Load from config file, or return default if missing or malformed
    pub fn load(path: &Path) -> Self {
        let Ok(text) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!("Ignoring malformed config {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Save to config file
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.iter().any(|c| c == name)
    }
}
