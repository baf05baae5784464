//! Settings management

use crate::error::{Result, ScriptError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base directory for script sources.
pub const SCRIPT_DIR_VAR: &str = "TEST_SRC";
pub const ENGINE_VAR: &str = "SHIM_ENGINE";
pub const SCRIPT_VAR: &str = "SHIM_SCRIPT";
/// Optional JSON settings file, applied before the variables above.
pub const SETTINGS_VAR: &str = "SHIM_SETTINGS";

/// Runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Engine short name, see `EngineManager::engine_by_name`.
    pub engine: String,
    pub script_dir: PathBuf,
    /// Script file, relative to `script_dir`.
    pub script: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine: "js".to_owned(),
            script_dir: PathBuf::from("."),
            script: "interface_adapter.js".to_owned(),
        }
    }
}

impl Settings {
    /// Settings file named by `SHIM_SETTINGS` (defaults when unset),
    /// overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base = match lookup(SETTINGS_VAR).filter(|path| !path.is_empty()) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        Ok(base.overlay(lookup))
    }

    /// Read a JSON settings file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ScriptError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace fields with values from `lookup`; empty values are ignored.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value: &String| !value.is_empty());
        if let Some(dir) = get(SCRIPT_DIR_VAR) {
            self.script_dir = PathBuf::from(dir);
        }
        if let Some(engine) = get(ENGINE_VAR) {
            self.engine = engine;
        }
        if let Some(script) = get(SCRIPT_VAR) {
            self.script = script;
        }
        self
    }
}
