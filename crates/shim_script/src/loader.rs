//! Script source loading

use crate::error::{Result, ScriptError};
use crate::settings::Settings;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads script files relative to a base directory.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    base_dir: PathBuf,
}

impl SourceLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.script_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute paths are used as given.
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        let name = name.as_ref();
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.base_dir.join(name)
        }
    }

    pub fn load(&self, name: impl AsRef<Path>) -> Result<String> {
        let path = self.resolve(name);
        debug!(path = %path.display(), "Loading script source");
        std::fs::read_to_string(&path).map_err(|source| ScriptError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let loader = SourceLoader::new("scripts");
        assert_eq!(loader.resolve("a.js"), PathBuf::from("scripts/a.js"));

        let absolute = std::env::temp_dir().join("b.js");
        assert_eq!(loader.resolve(&absolute), absolute);
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.js"), "function run() {}").unwrap();
        let loader = SourceLoader::new(dir.path());

        assert_eq!(loader.load("main.js").unwrap(), "function run() {}");
        match loader.load("missing.js").unwrap_err() {
            ScriptError::Io { path, .. } => assert_eq!(path, dir.path().join("missing.js")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
