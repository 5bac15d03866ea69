use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable that relocates every KeepUp file under one directory
pub const HOME_ENV: &str = "KEEPUP_HOME";

/// Where KeepUp keeps its files.
///
/// `config.toml` and `credentials.toml` sit in the base directory, the
/// document store snapshot and local preferences under `data/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathManager {
    base_dir: PathBuf,
    data_dir: PathBuf,
}

impl PathManager {
    /// `$KEEPUP_HOME` when set, else `<platform config dir>/keepup`
    pub fn new() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::from_base(PathBuf::from(home)));
        }

        let base_dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory; set {}", HOME_ENV))?
            .join("keepup");
        Ok(Self::from_base(base_dir))
    }

    pub fn from_base(base: PathBuf) -> Self {
        Self {
            data_dir: base.join("data"),
            base_dir: base,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.base_dir.join("credentials.toml")
    }

    /// Local preference entries (the tracked-show list lives here)
    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir.join("preferences.json")
    }

    /// Document store snapshot used when `[store] path` is not set
    pub fn store_file(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".keepup")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = PathManager::from_base(PathBuf::from("/srv/keepup"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/keepup/config.toml"));
        assert_eq!(paths.credentials_file(), PathBuf::from("/srv/keepup/credentials.toml"));
        assert_eq!(paths.store_file(), PathBuf::from("/srv/keepup/data/store.json"));
        assert_eq!(paths.preferences_file(), PathBuf::from("/srv/keepup/data/preferences.json"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::from_base(dir.path().join("keepup"));
        paths.ensure_directories().unwrap();
        assert!(paths.base_dir().is_dir());
        assert!(paths.data_dir().is_dir());
    }
}
