use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3/";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub updates: UpdatesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog API settings. The API key itself lives in the credential store.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Document store snapshot file; defaults to `<data_dir>/store.json`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UpdatesConfig {
    /// Keep shows whose next episode has no air date yet (they sort last)
    #[serde(default = "default_true")]
    pub include_undated: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Write logs to this file (rotated daily) instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_TMDB_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            include_undated: default_true(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.tmdb.base_url.trim();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(anyhow::anyhow!("tmdb.base_url must be an http(s) URL, got '{}'", self.tmdb.base_url));
        }

        if self.tmdb.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("tmdb.request_timeout_seconds must be greater than zero"));
        }

        if let Some(path) = &self.store.path {
            if path.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("store.path cannot be empty"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            tmdb: TmdbConfig {
                base_url: "http://localhost:8080/3/".to_string(),
                request_timeout_seconds: 5,
            },
            store: StoreConfig {
                path: Some(PathBuf::from("/tmp/keepup-store.json")),
            },
            updates: UpdatesConfig { include_undated: false },
            logging: LoggingConfig::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.tmdb.base_url, "http://localhost:8080/3/");
        assert_eq!(loaded.tmdb.request_timeout_seconds, 5);
        assert_eq!(loaded.store.path, Some(PathBuf::from("/tmp/keepup-store.json")));
        assert!(!loaded.updates.include_undated);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tmdb.base_url, DEFAULT_TMDB_BASE_URL);
        assert_eq!(config.tmdb.request_timeout_seconds, 30);
        assert!(config.updates.include_undated);
        assert!(config.store.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.tmdb.base_url, DEFAULT_TMDB_BASE_URL);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        config.tmdb.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.tmdb.base_url = DEFAULT_TMDB_BASE_URL.to_string();
        config.tmdb.request_timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.tmdb.request_timeout_seconds = 10;
        assert!(config.validate().is_ok());
    }
}
