use color_eyre::Result;
use keepup_config::{Config, CredentialStore, PathManager};
use keepup_core::KeepUp;
use std::path::PathBuf;

/// Paths, settings and credentials shared by every command
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        paths
            .ensure_directories()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create KeepUp directories: {}", e))?;

        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        let credentials_file = paths.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        Ok(Self { paths, config, credentials })
    }

    /// Service handle over the local store, the catalog and the saved session
    pub async fn service(&self) -> Result<KeepUp> {
        if self.credentials.get_tmdb_api_key().is_none() {
            return Err(color_eyre::eyre::eyre!(
                "TMDB API key is not configured. Run 'keepup config api-key' first."
            ));
        }
        Ok(KeepUp::open(&self.config, &self.paths, &self.credentials).await?)
    }

    pub fn save_credentials(&self) -> Result<()> {
        self.credentials
            .save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))
    }
}

/// Log file from config.toml, if set; read before logging exists so failures are ignored
pub fn configured_log_file() -> Option<PathBuf> {
    let paths = PathManager::default();
    Config::load_or_default(&paths.config_file()).ok()?.logging.file
}
