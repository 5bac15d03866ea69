pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, LoggingConfig, StoreConfig, TmdbConfig, UpdatesConfig, DEFAULT_TMDB_BASE_URL};
pub use credentials::CredentialStore;
pub use paths::{PathManager, HOME_ENV};
