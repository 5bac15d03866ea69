use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keepup_models::UserIdentity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct TmdbCredentials {
    api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct SavedSession {
    user_id: String,
    display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    signed_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct CredentialsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tmdb: Option<TmdbCredentials>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    session: Option<SavedSession>,
}

/// Secrets and the signed-in identity, kept apart from `config.toml`
pub struct CredentialStore {
    path: PathBuf,
    data: CredentialsFile,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: CredentialsFile::default(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            self.data = toml::from_str(&content)
                .with_context(|| format!("Malformed credentials file {}", self.path.display()))?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&self.data)?)?;
        Ok(())
    }

    pub fn get_tmdb_api_key(&self) -> Option<&String> {
        self.data.tmdb.as_ref().map(|t| &t.api_key)
    }

    pub fn set_tmdb_api_key(&mut self, key: String) {
        self.data.tmdb = Some(TmdbCredentials { api_key: key });
    }

    /// Identity saved by the last sign-in, if any
    pub fn get_session(&self) -> Option<UserIdentity> {
        self.data.session.as_ref().map(|s| UserIdentity {
            user_id: s.user_id.clone(),
            display_name: s.display_name.clone(),
            email: s.email.clone(),
        })
    }

    pub fn set_session(&mut self, identity: &UserIdentity, signed_in_at: DateTime<Utc>) {
        self.data.session = Some(SavedSession {
            user_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
            email: identity.email.clone(),
            signed_in_at,
        });
    }

    pub fn get_session_signed_in_at(&self) -> Option<DateTime<Utc>> {
        self.data.session.as_ref().map(|s| s.signed_in_at)
    }

    pub fn clear_session(&mut self) {
        self.data.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sam() -> UserIdentity {
        UserIdentity {
            user_id: "uid-1".to_string(),
            display_name: "Sam".to_string(),
            email: Some("sam@example.com".to_string()),
        }
    }

    #[test]
    fn test_api_key_persists() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_tmdb_api_key("test_key".to_string());
        store.save().unwrap();

        let mut loaded = CredentialStore::new(path);
        loaded.load().unwrap();
        assert_eq!(loaded.get_tmdb_api_key(), Some(&"test_key".to_string()));
        assert_eq!(loaded.get_session(), None);
    }

    #[test]
    fn test_session_round_trip_and_clear() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_tmdb_api_key("k".to_string());
        store.set_session(&sam(), Utc::now());
        store.save().unwrap();

        let mut loaded = CredentialStore::new(path);
        loaded.load().unwrap();
        assert_eq!(loaded.get_session(), Some(sam()));
        assert!(loaded.get_session_signed_in_at().is_some());

        loaded.clear_session();
        assert_eq!(loaded.get_session(), None);
        assert_eq!(loaded.get_session_signed_in_at(), None);
        assert!(loaded.get_tmdb_api_key().is_some());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CredentialStore::new(dir.path().join("credentials.toml"));
        store.load().unwrap();
        assert!(store.get_tmdb_api_key().is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "tmdb = 3").unwrap();
        let mut store = CredentialStore::new(file.path().to_path_buf());
        assert!(store.load().is_err());
    }
}
