use crate::error::Result;
use keepup_models::Show;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Preference key holding the JSON-encoded tracked list
pub const TRACKED_SHOWS_KEY: &str = "tracked_shows";

/// Locally persisted list of tracked shows.
///
/// The preferences file is a JSON object of string values; the tracked list
/// is stored whole under `tracked_shows` and rewritten on every change.
/// Changes are published on a `watch` channel.
pub struct TrackedShowsStore {
    path: Option<PathBuf>,
    shows: watch::Sender<Vec<Show>>,
}

impl TrackedShowsStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let shows = load_tracked(&path)?;
        debug!("Loaded {} tracked shows from {:?}", shows.len(), path);
        let (tx, _) = watch::channel(shows);
        Ok(Self { path: Some(path), shows: tx })
    }

    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self { path: None, shows: tx }
    }

    pub fn shows(&self) -> Vec<Show> {
        self.shows.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Show>> {
        self.shows.subscribe()
    }

    pub fn is_tracked(&self, show_id: &str) -> bool {
        self.shows.borrow().iter().any(|s| s.id == show_id)
    }

    /// Replace the whole list
    pub fn save(&self, shows: Vec<Show>) -> Result<()> {
        if let Some(path) = &self.path {
            write_tracked(path, &shows)?;
        }
        self.shows.send_replace(shows);
        Ok(())
    }

    /// Untrack the show if tracked, otherwise track it; returns whether it is now tracked
    pub fn toggle(&self, show: Show) -> Result<bool> {
        let mut shows = self.shows();
        let now_tracked = match shows.iter().position(|s| s.id == show.id) {
            Some(index) => {
                shows.remove(index);
                false
            }
            None => {
                shows.push(show);
                true
            }
        };
        self.save(shows)?;
        Ok(now_tracked)
    }

    pub fn clear(&self) -> Result<()> {
        self.save(Vec::new())
    }
}

fn load_preferences(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str(&content) {
        Ok(prefs) => Ok(prefs),
        Err(e) => {
            warn!("Preferences file {:?} is corrupt ({}), starting fresh", path, e);
            Ok(BTreeMap::new())
        }
    }
}

fn load_tracked(path: &Path) -> Result<Vec<Show>> {
    let prefs = load_preferences(path)?;
    let Some(encoded) = prefs.get(TRACKED_SHOWS_KEY) else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(encoded) {
        Ok(shows) => Ok(shows),
        Err(e) => {
            warn!("Tracked show list could not be decoded ({}), starting empty", e);
            Ok(Vec::new())
        }
    }
}

fn write_tracked(path: &Path, shows: &[Show]) -> Result<()> {
    let mut prefs = load_preferences(path)?;
    prefs.insert(TRACKED_SHOWS_KEY.to_string(), serde_json::to_string(shows)?);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_string_pretty(&prefs)?)?;
    std::fs::rename(&tmp, path)?;

    info!("Saved {} tracked shows", shows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use keepup_models::ShowType;

    fn show(id: &str) -> Show {
        Show::new(id, format!("Show {}", id), "2020", ShowType::Series)
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let store = TrackedShowsStore::in_memory();
        assert!(store.toggle(show("1")).unwrap());
        assert!(store.toggle(show("2")).unwrap());
        assert!(store.is_tracked("1"));

        assert!(!store.toggle(show("1")).unwrap());
        let ids: Vec<String> = store.shows().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_list_persists_and_keeps_other_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = TrackedShowsStore::open(&path).unwrap();
        store.toggle(show("1")).unwrap();
        store.save(vec![show("3"), show("4")]).unwrap();

        let reopened = TrackedShowsStore::open(&path).unwrap();
        assert_eq!(reopened.shows().len(), 2);
        assert_eq!(reopened.shows()[0].id, "3");

        let prefs: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(prefs.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn test_corrupt_preferences_start_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(TrackedShowsStore::open(&path).unwrap().shows().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = TrackedShowsStore::in_memory();
        let mut rx = store.subscribe();
        store.toggle(show("1")).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);
    }
}
