//! Directory-backed key-value store: one `<key>.json` file per key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gugudan_game::KeyValueStore;

const FILE_EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let path = self.path_for(key)?;
        // Staged write, then rename over the target.
        let staging = path.with_extension("tmp");
        fs::write(&staging, value).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn list(&self) -> Result<Vec<String>, Self::Error> {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == FILE_EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
            {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::util::scratch_path;
    use gugudan_game::{JsonGateway, PersistenceGateway, RankingEntry};

    #[test]
    fn round_trips_values_and_lists_keys() {
        let store = FileStore::open(scratch_path("store")).unwrap();
        assert_eq!(store.get("gugudan-scores").unwrap(), None);
        store.set("gugudan-scores", "[]").unwrap();
        store.set("gugudan-ranking", "[]").unwrap();
        assert_eq!(store.get("gugudan-scores").unwrap().as_deref(), Some("[]"));
        assert_eq!(
            store.list().unwrap(),
            vec!["gugudan-ranking".to_string(), "gugudan-scores".to_string()]
        );
        fs::remove_dir_all(store.root()).unwrap();
    }

    #[test]
    fn rejects_path_like_keys() {
        let store = FileStore::open(scratch_path("keys")).unwrap();
        assert!(matches!(
            store.get("../escape"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.set("", "x"), Err(StoreError::InvalidKey(_))));
        fs::remove_dir_all(store.root()).unwrap();
    }

    #[test]
    fn gateway_persists_across_reopen() {
        let root = scratch_path("reopen");
        let gateway = JsonGateway::new(FileStore::open(&root).unwrap());
        gateway
            .save_ranking(&[RankingEntry::new("Alice", 208, chrono::Utc::now())])
            .unwrap();

        let reopened = JsonGateway::new(FileStore::open(&root).unwrap());
        let ranking = reopened.load_ranking().unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].name, "Alice");
        fs::remove_dir_all(root).unwrap();
    }
}
