use crate::Error;
use anyhow::Context as _;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Whole-document JSON persistence. Each concern is one file in the data
/// directory; loads never fail (missing or unreadable documents fall back
/// to the default) and saves rewrite the entire file.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn load<T>(&self, name: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.dir.join(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => return T::default(),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring corrupt document {}: {}", path.display(), e);
                T::default()
            }
        }
    }

    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), Error> {
        let path = self.dir.join(name);
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type Counters = HashMap<String, HashMap<String, u64>>;

    #[test]
    fn missing_document_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).unwrap();

        let loaded: Counters = store.load("absent.json");
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_document_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("invites.json"), b"{ not json").unwrap();
        let store = JsonStore::new(dir.path()).unwrap();

        let loaded: Counters = store.load("invites.json");
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).unwrap();

        let mut doc: Counters = HashMap::new();
        doc.entry("1".to_string())
            .or_default()
            .insert("42".to_string(), 7);
        store.save("messages.json", &doc).unwrap();

        let loaded: Counters = store.load("messages.json");
        assert_eq!(loaded, doc);
    }
}
