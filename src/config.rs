use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "config.json";

/// Flat key/value store persisted as a single JSON object.
///
/// The file is read on first access and rewritten in full on every `set`.
/// A missing or unreadable file behaves like an empty store.
#[derive(Debug)]
pub struct Config {
    path: PathBuf,
    storage: Option<Map<String, Value>>,
}

impl Config {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            storage: None,
        }
    }

    /// `config.json` in the current working directory.
    pub fn in_working_dir() -> Self {
        let dir = std::env::current_dir().unwrap_or_default();
        Self::new(dir.join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.storage().get(key)?.clone();
        serde_json::from_value(value).ok()
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let value = serde_json::to_value(value)?;
        self.storage().insert(key.to_string(), value);
        self.save()
    }

    fn storage(&mut self) -> &mut Map<String, Value> {
        let path = &self.path;
        self.storage.get_or_insert_with(|| match load(path) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Ignoring config {:?}: {}", path, e);
                Map::new()
            }
        })
    }

    fn save(&self) -> Result<(), ConfigError> {
        let empty = Map::new();
        let map = self.storage.as_ref().unwrap_or(&empty);
        fs::write(&self.path, serde_json::to_string(map)?)?;
        Ok(())
    }
}

fn load(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(dir.path().join(CONFIG_FILE));
        assert_eq!(config.get::<String>("last_path"), None);
        assert!(!config.path().exists());
    }

    #[test]
    fn set_persists_whole_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::new(&path);
        config.set("last_path", "/pics").unwrap();
        config.set("interval", 2500u64).unwrap();

        let mut reopened = Config::new(&path);
        assert_eq!(reopened.get::<String>("last_path").as_deref(), Some("/pics"));
        assert_eq!(reopened.get::<u64>("interval"), Some(2500));

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.as_object().unwrap().len(), 2);
    }

    #[test]
    fn wrong_type_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new(dir.path().join(CONFIG_FILE));
        config.set("interval", "soon").unwrap();
        assert_eq!(config.get::<u64>("interval"), None);
    }

    #[test]
    fn malformed_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        let mut config = Config::new(&path);
        assert_eq!(config.get::<String>("anything"), None);
        config.set("k", true).unwrap();

        let mut reopened = Config::new(&path);
        assert_eq!(reopened.get::<bool>("k"), Some(true));
    }
}
