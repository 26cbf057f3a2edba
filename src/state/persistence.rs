use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Category memory (lowercased name -> category).
pub const MEMORY_KEY: &str = "cuisine_memory";
/// Saved recipes.
pub const RECIPES_KEY: &str = "cuisine_recipes";
/// Week-start -> (cell key -> menu item).
pub const WEEKLY_MENUS_KEY: &str = "cuisine_weekly_menus";
/// Flat cell key -> menu item map written before menus were weekly.
pub const LEGACY_MENU_KEY: &str = "cuisine_menu_items";
/// Active grid structure.
pub const STRUCTURE_KEY: &str = "cuisine_structure";

/// String-keyed, string-valued durable storage.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-process storage; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and decode a JSON value stored under `key`.
pub fn load_json<T: DeserializeOwned, S: KeyValueStorage + ?Sized>(
    storage: &S,
    key: &str,
) -> Result<Option<T>> {
    match storage.get(key)? {
        Some(raw) => {
            tracing::debug!(key, bytes = raw.len(), "loaded storage key");
            Ok(Some(serde_json::from_str(&raw)?))
        }
        None => Ok(None),
    }
}

/// Encode `value` as JSON and store it under `key`.
pub fn save_json<T: Serialize + ?Sized, S: KeyValueStorage + ?Sized>(
    storage: &mut S,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    storage.set(key, &json)?;
    tracing::debug!(key, bytes = json.len(), "saved storage key");
    Ok(())
}
