//! JSON-file-backed name cache.
//!
//! A flat `{"<phone>": "<name>"}` map. One reconciliation runs at a time
//! in the intended usage, so persistence is last-writer-wins with no
//! locking; a missing or corrupt file simply starts the cache empty.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use payrec_engine::NameCache;

pub struct JsonFileCache {
    path: PathBuf,
    entries: HashMap<String, String>,
    dirty: bool,
}

impl JsonFileCache {
    /// Open (or start) the cache at `path`.
    pub fn open(path: PathBuf) -> Self {
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self { path, entries, dirty: false }
    }

    /// Platform default location: `<config dir>/payrec/name_cache.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("payrec")
            .join("name_cache.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist when anything was written. Errors are returned, not
    /// panicked: a failed cache write must never fail the run.
    pub fn save(&mut self) -> std::io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, json)?;
        self.dirty = false;
        Ok(())
    }
}

impl NameCache for JsonFileCache {
    fn get(&self, phone: &str) -> Option<String> {
        self.entries.get(phone).cloned()
    }

    fn put(&mut self, phone: &str, name: &str) {
        let previous = self.entries.insert(phone.to_string(), name.to_string());
        if previous.as_deref() != Some(name) {
            self.dirty = true;
        }
    }
}
