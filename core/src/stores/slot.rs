//! Local key-value slots backing the recovery record and the activity
//! change-detection cache.
//!
//! The slot is keyed per profile, not per authenticated user; the session
//! manager clears it on logout. Availability is probed once at construction
//! (write/read/delete a probe key); an unavailable backing store degrades to
//! a silent no-op so the rest of the core keeps working without recovery.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

pub trait SlotStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Slot storage backed by one file per key inside a profile directory.
#[derive(Debug)]
pub struct FileSlotStorage {
    dir: PathBuf,
    available: bool,
}

const PROBE_KEY: &str = "probe";

impl FileSlotStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let available = Self::probe(&dir);
        if !available {
            tracing::warn!(dir = %dir.display(), "local slot storage unavailable, recovery disabled");
        }
        Self { dir, available }
    }

    fn probe(dir: &PathBuf) -> bool {
        if fs::create_dir_all(dir).is_err() {
            return false;
        }
        let path = dir.join(format!("{PROBE_KEY}.json"));
        if fs::write(&path, b"probe").is_err() {
            return false;
        }
        let read_back = fs::read(&path).map(|bytes| bytes == b"probe").unwrap_or(false);
        let _ = fs::remove_file(&path);
        read_back
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SlotStorage for FileSlotStorage {
    fn get(&self, key: &str) -> Option<String> {
        if !self.available {
            return None;
        }
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if !self.available {
            return;
        }
        if let Err(error) = fs::write(self.path_for(key), value) {
            tracing::warn!(key, %error, "failed to write local slot");
        }
    }

    fn remove(&self, key: &str) {
        if !self.available {
            return;
        }
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// In-memory slot storage for tests and recovery-less embedding.
#[derive(Debug, Default)]
pub struct MemorySlotStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemorySlotStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.slots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}
