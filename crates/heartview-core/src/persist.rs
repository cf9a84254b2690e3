//! Crash-safe JSON persistence for the session file.
//!
//! Writes land in a temp file with a unique PID+TID suffix, get
//! validated by re-parsing, synced, and renamed over the target. A
//! crashed write never leaves a torn session file behind.

use crate::error::{HeartviewError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process;
use std::thread;
use tracing::debug;

/// Load and decode a JSON file, or `None` when it does not exist.
pub fn atomic_read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|e| HeartviewError::io_with_path(e, path))?;
    let data: T = serde_json::from_str(&contents).map_err(|e| HeartviewError::Json {
        message: format!("Could not decode {}: {}", path.display(), e),
        source: Some(e),
    })?;
    Ok(Some(data))
}

/// Serialize `data` and replace `path` with it atomically.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| HeartviewError::io_with_path(e, parent))?;
        }
    }

    let serialized = serde_json::to_string_pretty(data)?;
    // Validate by re-parsing before anything touches the target path
    serde_json::from_str::<serde_json::Value>(&serialized).map_err(|e| HeartviewError::Json {
        message: format!("Refusing to write unparseable JSON: {}", e),
        source: Some(e),
    })?;

    // Unique temp name so concurrent writers never collide
    let temp_path = path.with_extension(format!("json.{}.{}.tmp", process::id(), thread_id()));

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| HeartviewError::io_with_path(e, &temp_path))?;
        file.write_all(serialized.as_bytes())
            .map_err(|e| HeartviewError::io_with_path(e, &temp_path))?;
        // Data must reach disk before the rename makes it visible
        file.sync_all()
            .map_err(|e| HeartviewError::io_with_path(e, &temp_path))?;
    }

    fs::rename(&temp_path, path).map_err(|e| HeartviewError::io_with_path(e, path))?;
    debug!("Replaced {} atomically", path.display());
    Ok(())
}

/// Hash of the current thread id, for unique temp file names.
fn thread_id() -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    format!("{:?}", thread::current().id()).hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Snapshot {
        email: String,
        generation: u32,
    }

    fn snapshot(email: &str, generation: u32) -> Snapshot {
        Snapshot {
            email: email.to_string(),
            generation,
        }
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        atomic_write_json(&path, &snapshot("user@example.com", 1)).unwrap();
        assert!(path.exists());

        let read: Option<Snapshot> = atomic_read_json(&path).unwrap();
        assert_eq!(read, Some(snapshot("user@example.com", 1)));
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let read: Option<Snapshot> = atomic_read_json(&dir.path().join("absent.json")).unwrap();
        assert!(read.is_none());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("state.json");

        atomic_write_json(&path, &snapshot("user@example.com", 1)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rewrite_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        atomic_write_json(&path, &snapshot("a@example.com", 1)).unwrap();
        atomic_write_json(&path, &snapshot("b@example.com", 2)).unwrap();

        let read: Option<Snapshot> = atomic_read_json(&path).unwrap();
        assert_eq!(read, Some(snapshot("b@example.com", 2)));

        // No stray temp files stay behind
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path() != path)
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_read_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.json");
        fs::write(&path, "not json at all").unwrap();

        let result: Result<Option<Snapshot>> = atomic_read_json(&path);
        assert!(result.is_err());
    }
}
