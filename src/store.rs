//! Drawing records and the repositories that persist them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Number of hex characters in a drawing identifier.
pub const ID_LEN: usize = 32;

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A stored drawing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: String,
    pub drawing: String,
    pub created_at: DateTime<Utc>,
}

impl Drawing {
    /// Stamp a freshly rendered drawing with an identifier and the current time.
    pub fn new(drawing: String) -> Self {
        let created_at = Utc::now();
        let id = generate_id(&drawing, created_at);
        Self {
            id,
            drawing,
            created_at,
        }
    }
}

/// Derive an identifier from the content, the timestamp and a process-wide
/// counter. Identical drawings created in the same instant still get distinct
/// ids.
fn generate_id(drawing: &str, created_at: DateTime<Utc>) -> String {
    let nonce = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut hasher = Sha256::new();
    hasher.update(drawing.as_bytes());
    hasher.update(created_at.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(ID_LEN);
    id
}

/// Whether `id` has the shape of a generated identifier.
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Key-value storage for drawings.
pub trait Repository: Send + Sync {
    /// Persist a drawing under its id.
    fn save(&self, drawing: &Drawing) -> Result<()>;

    /// Fetch a drawing; [`Error::NotFound`] when the id is unknown.
    fn get_by_id(&self, id: &str) -> Result<Drawing>;
}

/// Repository kept entirely in memory. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    drawings: RwLock<HashMap<String, Drawing>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.drawings.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Repository for MemoryRepository {
    fn save(&self, drawing: &Drawing) -> Result<()> {
        let mut guard = self
            .drawings
            .write()
            .map_err(|_| Error::StorageError("drawing store lock poisoned".to_string()))?;
        guard.insert(drawing.id.clone(), drawing.clone());
        debug!("stored drawing {} in memory", drawing.id);
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Drawing> {
        let guard = self
            .drawings
            .read()
            .map_err(|_| Error::StorageError("drawing store lock poisoned".to_string()))?;
        guard.get(id).cloned().ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

/// Repository that writes one JSON document per drawing into a directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
    root: PathBuf,
}

impl FileRepository {
    /// Open (and create if needed) the storage directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| {
            Error::StorageError(format!("cannot create {}: {}", root.display(), e))
        })?;
        info!("file repository at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl Repository for FileRepository {
    fn save(&self, drawing: &Drawing) -> Result<()> {
        if !is_valid_id(&drawing.id) {
            return Err(Error::StorageError(format!("refusing to store id '{}'", drawing.id)));
        }
        let path = self.path_for(&drawing.id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(drawing)?;
        std::fs::write(&tmp, body)
            .and_then(|_| std::fs::rename(&tmp, &path))
            .map_err(|e| Error::StorageError(format!("cannot write {}: {}", path.display(), e)))?;
        debug!("stored drawing {} at {}", drawing.id, path.display());
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Drawing> {
        // Anything that is not a generated id cannot exist and must not reach the filesystem.
        if !is_valid_id(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        let path = self.path_for(id);
        let body = match std::fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(id.to_string()))
            }
            Err(e) => {
                return Err(Error::StorageError(format!("cannot read {}: {}", path.display(), e)))
            }
        };
        serde_json::from_slice(&body)
            .map_err(|e| Error::StorageError(format!("corrupt record {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("sketchgrid-{}-{}-{}", name, std::process::id(), Utc::now().timestamp_nanos_opt().unwrap_or_default()));
        p
    }

    #[test]
    fn ids_are_hex_and_unique() {
        let a = Drawing::new("*".to_string());
        let b = Drawing::new("*".to_string());
        assert!(is_valid_id(&a.id));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn id_shape_check() {
        assert!(!is_valid_id("../etc/passwd"));
        assert!(!is_valid_id("ABCDEF0123456789ABCDEF0123456789"));
        assert!(is_valid_id("abcdef0123456789abcdef0123456789"));
    }

    #[test]
    fn memory_round_trip_and_not_found() {
        let repo = MemoryRepository::new();
        let d = Drawing::new("ab\ncd".to_string());
        repo.save(&d).unwrap();
        assert_eq!(repo.get_by_id(&d.id).unwrap(), d);
        assert_eq!(repo.len(), 1);
        assert!(matches!(repo.get_by_id("missing"), Err(Error::NotFound(_))));
    }

    #[test]
    fn file_round_trip_and_not_found() {
        let dir = scratch_dir("files");
        let repo = FileRepository::open(&dir).unwrap();
        let d = Drawing::new("  @@@\n  @+@\n  @@@".to_string());
        repo.save(&d).unwrap();
        assert_eq!(repo.get_by_id(&d.id).unwrap(), d);
        assert!(matches!(repo.get_by_id(&"0".repeat(ID_LEN)), Err(Error::NotFound(_))));
        assert!(matches!(repo.get_by_id("../secret"), Err(Error::NotFound(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = scratch_dir("corrupt");
        let repo = FileRepository::open(&dir).unwrap();
        let id = "f".repeat(ID_LEN);
        std::fs::write(dir.join(format!("{id}.json")), b"not json").unwrap();
        assert!(matches!(repo.get_by_id(&id), Err(Error::StorageError(_))));
        std::fs::remove_dir_all(&dir).ok();
    }
}
