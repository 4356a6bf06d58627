//! Explicit cache of loaded tables
//!
//! Entries are keyed by path and invalidated when the file's modification
//! time or length changes, or when a different schema is requested.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use log::debug;

use crate::error::{ReadError, ReadResult};
use crate::model::{Schema, Table};
use crate::reader::TabularReader;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> ReadResult<Self> {
        let meta = std::fs::metadata(path).map_err(|source| ReadError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug)]
struct Entry {
    stamp: FileStamp,
    schema: Option<Schema>,
    table: Arc<Table>,
}

/// Tables loaded through one reader, shared as `Arc<Table>`
#[derive(Debug, Default)]
pub struct TableCache {
    reader: TabularReader,
    entries: Mutex<HashMap<PathBuf, Entry>>,
}

impl TableCache {
    pub fn new(reader: TabularReader) -> Self {
        Self {
            reader,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached table for `path`, loading it if absent or stale.
    ///
    /// Failed loads are not cached.
    pub fn get_or_load(&self, path: &Path, schema: Option<&Schema>) -> ReadResult<Arc<Table>> {
        let stamp = FileStamp::of(path)?;

        if let Some(entry) = self.lock().get(path) {
            if entry.stamp == stamp && entry.schema.as_ref() == schema {
                debug!("Cache hit for {}", path.display());
                return Ok(Arc::clone(&entry.table));
            }
        }

        // Load outside the lock so other paths are not blocked
        let table = Arc::new(self.reader.load(path, schema)?);
        self.lock().insert(
            path.to_path_buf(),
            Entry {
                stamp,
                schema: schema.cloned(),
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    /// Drop the entry for one path; returns whether one existed
    pub fn invalidate(&self, path: &Path) -> bool {
        self.lock().remove(path).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Entry>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_hit_and_reload_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hits.csv");
        fs::write(&path, "hit_id,x\n1,0.5\n").unwrap();

        let cache = TableCache::default();
        let first = cache.get_or_load(&path, None).unwrap();
        let second = cache.get_or_load(&path, None).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        // Length changes even if the mtime granularity hides the rewrite
        fs::write(&path, "hit_id,x\n1,0.5\n2,1.5\n").unwrap();
        let third = cache.get_or_load(&path, None).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.row_count(), 2);
    }

    #[test]
    fn test_schema_change_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hits.csv");
        fs::write(&path, "hit_id,x\n1,2\n").unwrap();

        let cache = TableCache::default();
        let inferred = cache.get_or_load(&path, None).unwrap();
        let schema: Schema = "hit_id:int,x:float".parse().unwrap();
        let declared = cache.get_or_load(&path, Some(&schema)).unwrap();
        assert!(!Arc::ptr_eq(&inferred, &declared));
        assert_eq!(declared.schema(), &schema);
    }

    #[test]
    fn test_invalidate_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truth.csv");
        fs::write(&path, "hit_id,particle_id\n1,5\n").unwrap();

        let cache = TableCache::default();
        cache.get_or_load(&path, None).unwrap();
        assert!(cache.invalidate(&path));
        assert!(cache.is_empty());

        let missing = dir.path().join("nope.csv");
        assert!(matches!(
            cache.get_or_load(&missing, None),
            Err(ReadError::NotFound { .. })
        ));
        assert!(cache.is_empty());
    }
}
