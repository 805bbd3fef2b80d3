// ============================================================
// Layer 6 — Storage
// ============================================================
// Two `Storage` implementations:
//
//   FileStorage   → local disk
//                   write: NamedTempFile in the target's own
//                   directory, then persist (rename). Readers
//                   see either the old file or the new one.
//   MemoryStorage → BTreeMap<PathBuf, bytes> behind a Mutex
//
// Reference: tempfile crate documentation (NamedTempFile::persist)

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::NamedTempFile;

use crate::domain::traits::Storage;
use crate::error::{Error, Result};

// ─── FileStorage ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl FileStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FileStorage {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| Error::io(path, e))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        // temp file in the target dir so the rename stays on one filesystem
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        tmp.write_all(bytes).map_err(|e| Error::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
        // replaces `path` in one step; readers never see a partial file
        tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

        tracing::debug!("Wrote {} bytes to '{}'", bytes.len(), path.display());
        Ok(())
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
    }
}

// ─── MemoryStorage ────────────────────────────────────────────────────────────
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path written so far, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files().keys().cloned().collect()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        // a panic while holding the lock cannot leave the map half-updated
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files().get(path).cloned().ok_or_else(|| {
            Error::io(path, io::Error::new(io::ErrorKind::NotFound, "no such file"))
        })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.files().insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn ensure_dir(&self, _dir: &Path) -> Result<()> {
        Ok(())
    }
}
