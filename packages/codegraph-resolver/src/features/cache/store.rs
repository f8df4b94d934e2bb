//! Snapshot persistence
//!
//! bincode encoding, atomic writes (tmp file + rename), and a version check
//! on load.

use super::error::{CacheError, CacheResult};
use super::snapshot::CacheSnapshot;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn encode(snapshot: &CacheSnapshot) -> CacheResult<Vec<u8>> {
    bincode::serialize(snapshot).map_err(|e| CacheError::Serialization(e.to_string()))
}

pub fn decode(bytes: &[u8]) -> CacheResult<CacheSnapshot> {
    let snapshot: CacheSnapshot =
        bincode::deserialize(bytes).map_err(|e| CacheError::Deserialization(e.to_string()))?;

    if snapshot.version != CacheSnapshot::VERSION {
        return Err(CacheError::VersionMismatch {
            found: snapshot.version,
            expected: CacheSnapshot::VERSION,
        });
    }
    if let Some(key) = snapshot.overlapping_keys().first() {
        return Err(CacheError::Inconsistent(format!(
            "key '{}' is both single and collection",
            key
        )));
    }
    Ok(snapshot)
}

/// File-backed snapshot store
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no snapshot has been written yet
    pub fn load(&self) -> CacheResult<Option<CacheSnapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(&bytes).map(Some)
    }

    pub fn store(&self, snapshot: &CacheSnapshot) -> CacheResult<()> {
        let bytes = encode(snapshot)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Atomic write: tmp file + rename
        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            entries = snapshot.len(),
            bytes = bytes.len(),
            "cache snapshot written"
        );
        Ok(())
    }
}
