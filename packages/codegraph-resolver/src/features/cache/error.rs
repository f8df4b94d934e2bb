//! Error types for the snapshot cache

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Snapshot decoded but its tables disagree with each other
    #[error("Inconsistent snapshot: {0}")]
    Inconsistent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// Whether the snapshot itself is unusable (as opposed to the filesystem)
    pub fn is_corrupt(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Serialization(_))
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
