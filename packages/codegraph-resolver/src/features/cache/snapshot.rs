//! Cache snapshot format
//!
//! Tables are `BTreeMap`s so encoding is deterministic: a snapshot written,
//! read back and written again produces identical bytes.

use super::fingerprint::Fingerprint;
use crate::shared::models::{Entity, Kind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Validation metadata stored alongside the tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Corpus modification time when the snapshot was captured
    pub corpus_modified_ns: Option<u64>,
    pub corpus_fingerprint: Fingerprint,
    /// Opaque caller data, carried through unchanged
    pub extra: BTreeMap<String, String>,
}

/// One cached single-entity result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedIdentifier {
    pub kind: Kind,
    pub identifier: String,
}

/// One cached collection result, in corpus order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCollection {
    pub kind: Kind,
    pub identifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    pub version: u32,
    pub metadata: CacheMetadata,
    pub singles: BTreeMap<String, CachedIdentifier>,
    pub collections: BTreeMap<String, CachedCollection>,
}

impl CacheSnapshot {
    pub const VERSION: u32 = 1;

    pub fn new(metadata: CacheMetadata) -> Self {
        Self {
            version: Self::VERSION,
            metadata,
            singles: BTreeMap::new(),
            collections: BTreeMap::new(),
        }
    }

    pub fn insert_single(&mut self, key: impl Into<String>, entity: &Entity) {
        self.singles.insert(
            key.into(),
            CachedIdentifier {
                kind: entity.kind(),
                identifier: entity.identifier(),
            },
        );
    }

    /// Record a collection; every entity must be of `kind`
    pub fn insert_collection(&mut self, key: impl Into<String>, kind: Kind, entities: &[Entity]) {
        self.collections.insert(
            key.into(),
            CachedCollection {
                kind,
                identifiers: entities.iter().map(Entity::identifier).collect(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.singles.len() + self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.singles.contains_key(key) || self.collections.contains_key(key)
    }

    /// Keys present in both tables, sorted
    pub fn overlapping_keys(&self) -> Vec<&str> {
        self.singles
            .keys()
            .filter(|key| self.collections.contains_key(*key))
            .map(String::as_str)
            .collect()
    }
}
