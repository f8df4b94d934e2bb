//! In-memory detail provider
//!
//! Backs tests and embedders that already hold extracted metadata. Can also
//! be loaded from a JSON manifest:
//!
//! ```json
//! {
//!   "shards": [[{"name": "a.A", "modifiers": 1, "super_type": "java.lang.Object"}]],
//!   "strings": [["hello"]]
//! }
//! ```

use super::ports::DetailProvider;
use crate::errors::{ResolverError, ResolverResult};
use crate::shared::models::TypeDetail;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// Serialized form of a [`MemoryProvider`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorpusManifest {
    #[serde(default)]
    pub shards: Vec<Vec<TypeDetail>>,
    #[serde(default)]
    pub strings: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    name_shards: Vec<Vec<Arc<str>>>,
    string_shards: Vec<Vec<Arc<str>>>,
    details: HashMap<Arc<str>, TypeDetail>,
    modified_ns: Option<u64>,
}

impl MemoryProvider {
    pub fn builder() -> MemoryProviderBuilder {
        MemoryProviderBuilder::default()
    }

    pub fn from_manifest(manifest: CorpusManifest) -> Self {
        let mut builder = Self::builder();
        for shard in manifest.shards {
            builder = builder.shard(shard);
        }
        for strings in manifest.strings {
            builder = builder.strings(strings);
        }
        builder.build()
    }

    pub fn from_json_str(json: &str) -> ResolverResult<Self> {
        let manifest: CorpusManifest =
            serde_json::from_str(json).map_err(|e| ResolverError::InvalidCorpus(e.to_string()))?;
        Ok(Self::from_manifest(manifest))
    }

    /// Load a manifest file; its mtime becomes the corpus modification time
    pub fn from_json_file(path: impl AsRef<Path>) -> ResolverResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut provider = Self::from_json_str(&json)?;
        provider.modified_ns = path
            .metadata()?
            .modified()?
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_nanos() as u64);
        Ok(provider)
    }

    pub fn set_modified_ns(&mut self, modified_ns: Option<u64>) {
        self.modified_ns = modified_ns;
    }
}

impl DetailProvider for MemoryProvider {
    fn name_shards(&self) -> Vec<Vec<Arc<str>>> {
        self.name_shards.clone()
    }

    fn fetch_detail(&self, name: &str) -> Option<TypeDetail> {
        self.details.get(name).cloned()
    }

    fn string_shards(&self) -> Vec<Vec<Arc<str>>> {
        self.string_shards.clone()
    }

    fn last_modified_ns(&self) -> Option<u64> {
        self.modified_ns
    }
}

#[derive(Debug, Default)]
pub struct MemoryProviderBuilder {
    provider: MemoryProvider,
}

impl MemoryProviderBuilder {
    /// Add one shard of types; the shard is sorted and deduplicated here
    pub fn shard(mut self, types: Vec<TypeDetail>) -> Self {
        let mut names: Vec<Arc<str>> = Vec::with_capacity(types.len());
        for detail in types {
            names.push(detail.name.clone());
            self.provider
                .details
                .entry(detail.name.clone())
                .or_insert(detail);
        }
        names.sort();
        names.dedup();
        self.provider.name_shards.push(names);
        self
    }

    pub fn strings<S: AsRef<str>>(mut self, literals: impl IntoIterator<Item = S>) -> Self {
        let mut shard: Vec<Arc<str>> = literals.into_iter().map(|s| Arc::from(s.as_ref())).collect();
        shard.sort();
        shard.dedup();
        self.provider.string_shards.push(shard);
        self
    }

    pub fn modified_ns(mut self, modified_ns: u64) -> Self {
        self.provider.modified_ns = Some(modified_ns);
        self
    }

    pub fn build(self) -> MemoryProvider {
        self.provider
    }
}
