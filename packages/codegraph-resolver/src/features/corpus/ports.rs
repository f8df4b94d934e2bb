//! Corpus ports
//!
//! The engine is agnostic to how entity detail is obtained. [`EntityCorpus`]
//! is what the resolver consumes; [`DetailProvider`] is the narrower seam an
//! extension implements to plug a new storage format (class files, dex,
//! JSON manifests, ...) into [`super::ShardedCorpus`].

use super::sorted;
use crate::errors::ResolverResult;
use crate::shared::models::{TypeDetail, TypeEntity};
use std::sync::Arc;

/// Enumerable, pre-sorted collection of program-metadata entities
pub trait EntityCorpus: Send + Sync {
    /// Every qualified type name, globally sorted and deduplicated
    fn sorted_names(&self) -> &[Arc<str>];

    /// Resolve a type handle by qualified name
    fn load_type(&self, name: &str) -> ResolverResult<TypeEntity>;

    /// Modifiers, supertype, interfaces and members of `ty`, fetched on demand
    fn structural_detail(&self, ty: &TypeEntity) -> ResolverResult<Arc<TypeDetail>>;

    /// Sorted, deduplicated string-literal pool
    fn string_literals(&self) -> &[Arc<str>] {
        &[]
    }

    /// Modification time of the backing storage (nanoseconds since epoch)
    fn last_modified_ns(&self) -> Option<u64> {
        None
    }

    fn contains(&self, name: &str) -> bool {
        sorted::contains(self.sorted_names(), name)
    }
}

/// Storage seam behind [`super::ShardedCorpus`]
pub trait DetailProvider: Send + Sync {
    /// Type names per shard; each shard sorted and deduplicated
    fn name_shards(&self) -> Vec<Vec<Arc<str>>>;

    /// Structural detail of one type, `None` when absent
    fn fetch_detail(&self, name: &str) -> Option<TypeDetail>;

    /// String literals per shard; each shard sorted and deduplicated
    fn string_shards(&self) -> Vec<Vec<Arc<str>>> {
        Vec::new()
    }

    fn last_modified_ns(&self) -> Option<u64> {
        None
    }
}
