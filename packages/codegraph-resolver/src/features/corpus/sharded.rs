//! Sharded corpus with lazy structural detail

use super::ports::{DetailProvider, EntityCorpus};
use super::sorted::{contains, merge_shards};
use crate::errors::{ResolverError, ResolverResult};
use crate::shared::models::{Modifiers, TypeDetail, TypeEntity};
use crate::shared::utils::descriptor::primitive_abbreviation;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Access counters, mainly for tests and diagnostics
#[derive(Debug, Default)]
pub struct CorpusStats {
    /// Calls to [`EntityCorpus::sorted_names`] (one per full-index scan)
    pub name_scans: AtomicUsize,
    /// Details pulled from the provider (cache misses)
    pub detail_fetches: AtomicUsize,
}

/// [`EntityCorpus`] built from a [`DetailProvider`]
///
/// Name shards are merged once at construction. Structural detail is pulled
/// from the provider on first request and memoized; nothing is preloaded.
pub struct ShardedCorpus<P: DetailProvider> {
    provider: P,
    names: Vec<Arc<str>>,
    strings: Vec<Arc<str>>,
    details: DashMap<Arc<str>, Arc<TypeDetail>>,
    stats: CorpusStats,
}

impl<P: DetailProvider> ShardedCorpus<P> {
    pub fn new(provider: P) -> Self {
        let names = merge_shards(provider.name_shards());
        let strings = merge_shards(provider.string_shards());
        tracing::debug!(types = names.len(), strings = strings.len(), "corpus index merged");

        Self {
            provider,
            names,
            strings,
            details: DashMap::new(),
            stats: CorpusStats::default(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }

    /// Primitive or array-of-known type
    fn synthetic_detail(&self, name: &str) -> Option<TypeDetail> {
        let base = name.trim_end_matches("[]");
        let is_array = base.len() != name.len();
        let sealed = Modifiers::PUBLIC | Modifiers::FINAL | Modifiers::ABSTRACT;

        if primitive_abbreviation(base).is_some() {
            let detail = TypeDetail::new(name).with_modifiers(sealed);
            return Some(if is_array {
                detail.with_super_type("java.lang.Object")
            } else {
                detail
            });
        }
        if is_array && contains(&self.names, base) {
            return Some(
                TypeDetail::new(name)
                    .with_modifiers(sealed)
                    .with_super_type("java.lang.Object"),
            );
        }
        None
    }
}

impl<P: DetailProvider> EntityCorpus for ShardedCorpus<P> {
    fn sorted_names(&self) -> &[Arc<str>] {
        self.stats.name_scans.fetch_add(1, Ordering::Relaxed);
        &self.names
    }

    fn load_type(&self, name: &str) -> ResolverResult<TypeEntity> {
        let base = name.trim_end_matches("[]");
        if contains(&self.names, base) || primitive_abbreviation(base).is_some() {
            Ok(TypeEntity::new(name))
        } else {
            Err(ResolverError::not_found(name))
        }
    }

    fn structural_detail(&self, ty: &TypeEntity) -> ResolverResult<Arc<TypeDetail>> {
        if let Some(detail) = self.details.get(&ty.name) {
            return Ok(detail.clone());
        }

        let fetched = if contains(&self.names, &ty.name) {
            self.stats.detail_fetches.fetch_add(1, Ordering::Relaxed);
            self.provider.fetch_detail(&ty.name)
        } else {
            self.synthetic_detail(&ty.name)
        };

        let detail = Arc::new(fetched.ok_or_else(|| ResolverError::not_found(ty.name()))?);
        self.details.insert(ty.name.clone(), detail.clone());
        Ok(detail)
    }

    fn string_literals(&self) -> &[Arc<str>] {
        &self.strings
    }

    fn last_modified_ns(&self) -> Option<u64> {
        self.provider.last_modified_ns()
    }

    fn contains(&self, name: &str) -> bool {
        contains(&self.names, name)
    }
}
