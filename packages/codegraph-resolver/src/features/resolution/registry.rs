//! Session key registry
//!
//! Maps user keys to the cells and sets carrying them. The cache bootstrap
//! seeds through it, and the final report and snapshot are read from it.

use super::dispatch::Dispatch;
use super::lazy::Lazy;
use crate::errors::{ResolverError, ResolverResult};
use crate::shared::models::{Entity, EntityKind, Kind};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Resolved value behind a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyedValue {
    Single(Entity),
    Many(Vec<Entity>),
}

/// A keyed cell or set, with its entity type erased
pub(crate) trait KeyedTarget: Send + Sync {
    fn kind(&self) -> Kind;

    fn is_collection(&self) -> bool;

    fn label(&self) -> Arc<str>;

    fn is_pending(&self) -> bool;

    /// Matched value, `None` while pending or after a miss
    fn snapshot(&self) -> Option<KeyedValue>;

    /// Settle from restored entities; `false` if they do not fit this target
    fn seed(&self, entities: Vec<Entity>, sink: &dyn Dispatch) -> bool;
}

pub(crate) struct KeyedCell<E: EntityKind>(pub(crate) Arc<Lazy<E>>);

pub(crate) struct KeyedSet<E: EntityKind>(pub(crate) Arc<Lazy<Arc<[E]>>>);

impl<E: EntityKind> KeyedTarget for KeyedCell<E> {
    fn kind(&self) -> Kind {
        E::KIND
    }

    fn is_collection(&self) -> bool {
        false
    }

    fn label(&self) -> Arc<str> {
        self.0.label().clone()
    }

    fn is_pending(&self) -> bool {
        self.0.is_pending()
    }

    fn snapshot(&self) -> Option<KeyedValue> {
        self.0.value().map(|v| KeyedValue::Single(v.into_entity()))
    }

    fn seed(&self, entities: Vec<Entity>, sink: &dyn Dispatch) -> bool {
        let mut entities = entities.into_iter();
        match (entities.next().and_then(E::from_entity), entities.next()) {
            (Some(value), None) => self.0.settle_match(value, sink),
            _ => false,
        }
    }
}

impl<E: EntityKind> KeyedTarget for KeyedSet<E> {
    fn kind(&self) -> Kind {
        E::KIND
    }

    fn is_collection(&self) -> bool {
        true
    }

    fn label(&self) -> Arc<str> {
        self.0.label().clone()
    }

    fn is_pending(&self) -> bool {
        self.0.is_pending()
    }

    fn snapshot(&self) -> Option<KeyedValue> {
        self.0.value().map(|values| {
            KeyedValue::Many(values.iter().cloned().map(EntityKind::into_entity).collect())
        })
    }

    fn seed(&self, entities: Vec<Entity>, sink: &dyn Dispatch) -> bool {
        let values: Option<Vec<E>> = entities.into_iter().map(E::from_entity).collect();
        match values {
            Some(values) => self.0.settle_match(Arc::from(values), sink),
            None => false,
        }
    }
}

#[derive(Default)]
pub(crate) struct KeyRegistry {
    entries: DashMap<String, Arc<dyn KeyedTarget>>,
}

impl KeyRegistry {
    pub(crate) fn register(&self, key: String, target: Arc<dyn KeyedTarget>) -> ResolverResult<()> {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Err(ResolverError::KeyConflict {
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                tracing::debug!(key = %entry.key(), target = %target.label(), "key registered");
                entry.insert(target);
                Ok(())
            }
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<dyn KeyedTarget>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Every entry, sorted by key
    pub(crate) fn entries(&self) -> Vec<(String, Arc<dyn KeyedTarget>)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
