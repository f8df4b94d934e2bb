//! Resolution report
//!
//! What the caller gets back once the graph reaches its fixed point: keyed
//! matches per entity kind, scan counters, cache outcome, diagnostics, and the
//! snapshot to persist.

use super::registry::{KeyRegistry, KeyedValue};
use crate::errors::Diagnostic;
use crate::features::cache::CacheSnapshot;
use crate::shared::models::{
    ConstructorEntity, Entity, FieldEntity, MethodEntity, StringEntity, TypeEntity,
};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Keyed results, per entity kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub types: BTreeMap<String, TypeEntity>,
    pub fields: BTreeMap<String, FieldEntity>,
    pub methods: BTreeMap<String, MethodEntity>,
    pub constructors: BTreeMap<String, ConstructorEntity>,
    pub strings: BTreeMap<String, StringEntity>,
    /// Keyed sets, in corpus order
    pub collections: BTreeMap<String, Vec<Entity>>,
}

impl MatchResult {
    pub(crate) fn collect(keys: &KeyRegistry) -> Self {
        let mut result = Self::default();
        for (key, target) in keys.entries() {
            match target.snapshot() {
                Some(KeyedValue::Single(entity)) => result.insert(key, entity),
                Some(KeyedValue::Many(entities)) => {
                    result.collections.insert(key, entities);
                }
                None => {}
            }
        }
        result
    }

    fn insert(&mut self, key: String, entity: Entity) {
        match entity {
            Entity::Type(e) => {
                self.types.insert(key, e);
            }
            Entity::Field(e) => {
                self.fields.insert(key, e);
            }
            Entity::Method(e) => {
                self.methods.insert(key, e);
            }
            Entity::Constructor(e) => {
                self.constructors.insert(key, e);
            }
            Entity::String(e) => {
                self.strings.insert(key, e);
            }
        }
    }

    /// Single keyed result of any kind
    pub fn entity(&self, key: &str) -> Option<Entity> {
        use crate::shared::models::EntityKind;

        self.types
            .get(key)
            .map(|e| e.clone().into_entity())
            .or_else(|| self.fields.get(key).map(|e| e.clone().into_entity()))
            .or_else(|| self.methods.get(key).map(|e| e.clone().into_entity()))
            .or_else(|| self.constructors.get(key).map(|e| e.clone().into_entity()))
            .or_else(|| self.strings.get(key).map(|e| e.clone().into_entity()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
            + self.fields.len()
            + self.methods.len()
            + self.constructors.len()
            + self.strings.len()
            + self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What happened to the snapshot cache in one resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOutcome {
    /// A snapshot was available
    pub loaded: bool,
    /// The validator accepted it
    pub trusted: bool,
    /// Keys settled from it without scanning
    pub hits: usize,
    /// Snapshot keys ignored, with the reason
    pub dropped: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct ResolutionReport {
    pub session_id: Uuid,
    pub rounds: usize,
    /// Criteria evaluations against the corpus
    pub evaluations: usize,
    pub candidates_tested: usize,
    pub cache: CacheOutcome,
    /// Demanded criteria that never settled
    pub stalled: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub matches: MatchResult,
    /// Snapshot of every matched keyed result
    pub snapshot: CacheSnapshot,
    pub elapsed: Duration,
}

impl ResolutionReport {
    /// No diagnostics and nothing stalled
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.stalled.is_empty()
    }
}
