//! Two-phase cache bootstrap
//!
//! Phase 1 ([`seed_from_snapshot`]) settles keyed results straight from a
//! trusted snapshot. It runs before any executor exists, so every piece of
//! callback work it triggers is recorded into a
//! [`crate::features::resolution::PendingDispatch`]. Phase 2 is the replay of
//! that recording onto the delivery context, done by the session once the
//! context is up.
//!
//! Settlement goes through the normal commit path, so dependents observe a
//! seeded result exactly as they would a scanned one.

use super::snapshot::{CacheMetadata, CacheSnapshot};
use crate::errors::ResolverError;
use crate::features::corpus::{sorted, EntityCorpus};
use crate::features::resolution::dispatch::Dispatch;
use crate::features::resolution::registry::{KeyRegistry, KeyedTarget, KeyedValue};
use crate::features::signature::SignatureResolver;
use crate::shared::models::{Entity, EntityKind, Kind, StringEntity};
use std::sync::Arc;

/// What phase 1 did with the snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Keys settled from the snapshot
    pub hits: usize,
    /// Snapshot keys that were ignored, with the reason
    pub dropped: Vec<(String, String)>,
}

impl SeedOutcome {
    fn drop_key(&mut self, key: &str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(key, %reason, "cache entry dropped");
        self.dropped.push((key.to_string(), reason));
    }
}

/// Resolve a persisted identifier against the current corpus
pub fn restore_entity(
    kind: Kind,
    identifier: &str,
    corpus: &dyn EntityCorpus,
    signatures: &SignatureResolver,
) -> Result<Entity, ResolverError> {
    let entity = match kind {
        Kind::Type => corpus.load_type(identifier)?.into_entity(),
        Kind::String => {
            if !sorted::contains(corpus.string_literals(), identifier) {
                return Err(ResolverError::not_found(identifier));
            }
            StringEntity(Arc::from(identifier)).into_entity()
        }
        Kind::Field | Kind::Method | Kind::Constructor => (*signatures.resolve(identifier)?).clone(),
    };
    if entity.kind() != kind {
        return Err(ResolverError::invalid_signature(
            identifier,
            format!("expected a {}, found a {}", kind, entity.kind()),
        ));
    }
    Ok(entity)
}

fn seed_one(
    target: &dyn KeyedTarget,
    kind: Kind,
    identifiers: &[String],
    corpus: &dyn EntityCorpus,
    signatures: &SignatureResolver,
    sink: &dyn Dispatch,
) -> Result<(), String> {
    if target.kind() != kind {
        return Err(format!("cached {} but key holds a {}", kind, target.kind()));
    }
    if !target.is_pending() {
        return Err("result already settled".to_string());
    }

    let entities = identifiers
        .iter()
        .map(|id| restore_entity(kind, id, corpus, signatures))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    if target.seed(entities, sink) {
        Ok(())
    } else {
        Err("cached value does not fit the result".to_string())
    }
}

/// Phase 1: settle every keyed result the snapshot still vouches for
///
/// Entries with no registered key, a kind or shape mismatch, or an
/// identifier that no longer resolves are dropped; their results are left
/// for live evaluation.
pub(crate) fn seed_from_snapshot(
    keys: &KeyRegistry,
    snapshot: &CacheSnapshot,
    corpus: &dyn EntityCorpus,
    signatures: &SignatureResolver,
    sink: &dyn Dispatch,
) -> SeedOutcome {
    let mut outcome = SeedOutcome::default();

    let singles = snapshot
        .singles
        .iter()
        .map(|(key, cached)| (key, cached.kind, std::slice::from_ref(&cached.identifier), false));
    let collections = snapshot
        .collections
        .iter()
        .map(|(key, cached)| (key, cached.kind, cached.identifiers.as_slice(), true));

    for (key, kind, identifiers, is_collection) in singles.chain(collections) {
        let Some(target) = keys.get(key) else {
            outcome.drop_key(key, "no result carries this key");
            continue;
        };
        if target.is_collection() != is_collection {
            outcome.drop_key(key, "single/collection mismatch");
            continue;
        }
        match seed_one(&*target, kind, identifiers, corpus, signatures, sink) {
            Ok(()) => {
                tracing::debug!(key = %key, target = %target.label(), "seeded from cache");
                outcome.hits += 1;
            }
            Err(reason) => outcome.drop_key(key, reason),
        }
    }
    outcome
}

/// Collect every matched keyed result into a snapshot
pub(crate) fn capture_snapshot(keys: &KeyRegistry, metadata: CacheMetadata) -> CacheSnapshot {
    let mut snapshot = CacheSnapshot::new(metadata);
    for (key, target) in keys.entries() {
        match target.snapshot() {
            Some(KeyedValue::Single(entity)) => snapshot.insert_single(key, &entity),
            Some(KeyedValue::Many(entities)) => {
                snapshot.insert_collection(key, target.kind(), &entities)
            }
            None => {}
        }
    }
    snapshot
}
