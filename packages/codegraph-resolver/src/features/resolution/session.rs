//! Resolution session
//!
//! # Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Graph construction (caller thread)                               │
//! │   session.types(..), first_method(..), or_else, on_match, key    │
//! │   → criteria frozen into nodes, consumers recorded as interest   │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ resolve(): cycle check, then driver thread                       │
//! │   1. Snapshot: load, validate, seed keyed results (recorded)     │
//! │   2. Delivery context up; recorded work replayed onto it         │
//! │   3. Go live: interest becomes demand, join barriers seal        │
//! │   4. Scheduler rounds to the fixed point                         │
//! │   5. Drain callbacks, build report, persist snapshot             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use super::cell::{ResultCell, ResultSet};
use super::completion::Completion;
use super::context::SessionContext;
use super::dispatch::{DeliveryContext, Dispatch, PendingDispatch};
use super::join::JoinBarrier;
use super::node::{CriteriaNode, Schedulable};
use super::report::{CacheOutcome, MatchResult, ResolutionReport};
use super::scheduler::{stalled, Scheduler};
use crate::config::ResolverConfig;
use crate::errors::{Diagnostic, ResolverError, ResolverResult};
use crate::features::cache::bootstrap::{capture_snapshot, seed_from_snapshot};
use crate::features::cache::{
    default_validator, describe_corpus, CacheMetadata, CacheSnapshot, CacheStore, CacheValidator,
};
use crate::features::corpus::EntityCorpus;
use crate::features::criteria::{
    ConstructorCriteria, Criteria, Exact, FieldCriteria, MethodCriteria, StringCriteria,
    TypeCriteria,
};
use crate::features::signature::SignatureResolver;
use crate::shared::models::{
    ConstructorEntity, EntityKind, FieldEntity, Member, MethodEntity, StringEntity, TypeEntity,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// One resolution: graph construction, then a single `resolve()`
pub struct ResolutionSession {
    ctx: Arc<SessionContext>,
    corpus: Arc<dyn EntityCorpus>,
    config: ResolverConfig,
    signatures: Arc<SignatureResolver>,
    validator: CacheValidator,
    snapshot: Mutex<Option<CacheSnapshot>>,
    nodes: Mutex<Vec<Arc<dyn Schedulable>>>,
}

impl ResolutionSession {
    pub fn new(corpus: Arc<dyn EntityCorpus>, config: ResolverConfig) -> ResolverResult<Self> {
        config.validate()?;
        let ctx = SessionContext::new();
        tracing::debug!(session = %ctx.id, preset = %config.preset, "session created");

        Ok(Self {
            signatures: Arc::new(SignatureResolver::new(corpus.clone())),
            ctx,
            corpus,
            config,
            validator: default_validator(),
            snapshot: Mutex::new(None),
            nodes: Mutex::new(Vec::new()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.ctx.id
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn corpus(&self) -> &Arc<dyn EntityCorpus> {
        &self.corpus
    }

    pub fn signatures(&self) -> &SignatureResolver {
        &self.signatures
    }

    /// `true` = suppress and continue, `false` = stop scanning that criteria
    pub fn set_error_handler(
        &self,
        handler: impl Fn(&ResolverError) -> bool + Send + Sync + 'static,
    ) {
        self.ctx.errors.set_handler(Arc::new(handler));
    }

    pub fn set_cache_validator(
        &mut self,
        validator: impl Fn(&CacheMetadata, &dyn EntityCorpus) -> bool + Send + Sync + 'static,
    ) {
        self.validator = Arc::new(validator);
    }

    /// Seed from this snapshot instead of the configured cache file
    pub fn use_snapshot(&self, snapshot: CacheSnapshot) {
        *self.snapshot.lock() = Some(snapshot);
    }

    /// Failures recorded so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.ctx.errors.diagnostics()
    }

    pub fn criteria_count(&self) -> usize {
        self.nodes.lock().len()
    }

    fn finalize<C: Criteria>(&self, criteria: C) -> ResultSet<C::Item> {
        let node = CriteriaNode::finalize(&self.ctx, criteria);
        let output = node.output().clone();
        self.nodes.lock().push(node as Arc<dyn Schedulable>);
        ResultSet::from_lazy(output)
    }

    fn set_of<C: Criteria>(&self, mut criteria: C) -> ResolverResult<ResultSet<C::Item>> {
        let key = criteria.common_mut().key.take();
        let set = self.finalize(criteria);
        if let Some(key) = key {
            set.set_key(key)?;
        }
        Ok(set)
    }

    fn first_of<C: Criteria>(&self, mut criteria: C) -> ResolverResult<ResultCell<C::Item>> {
        let key = criteria.common_mut().key.take();
        criteria.common_mut().match_first = true;
        let cell = self.finalize(criteria).first();
        if let Some(key) = key {
            cell.set_key(key)?;
        }
        Ok(cell)
    }

    pub fn types(&self, criteria: TypeCriteria) -> ResolverResult<ResultSet<TypeEntity>> {
        self.set_of(criteria)
    }

    pub fn first_type(&self, criteria: TypeCriteria) -> ResolverResult<ResultCell<TypeEntity>> {
        self.first_of(criteria)
    }

    pub fn fields(&self, criteria: FieldCriteria) -> ResolverResult<ResultSet<FieldEntity>> {
        self.set_of(criteria)
    }

    pub fn first_field(&self, criteria: FieldCriteria) -> ResolverResult<ResultCell<FieldEntity>> {
        self.first_of(criteria)
    }

    pub fn methods(&self, criteria: MethodCriteria) -> ResolverResult<ResultSet<MethodEntity>> {
        self.set_of(criteria)
    }

    pub fn first_method(
        &self,
        criteria: MethodCriteria,
    ) -> ResolverResult<ResultCell<MethodEntity>> {
        self.first_of(criteria)
    }

    pub fn constructors(
        &self,
        criteria: ConstructorCriteria,
    ) -> ResolverResult<ResultSet<ConstructorEntity>> {
        self.set_of(criteria)
    }

    pub fn first_constructor(
        &self,
        criteria: ConstructorCriteria,
    ) -> ResolverResult<ResultCell<ConstructorEntity>> {
        self.first_of(criteria)
    }

    pub fn strings(&self, criteria: StringCriteria) -> ResolverResult<ResultSet<StringEntity>> {
        self.set_of(criteria)
    }

    pub fn first_string(
        &self,
        criteria: StringCriteria,
    ) -> ResolverResult<ResultCell<StringEntity>> {
        self.first_of(criteria)
    }

    /// Declaring types of `members` that satisfy `criteria`, in first-seen order
    pub fn declaring_types<E: Member>(
        &self,
        members: &ResultSet<E>,
        criteria: TypeCriteria,
    ) -> ResolverResult<ResultSet<TypeEntity>> {
        self.types(criteria.among(&members.declaring_types()))
    }

    pub fn first_declaring_type<E: Member>(
        &self,
        members: &ResultSet<E>,
        criteria: TypeCriteria,
    ) -> ResolverResult<ResultCell<TypeEntity>> {
        self.first_type(criteria.among(&members.declaring_types()))
    }

    /// Bind an exact value, or report `EntityNotFound` and bind a miss
    fn bind_exact<E: EntityKind>(&self, name: &str, found: ResolverResult<E>) -> Exact<E> {
        match found {
            Ok(value) => Exact::Bound(value),
            Err(err) => {
                self.ctx.errors.report(err);
                Exact::Unresolvable(name.to_string())
            }
        }
    }

    /// Type by qualified name
    pub fn exact_type(&self, name: &str) -> ResolverResult<ResultCell<TypeEntity>> {
        let exact = self.bind_exact(name, self.signatures.resolve_type(name));
        self.first_type(TypeCriteria::new().exact(exact))
    }

    /// Field by signature, e.g. `La/B;->count:I` or `a.B.count`
    pub fn exact_field(&self, signature: &str) -> ResolverResult<ResultCell<FieldEntity>> {
        let exact = self.bind_exact(signature, self.signatures.resolve_field(signature));
        self.first_field(FieldCriteria::new().exact(exact))
    }

    pub fn exact_method(&self, signature: &str) -> ResolverResult<ResultCell<MethodEntity>> {
        let exact = self.bind_exact(signature, self.signatures.resolve_method(signature));
        self.first_method(MethodCriteria::new().exact(exact))
    }

    pub fn exact_constructor(
        &self,
        signature: &str,
    ) -> ResolverResult<ResultCell<ConstructorEntity>> {
        let exact = self.bind_exact(signature, self.signatures.resolve_constructor(signature));
        self.first_constructor(ConstructorCriteria::new().exact(exact))
    }

    /// Direct supertype of a resolved type; misses for roots
    pub fn super_type(&self, ty: &ResultCell<TypeEntity>) -> ResultCell<TypeEntity> {
        let corpus = self.corpus.clone();
        let label = format!("super_type({})", ty.label());
        ResultCell::from_lazy(ty.lazy().derive(label, move |ty: &TypeEntity| {
            let detail = corpus.structural_detail(ty)?;
            Ok(detail.super_type.clone().map(TypeEntity::new))
        }))
    }

    /// Directly implemented interfaces; matches empty when there are none
    pub fn interfaces(&self, ty: &ResultCell<TypeEntity>) -> ResultSet<TypeEntity> {
        let corpus = self.corpus.clone();
        let label = format!("interfaces({})", ty.label());
        ResultSet::from_lazy(ty.lazy().derive(label, move |ty: &TypeEntity| {
            let detail = corpus.structural_detail(ty)?;
            let interfaces: Vec<TypeEntity> =
                detail.interfaces.iter().cloned().map(TypeEntity::new).collect();
            Ok(Some(Arc::from(interfaces)))
        }))
    }

    pub fn join_barrier(&self, label: &str) -> JoinBarrier {
        JoinBarrier::new(&self.ctx, label)
    }

    /// Start resolving on a driver thread
    ///
    /// Fails fast on a cyclic criteria graph (unless `fail_on_cycle` is off).
    pub fn resolve(self) -> ResolverResult<Completion<ResolverResult<ResolutionReport>>> {
        if let Err(node) = self.ctx.check_cycles() {
            if self.config.fail_on_cycle {
                return Err(ResolverError::CycleDetected {
                    node: node.to_string(),
                });
            }
            tracing::warn!(session = %self.ctx.id, node = %node, "cyclic criteria graph; affected criteria will stall");
        }

        let (completer, completion) = Completion::channel();
        std::thread::Builder::new()
            .name("codegraph-resolver-driver".to_string())
            .spawn(move || completer.complete(self.drive()))
            .map_err(|e| ResolverError::Executor(e.to_string()))?;
        Ok(completion)
    }

    pub fn resolve_blocking(self) -> ResolverResult<ResolutionReport> {
        self.resolve()?.wait()
    }

    fn take_snapshot(&self) -> Option<CacheSnapshot> {
        if let Some(snapshot) = self.snapshot.lock().take() {
            return Some(snapshot);
        }
        if !self.config.cache.enabled {
            return None;
        }
        let path = self.config.cache.path.as_ref()?;
        match CacheStore::new(path).load() {
            Ok(snapshot) => snapshot,
            Err(err) if err.is_corrupt() => {
                tracing::warn!(path = %path.display(), error = %err, "cache snapshot discarded");
                self.ctx
                    .errors
                    .report(ResolverError::CacheCorrupt(err.to_string()));
                None
            }
            Err(err) => {
                self.ctx.errors.report(err.into());
                None
            }
        }
    }

    /// Phase 1 of the bootstrap; callback work lands in `recorded`
    fn seed(&self, recorded: &PendingDispatch) -> CacheOutcome {
        let mut outcome = CacheOutcome::default();
        let Some(snapshot) = self.take_snapshot() else {
            return outcome;
        };
        outcome.loaded = true;

        if !(self.validator)(&snapshot.metadata, &*self.corpus) {
            tracing::info!(session = %self.ctx.id, entries = snapshot.len(), "cache snapshot is stale; resolving live");
            return outcome;
        }
        outcome.trusted = true;

        let seeded = seed_from_snapshot(
            &self.ctx.keys,
            &snapshot,
            &*self.corpus,
            &self.signatures,
            recorded,
        );
        tracing::info!(
            session = %self.ctx.id,
            hits = seeded.hits,
            dropped = seeded.dropped.len(),
            recorded = recorded.len(),
            "cache snapshot applied"
        );
        outcome.hits = seeded.hits;
        outcome.dropped = seeded.dropped;
        outcome
    }

    fn persist(&self, snapshot: &CacheSnapshot) {
        let Some(path) = self.config.cache.persist_path() else {
            return;
        };
        if let Err(err) = CacheStore::new(path).store(snapshot) {
            tracing::warn!(path = %path.display(), error = %err, "cache snapshot not written");
            self.ctx.errors.report(err.into());
        }
    }

    fn drive(self) -> ResolverResult<ResolutionReport> {
        let started = Instant::now();
        let ctx = self.ctx.clone();
        let nodes = self.nodes.lock().clone();
        tracing::info!(session = %ctx.id, criteria = nodes.len(), keys = ctx.keys.len(), "resolution started");

        let recorded = PendingDispatch::new();
        let cache = self.seed(&recorded);

        let delivery = Arc::new(DeliveryContext::new(
            self.config.delivery.threads,
            ctx.errors.clone(),
        )?);
        ctx.install_delivery(delivery.clone() as Arc<dyn Dispatch>);
        recorded.replay(&*delivery);

        ctx.go_live();

        let scheduler = Scheduler::new(&self.config)?;
        tracing::debug!(session = %ctx.id, threads = scheduler.threads(), "scan pool ready");
        let summary = scheduler.run(&ctx, &*self.corpus, &nodes, &*delivery);
        delivery.wait_idle();
        let summary = summary?;
        if let Some(message) = ctx.errors.handler_failure() {
            return Err(ResolverError::HandlerFailed(message));
        }

        let stalled = stalled(&nodes);
        for label in &stalled {
            tracing::warn!(session = %ctx.id, criteria = %label, "demanded criteria never settled");
        }

        let snapshot = capture_snapshot(&ctx.keys, describe_corpus(&*self.corpus));
        self.persist(&snapshot);

        let report = ResolutionReport {
            session_id: ctx.id,
            rounds: summary.rounds,
            evaluations: summary.evaluations,
            candidates_tested: summary.candidates,
            cache,
            stalled,
            diagnostics: ctx.errors.diagnostics(),
            matches: MatchResult::collect(&ctx.keys),
            snapshot,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            session = %ctx.id,
            rounds = report.rounds,
            evaluations = report.evaluations,
            matches = report.matches.len(),
            diagnostics = report.diagnostics.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "resolution finished"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for ResolutionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionSession")
            .field("id", &self.ctx.id)
            .field("criteria", &self.criteria_count())
            .field("keys", &self.ctx.keys.len())
            .finish()
    }
}
