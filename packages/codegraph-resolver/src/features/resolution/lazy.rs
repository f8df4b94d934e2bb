//! Lazily-settled result holder
//!
//! [`Lazy<T>`] is the single core behind both [`super::ResultCell`]
//! (`T = E`) and [`super::ResultSet`] (`T = Arc<[E]>`).
//!
//! ```text
//!            settle_match                    ┌──────────────┐
//! Pending ─────────────────────────────────► │ Matched(v)   │
//!    │                                       └──────────────┘
//!    │ settle_miss, fallback queued          ┌──────────────┐
//!    ├─────────────────────────► Substituting│ forwards the │
//!    │                               │       │ fallback 1:1 │
//!    │ settle_miss, queue empty      ▼       └──────────────┘
//!    └─────────────────────────► Missed
//! ```
//!
//! Settlement is commit-once: later attempts are silent no-ops. Observers run
//! exactly once, in registration order. Internal observers (dependency
//! edges, derivations, fallback forwarding, join barriers) run inline on the
//! settling thread; user callbacks are handed to the dispatch target.

use super::context::{Activate, EdgeKind, NodeId, SessionContext};
use super::dispatch::{Dispatch, Job};
use super::node::DependencyEdge;
use crate::errors::ResolverResult;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Values a [`Lazy`] can hold
pub trait LazyValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> LazyValue for T {}

/// Public settlement state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Pending,
    Matched,
    Missed,
}

/// Settlement as seen by an observer
pub(crate) enum Outcome<'a, T> {
    Matched(&'a T),
    Missed,
}

impl<T> Clone for Outcome<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Outcome<'_, T> {}

pub(crate) type InternalObserver<T> = Box<dyn FnOnce(Outcome<'_, T>, &dyn Dispatch) + Send>;

pub(crate) enum Observer<T> {
    /// User match callback, dispatched
    Match(Box<dyn FnOnce(&T) + Send>),
    /// User miss callback, dispatched
    Miss(Box<dyn FnOnce() + Send>),
    /// Engine bookkeeping, run inline
    Internal(InternalObserver<T>),
}

/// Anything demand can be pushed into
pub(crate) trait Demand: Send + Sync {
    fn demand(&self);
}

/// Type-erased prerequisite handle
pub(crate) trait Dependable: Demand {
    fn node_id(&self) -> NodeId;

    fn subscribe_edge(&self, edge: DependencyEdge);
}

enum Settlement<T> {
    Pending,
    Substituting,
    Matched(T),
    Missed,
}

struct Slot<T: LazyValue> {
    settlement: Settlement<T>,
    observers: Vec<Observer<T>>,
    fallbacks: VecDeque<Arc<Lazy<T>>>,
}

impl<T: LazyValue> Slot<T> {
    /// Whether a settlement attempt may proceed
    ///
    /// While substituting, only the forwarded fallback outcome is accepted.
    fn accepts(&self, from_fallback: bool) -> bool {
        match self.settlement {
            Settlement::Pending => !from_fallback,
            Settlement::Substituting => from_fallback,
            Settlement::Matched(_) | Settlement::Missed => false,
        }
    }
}

pub(crate) struct Lazy<T: LazyValue> {
    id: NodeId,
    label: Arc<str>,
    ctx: Arc<SessionContext>,
    slot: Mutex<Slot<T>>,
    /// A terminal consumer is attached
    wanted: AtomicBool,
    demanded: AtomicBool,
    source: Option<Weak<dyn Demand>>,
}

impl<T: LazyValue> Lazy<T> {
    pub(crate) fn new(
        ctx: &Arc<SessionContext>,
        label: impl Into<String>,
        source: Option<Weak<dyn Demand>>,
    ) -> Arc<Self> {
        let (id, label) = ctx.allocate(label.into());
        let lazy = Arc::new(Self {
            id,
            label,
            ctx: ctx.clone(),
            slot: Mutex::new(Slot {
                settlement: Settlement::Pending,
                observers: Vec::new(),
                fallbacks: VecDeque::new(),
            }),
            wanted: AtomicBool::new(false),
            demanded: AtomicBool::new(false),
            source,
        });
        let activatable: Weak<dyn Activate> = Arc::downgrade(&lazy) as Weak<dyn Activate>;
        ctx.track(activatable);
        lazy
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn label(&self) -> &Arc<str> {
        &self.label
    }

    pub(crate) fn ctx(&self) -> &Arc<SessionContext> {
        &self.ctx
    }

    pub(crate) fn value(&self) -> Option<T> {
        match &self.slot.lock().settlement {
            Settlement::Matched(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub(crate) fn state(&self) -> CellState {
        match self.slot.lock().settlement {
            Settlement::Pending | Settlement::Substituting => CellState::Pending,
            Settlement::Matched(_) => CellState::Matched,
            Settlement::Missed => CellState::Missed,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.state() == CellState::Pending
    }

    pub(crate) fn is_demanded(&self) -> bool {
        self.demanded.load(Ordering::Acquire)
    }

    /// A terminal consumer attached (callback, key, join barrier)
    ///
    /// During graph construction this only records interest; demand is
    /// pushed upward when the session goes live, after cache seeding.
    pub(crate) fn request(&self) {
        self.wanted.store(true, Ordering::Release);
        if self.ctx.is_live() {
            self.demand();
        }
    }

    pub(crate) fn subscribe(&self, observer: Observer<T>, sink: &dyn Dispatch) {
        let settled = {
            let mut guard = self.slot.lock();
            let slot = &mut *guard;
            match &slot.settlement {
                Settlement::Pending | Settlement::Substituting => {
                    slot.observers.push(observer);
                    return;
                }
                Settlement::Matched(value) => Some(value.clone()),
                Settlement::Missed => None,
            }
        };

        let observers = vec![observer];
        match settled {
            Some(value) => self.notify(observers, Outcome::Matched(&value), sink),
            None => self.notify(observers, Outcome::Missed, sink),
        }
    }

    /// Subscribe using the session's current dispatch target
    pub(crate) fn subscribe_now(&self, observer: Observer<T>) {
        let dispatcher = self.ctx.dispatcher();
        self.subscribe(observer, &*dispatcher);
    }

    /// Queue a fallback consulted, in order, if this settles as a miss
    pub(crate) fn push_fallback(&self, fallback: Arc<Lazy<T>>) {
        self.ctx.record_edge(fallback.id, self.id, EdgeKind::Fallback);
        let mut slot = self.slot.lock();
        if matches!(
            slot.settlement,
            Settlement::Pending | Settlement::Substituting
        ) {
            slot.fallbacks.push_back(fallback);
        }
    }

    /// Commit a match; `false` if already settled
    pub(crate) fn settle_match(&self, value: T, sink: &dyn Dispatch) -> bool {
        self.commit(value, false, sink)
    }

    /// Commit a miss, or start substituting the next fallback
    pub(crate) fn settle_miss(self: &Arc<Self>, sink: &dyn Dispatch) -> bool {
        self.miss(false, sink)
    }

    fn commit(&self, value: T, from_fallback: bool, sink: &dyn Dispatch) -> bool {
        let observers = {
            let mut slot = self.slot.lock();
            if !slot.accepts(from_fallback) {
                return false;
            }
            slot.settlement = Settlement::Matched(value.clone());
            slot.fallbacks.clear();
            std::mem::take(&mut slot.observers)
        };

        tracing::debug!(cell = %self.label, observers = observers.len(), "matched");
        self.notify(observers, Outcome::Matched(&value), sink);
        true
    }

    fn miss(self: &Arc<Self>, from_fallback: bool, sink: &dyn Dispatch) -> bool {
        enum Next<T: LazyValue> {
            Substitute(Arc<Lazy<T>>),
            Final(Vec<Observer<T>>),
        }

        let next = {
            let mut slot = self.slot.lock();
            if !slot.accepts(from_fallback) {
                return false;
            }
            match slot.fallbacks.pop_front() {
                Some(fallback) => {
                    slot.settlement = Settlement::Substituting;
                    Next::Substitute(fallback)
                }
                None => {
                    slot.settlement = Settlement::Missed;
                    Next::Final(std::mem::take(&mut slot.observers))
                }
            }
        };

        match next {
            Next::Substitute(fallback) => {
                tracing::debug!(cell = %self.label, fallback = %fallback.label, "substituting fallback");
                fallback.demand();
                let this = Arc::clone(self);
                fallback.subscribe(
                    Observer::Internal(Box::new(move |outcome: Outcome<'_, T>, sink: &dyn Dispatch| match outcome {
                        Outcome::Matched(value) => {
                            this.commit(value.clone(), true, sink);
                        }
                        Outcome::Missed => {
                            this.miss(true, sink);
                        }
                    })),
                    sink,
                );
            }
            Next::Final(observers) => {
                tracing::debug!(cell = %self.label, observers = observers.len(), "missed");
                self.notify(observers, Outcome::Missed, sink);
            }
        }
        true
    }

    fn notify(&self, observers: Vec<Observer<T>>, outcome: Outcome<'_, T>, sink: &dyn Dispatch) {
        for observer in observers {
            match (observer, outcome) {
                (Observer::Match(callback), Outcome::Matched(value)) => {
                    let value = value.clone();
                    sink.dispatch(Job::new(self.label.clone(), move || callback(&value)));
                }
                (Observer::Miss(callback), Outcome::Missed) => {
                    sink.dispatch(Job::new(self.label.clone(), callback));
                }
                (Observer::Internal(observer), outcome) => observer(outcome, sink),
                _ => {}
            }
        }
    }

    /// New lazy value computed from this one once it settles
    ///
    /// `derive` returning `Ok(None)` settles the child as a miss; an error is
    /// reported to the session sink and also settles a miss.
    pub(crate) fn derive<U: LazyValue>(
        self: &Arc<Self>,
        label: impl Into<String>,
        derive: impl FnOnce(&T) -> ResolverResult<Option<U>> + Send + 'static,
    ) -> Arc<Lazy<U>> {
        let source: Weak<dyn Demand> = Arc::downgrade(self) as Weak<dyn Demand>;
        let child = Lazy::new(&self.ctx, label, Some(source));
        self.ctx.record_edge(self.id, child.id, EdgeKind::Derived);

        let target = child.clone();
        let errors = self.ctx.errors.clone();
        self.subscribe_now(Observer::Internal(Box::new(move |outcome: Outcome<'_, T>, sink: &dyn Dispatch| {
            let derived = match outcome {
                Outcome::Matched(value) => derive(value),
                Outcome::Missed => Ok(None),
            };
            match derived {
                Ok(Some(value)) => {
                    target.settle_match(value, sink);
                }
                Ok(None) => {
                    target.settle_miss(sink);
                }
                Err(err) => {
                    errors.report(err);
                    target.settle_miss(sink);
                }
            }
        })));
        child
    }
}

impl<T: LazyValue> Demand for Lazy<T> {
    fn demand(&self) {
        if self.demanded.swap(true, Ordering::AcqRel) || !self.is_pending() {
            return;
        }
        if let Some(source) = self.source.as_ref().and_then(Weak::upgrade) {
            source.demand();
        }
    }
}

impl<T: LazyValue> Activate for Lazy<T> {
    fn activate(&self) {
        if self.wanted.load(Ordering::Acquire) && self.is_pending() {
            self.demand();
        }
    }
}

impl<T: LazyValue> Dependable for Lazy<T> {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn subscribe_edge(&self, edge: DependencyEdge) {
        self.subscribe_now(Observer::Internal(Box::new(move |outcome: Outcome<'_, T>, sink: &dyn Dispatch| {
            edge.fire(matches!(outcome, Outcome::Matched(_)), sink);
        })));
    }
}
