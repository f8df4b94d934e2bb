//! Join barrier: many-to-one AND over several results
//!
//! The shared counter starts at 1 for the seal slot plus one per joined
//! result. Each match releases one slot; the session releases the seal slot
//! when resolution starts, so a barrier cannot fire while results are still
//! being joined. The first miss zeroes the counter.
//!
//! ```text
//! remaining: 1 (seal) + N joined
//!   match  ──► fetch_update(n-1) ── reaches 0 ──► on_match (once)
//!   miss   ──► swap(0), was > 0  ─────────────► on_miss  (once)
//! ```

use super::cell::{ResultCell, ResultSet};
use super::context::SessionContext;
use super::dispatch::{Dispatch, Job};
use super::lazy::{Lazy, LazyValue, Observer, Outcome};
use crate::shared::models::EntityKind;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

type Callback = Box<dyn FnOnce() + Send>;

pub(crate) struct JoinState {
    label: Arc<str>,
    remaining: AtomicUsize,
    sealed: AtomicBool,
    fired: AtomicBool,
    on_match: Mutex<Option<Callback>>,
    on_miss: Mutex<Option<Callback>>,
}

impl JoinState {
    fn release(&self, sink: &dyn Dispatch) {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n > 0).then(|| n - 1)
            });
        if previous == Ok(1) {
            self.fire(true, sink);
        }
    }

    fn fail(&self, sink: &dyn Dispatch) {
        if self.remaining.swap(0, Ordering::AcqRel) > 0 {
            self.fire(false, sink);
        }
    }

    fn fire(&self, matched: bool, sink: &dyn Dispatch) {
        if self.fired.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(barrier = %self.label, matched, "join barrier fired");
        let callback = if matched {
            self.on_match.lock().take()
        } else {
            self.on_miss.lock().take()
        };
        if let Some(callback) = callback {
            sink.dispatch(Job::new(self.label.clone(), callback));
        }
    }

    /// Release the seal slot; only the first call counts
    pub(crate) fn seal(&self, sink: &dyn Dispatch) {
        if !self.sealed.swap(true, Ordering::AcqRel) {
            self.release(sink);
        }
    }

    fn attach<T: LazyValue>(self: &Arc<Self>, lazy: &Arc<Lazy<T>>) {
        self.remaining.fetch_add(1, Ordering::AcqRel);
        let state = self.clone();
        lazy.subscribe_now(Observer::Internal(Box::new(
            move |outcome: Outcome<'_, T>, sink: &dyn Dispatch| match outcome {
                Outcome::Matched(_) => state.release(sink),
                Outcome::Missed => state.fail(sink),
            },
        )));
        lazy.request();
    }
}

/// AND-join over several cells and sets
///
/// Fires `on_match` once if every joined result matches, or `on_miss` once
/// as soon as any of them misses.
#[derive(Clone)]
pub struct JoinBarrier {
    state: Arc<JoinState>,
}

impl JoinBarrier {
    pub(crate) fn new(ctx: &Arc<SessionContext>, label: &str) -> Self {
        let (_, label) = ctx.allocate(format!("join({})", label));
        let state = Arc::new(JoinState {
            label,
            remaining: AtomicUsize::new(1),
            sealed: AtomicBool::new(false),
            fired: AtomicBool::new(false),
            on_match: Mutex::new(None),
            on_miss: Mutex::new(None),
        });
        ctx.track_barrier(Arc::downgrade(&state));
        Self { state }
    }

    pub fn label(&self) -> &str {
        &self.state.label
    }

    pub fn join<E: EntityKind>(&self, cell: &ResultCell<E>) -> &Self {
        self.state.attach(cell.lazy());
        self
    }

    pub fn join_set<E: EntityKind>(&self, set: &ResultSet<E>) -> &Self {
        self.state.attach(set.lazy());
        self
    }

    /// Join `cell` and hand its value to `consumer` when it matches
    pub fn bind<E: EntityKind>(
        &self,
        cell: &ResultCell<E>,
        consumer: impl FnOnce(&E) + Send + 'static,
    ) -> &Self {
        cell.lazy().subscribe_now(Observer::Match(Box::new(consumer)));
        self.join(cell)
    }

    pub fn on_match(&self, callback: impl FnOnce() + Send + 'static) -> &Self {
        *self.state.on_match.lock() = Some(Box::new(callback));
        self
    }

    pub fn on_miss(&self, callback: impl FnOnce() + Send + 'static) -> &Self {
        *self.state.on_miss.lock() = Some(Box::new(callback));
        self
    }

    pub fn is_fired(&self) -> bool {
        self.state.fired.load(Ordering::Acquire)
    }

    /// Joined results not yet matched (the seal slot included until sealed)
    pub fn remaining(&self) -> usize {
        self.state.remaining.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for JoinBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinBarrier")
            .field("label", &self.state.label)
            .field("remaining", &self.remaining())
            .field("fired", &self.is_fired())
            .finish()
    }
}
