//! Finalized criteria nodes
//!
//! Finalizing a criteria freezes it into a [`CriteriaNode`]: the criteria
//! itself (moved in, so it can no longer be mutated), its output set, and a
//! [`DependencyTracker`] wired to every prerequisite.

use super::context::{EdgeKind, NodeId, SessionContext};
use super::dispatch::Dispatch;
use super::evaluator::{self, ScanContext};
use super::lazy::{Demand, Lazy};
use super::tracker::{DependencyTracker, NodeState};
use crate::features::criteria::{Criteria, EdgePolicy};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Unit of work the scheduler drives
pub(crate) trait Schedulable: Send + Sync {
    fn id(&self) -> NodeId;

    fn label(&self) -> Arc<str>;

    fn state(&self) -> NodeState;

    fn is_demanded(&self) -> bool;

    /// Scan and settle; `true` if this call settled the node
    fn evaluate(&self, scan: &ScanContext<'_>, sink: &dyn Dispatch) -> bool;

    fn prerequisite_settled(&self);

    /// Settle as a miss without scanning
    fn force_miss(&self, sink: &dyn Dispatch);
}

/// Observer edge from a prerequisite into a dependent node's tracker
pub(crate) struct DependencyEdge {
    node: Weak<dyn Schedulable>,
    policy: EdgePolicy,
}

impl DependencyEdge {
    pub(crate) fn new(node: Weak<dyn Schedulable>, policy: EdgePolicy) -> Self {
        Self { node, policy }
    }

    pub(crate) fn fire(&self, matched: bool, sink: &dyn Dispatch) {
        let Some(node) = self.node.upgrade() else {
            return;
        };
        match (matched, self.policy) {
            (true, _) | (false, EdgePolicy::Tolerate) => node.prerequisite_settled(),
            (false, EdgePolicy::ForceMiss) => {
                node.prerequisite_settled();
                node.force_miss(sink);
            }
        }
    }
}

pub(crate) struct CriteriaNode<C: Criteria> {
    criteria: C,
    output: Arc<Lazy<Arc<[C::Item]>>>,
    tracker: DependencyTracker,
    settled: AtomicBool,
    prerequisites: Vec<Arc<dyn super::lazy::Dependable>>,
}

impl<C: Criteria> CriteriaNode<C> {
    /// Freeze `criteria` and wire it to its prerequisites
    pub(crate) fn finalize(ctx: &Arc<SessionContext>, criteria: C) -> Arc<Self> {
        let prerequisites = criteria.prerequisites();
        let label = criteria.describe();

        let node = Arc::new_cyclic(|weak: &Weak<Self>| {
            let source: Weak<dyn Demand> = weak.clone();
            Self {
                criteria,
                output: Lazy::new(ctx, label, Some(source)),
                tracker: DependencyTracker::new(),
                settled: AtomicBool::new(false),
                prerequisites: prerequisites.iter().map(|p| p.handle.clone()).collect(),
            }
        });

        // register everything first so an already-settled prerequisite
        // cannot make the node ready while others are still being wired
        for _ in &prerequisites {
            node.tracker.register();
        }
        let weak: Weak<dyn Schedulable> = Arc::downgrade(&node) as Weak<dyn Schedulable>;
        for prerequisite in prerequisites {
            ctx.record_edge(
                prerequisite.handle.node_id(),
                node.output.id(),
                EdgeKind::Prerequisite,
            );
            prerequisite
                .handle
                .subscribe_edge(DependencyEdge::new(weak.clone(), prerequisite.policy));
        }

        tracing::debug!(
            criteria = %node.output.label(),
            prerequisites = node.tracker.pending(),
            "criteria finalized"
        );
        node
    }

    pub(crate) fn output(&self) -> &Arc<Lazy<Arc<[C::Item]>>> {
        &self.output
    }

    fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire) || !self.output.is_pending()
    }
}

impl<C: Criteria> Demand for CriteriaNode<C> {
    fn demand(&self) {
        if !self.tracker.demand() {
            return;
        }
        for prerequisite in &self.prerequisites {
            prerequisite.demand();
        }
    }
}

impl<C: Criteria> Schedulable for CriteriaNode<C> {
    fn id(&self) -> NodeId {
        self.output.id()
    }

    fn label(&self) -> Arc<str> {
        self.output.label().clone()
    }

    fn state(&self) -> NodeState {
        self.tracker.state(self.is_settled())
    }

    fn is_demanded(&self) -> bool {
        self.tracker.is_demanded()
    }

    fn evaluate(&self, scan: &ScanContext<'_>, sink: &dyn Dispatch) -> bool {
        if self.is_settled() {
            return false;
        }

        let found = evaluator::evaluate(&self.criteria, scan, self.output.label());
        if self.settled.swap(true, Ordering::AcqRel) {
            return false;
        }

        tracing::debug!(criteria = %self.output.label(), found = found.len(), "criteria evaluated");
        if found.is_empty() {
            self.output.settle_miss(sink);
        } else {
            self.output.settle_match(Arc::from(found), sink);
        }
        self.output.ctx().note_settled();
        true
    }

    fn prerequisite_settled(&self) {
        if self.tracker.prerequisite_settled() {
            tracing::debug!(criteria = %self.output.label(), "criteria ready");
        }
    }

    fn force_miss(&self, sink: &dyn Dispatch) {
        if self.settled.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(criteria = %self.output.label(), "prerequisite missed; forcing miss");
        self.output.settle_miss(sink);
        self.output.ctx().note_settled();
    }
}
