//! Session context
//!
//! Everything scoped to one resolution session: node ids and labels, the
//! edge ledger used for the cycle check, the key registry, the error sink,
//! and the callback dispatch target. Nothing here is process-global.

use super::dispatch::{Dispatch, PendingDispatch};
use super::join::JoinState;
use super::registry::KeyRegistry;
use crate::errors::ErrorSink;
use parking_lot::{Mutex, RwLock};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Ledger id of a cell or set
pub(crate) type NodeId = usize;

/// Why one ledger node waits on another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeKind {
    /// Criteria output waits on a prerequisite
    Prerequisite,
    /// Derived cell waits on its source
    Derived,
    /// Cell waits on a fallback after a miss
    Fallback,
}

/// Something that can turn stored consumer interest into demand
pub(crate) trait Activate: Send + Sync {
    fn activate(&self);
}

#[derive(Default)]
struct Ledger {
    labels: Vec<Arc<str>>,
    edges: Vec<(NodeId, NodeId, EdgeKind)>,
    activatables: Vec<Weak<dyn Activate>>,
    barriers: Vec<Weak<JoinState>>,
}

pub(crate) struct SessionContext {
    pub(crate) id: Uuid,
    pub(crate) errors: Arc<ErrorSink>,
    pub(crate) keys: KeyRegistry,
    ledger: Mutex<Ledger>,
    live: AtomicBool,
    settled_nodes: AtomicUsize,
    delivery: RwLock<Option<Arc<dyn Dispatch>>>,
    backlog: Arc<PendingDispatch>,
}

impl SessionContext {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            errors: Arc::new(ErrorSink::new()),
            keys: KeyRegistry::default(),
            ledger: Mutex::new(Ledger::default()),
            live: AtomicBool::new(false),
            settled_nodes: AtomicUsize::new(0),
            delivery: RwLock::new(None),
            backlog: Arc::new(PendingDispatch::new()),
        })
    }

    /// Reserve a ledger id for a new cell or set
    pub(crate) fn allocate(&self, label: String) -> (NodeId, Arc<str>) {
        let mut ledger = self.ledger.lock();
        let id = ledger.labels.len();
        let label: Arc<str> = Arc::from(format!("{}#{}", label, id));
        ledger.labels.push(label.clone());
        (id, label)
    }

    pub(crate) fn track(&self, activatable: Weak<dyn Activate>) {
        self.ledger.lock().activatables.push(activatable);
    }

    pub(crate) fn track_barrier(&self, barrier: Weak<JoinState>) {
        self.ledger.lock().barriers.push(barrier);
    }

    pub(crate) fn record_edge(&self, from: NodeId, to: NodeId, kind: EdgeKind) {
        self.ledger.lock().edges.push((from, to, kind));
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Where user callbacks go right now
    ///
    /// Before the delivery context is installed, work lands in a backlog
    /// that is replayed at installation.
    pub(crate) fn dispatcher(&self) -> Arc<dyn Dispatch> {
        match self.delivery.read().as_ref() {
            Some(delivery) => delivery.clone(),
            None => self.backlog.clone() as Arc<dyn Dispatch>,
        }
    }

    pub(crate) fn install_delivery(&self, delivery: Arc<dyn Dispatch>) {
        *self.delivery.write() = Some(delivery.clone());
        self.backlog.replay(&*delivery);
    }

    /// Switch from graph construction to resolution
    ///
    /// Consumers attached so far become demand, then join barriers seal.
    pub(crate) fn go_live(&self) {
        self.live.store(true, Ordering::Release);
        let (activatables, barriers) = {
            let ledger = self.ledger.lock();
            (ledger.activatables.clone(), ledger.barriers.clone())
        };

        for activatable in activatables.iter().filter_map(Weak::upgrade) {
            activatable.activate();
        }

        let dispatcher = self.dispatcher();
        for barrier in barriers.iter().filter_map(Weak::upgrade) {
            barrier.seal(&*dispatcher);
        }
    }

    pub(crate) fn note_settled(&self) {
        self.settled_nodes.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn settled_count(&self) -> usize {
        self.settled_nodes.load(Ordering::Acquire)
    }

    pub(crate) fn label_of(&self, id: NodeId) -> Option<Arc<str>> {
        self.ledger.lock().labels.get(id).cloned()
    }

    /// Topologically sort the ledger; `Err` names a node on a cycle
    pub(crate) fn check_cycles(&self) -> Result<(), Arc<str>> {
        let ledger = self.ledger.lock();
        let mut graph: DiGraph<NodeId, EdgeKind> =
            DiGraph::with_capacity(ledger.labels.len(), ledger.edges.len());
        let indices: Vec<NodeIndex> = (0..ledger.labels.len())
            .map(|id| graph.add_node(id))
            .collect();

        for &(from, to, kind) in &ledger.edges {
            if let (Some(&a), Some(&b)) = (indices.get(from), indices.get(to)) {
                graph.add_edge(a, b, kind);
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            let id = graph[cycle.node_id()];
            ledger.labels[id].clone()
        })
    }
}
