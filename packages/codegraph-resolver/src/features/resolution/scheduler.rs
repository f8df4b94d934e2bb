//! Round-based fixed-point scheduler
//!
//! # Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Scheduler::run                                                   │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  1. Collect nodes that are ready and demanded (Eligible)         │
//! │  2. Evaluate them concurrently on the scan pool (par_iter)       │
//! │  3. install() returns only after the whole round has finished    │
//! │  4. Settlements notify dependents inline, promoting some of them │
//! │  5. Repeat until a round settles nothing or nothing is eligible  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nodes still Unready or Idle at the end stay unresolved. Idle is laziness;
//! Unready with demand is reported as stalled.

use super::context::SessionContext;
use super::dispatch::Dispatch;
use super::evaluator::{ScanContext, ScanStats};
use super::node::Schedulable;
use super::tracker::NodeState;
use crate::errors::{ResolverError, ResolverResult};
use crate::config::ResolverConfig;
use crate::features::corpus::EntityCorpus;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// What the fixed point took
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    pub rounds: usize,
    pub evaluations: usize,
    pub candidates: usize,
}

pub(crate) struct Scheduler {
    pool: ThreadPool,
    exhaustive_members: bool,
}

impl Scheduler {
    pub(crate) fn new(config: &ResolverConfig) -> ResolverResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.effective_worker_threads())
            .thread_name(|i| format!("codegraph-resolver-scan-{}", i))
            .build()
            .map_err(|e| ResolverError::Executor(e.to_string()))?;

        Ok(Self {
            pool,
            exhaustive_members: config.scan.exhaustive_member_scan,
        })
    }

    pub(crate) fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub(crate) fn run(
        &self,
        ctx: &SessionContext,
        corpus: &dyn EntityCorpus,
        nodes: &[Arc<dyn Schedulable>],
        sink: &dyn Dispatch,
    ) -> ResolverResult<ScheduleSummary> {
        let stats = ScanStats::default();
        let scan = ScanContext {
            corpus,
            errors: &ctx.errors,
            exhaustive_members: self.exhaustive_members,
            stats: &stats,
        };

        let mut rounds = 0;
        loop {
            let eligible: Vec<&Arc<dyn Schedulable>> = nodes
                .iter()
                .filter(|node| node.state() == NodeState::Eligible)
                .collect();
            if eligible.is_empty() {
                break;
            }

            rounds += 1;
            let before = ctx.settled_count();
            tracing::debug!(session = %ctx.id, round = rounds, eligible = eligible.len(), "round started");

            self.pool.install(|| {
                eligible.par_iter().for_each(|node| {
                    node.evaluate(&scan, sink);
                });
            });

            if let Some(message) = ctx.errors.handler_failure() {
                return Err(ResolverError::HandlerFailed(message));
            }

            let settled = ctx.settled_count() - before;
            tracing::debug!(session = %ctx.id, round = rounds, settled, "round finished");
            if settled == 0 {
                break;
            }
        }

        Ok(ScheduleSummary {
            rounds,
            evaluations: stats.evaluations(),
            candidates: stats.candidates(),
        })
    }
}

/// Demanded nodes that never settled
pub(crate) fn stalled(nodes: &[Arc<dyn Schedulable>]) -> Vec<String> {
    nodes
        .iter()
        .filter(|node| node.is_demanded() && node.state() != NodeState::Settled)
        .map(|node| node.label().to_string())
        .collect()
}
