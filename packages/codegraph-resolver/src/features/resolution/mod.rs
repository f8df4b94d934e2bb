//! Resolution feature
//!
//! The lazy, dependency-aware engine: criteria nodes, result cells and
//! sets, the fixed-point scheduler, callback delivery, join barriers, and the
//! session that drives them.
//!
//! ```text
//! ResolutionSession
//!   ├─ SessionContext   (ledger, key registry, error sink, dispatch)
//!   ├─ CriteriaNode ×N  (criteria + DependencyTracker + output Lazy)
//!   │     └─ Lazy<T>    (settlement, observers, fallback queue)
//!   ├─ Scheduler        (rounds on the scan pool)
//!   └─ DeliveryContext  (user callbacks, off the scan pool)
//! ```

pub mod cell;
pub mod completion;
pub(crate) mod context;
pub mod dispatch;
pub(crate) mod evaluator;
pub mod join;
pub(crate) mod lazy;
pub(crate) mod node;
pub(crate) mod registry;
pub mod report;
pub(crate) mod scheduler;
pub mod session;
pub mod tracker;

pub use cell::{ResultCell, ResultSet};
pub use completion::Completion;
pub use dispatch::{DeliveryContext, Dispatch, Job, PendingDispatch};
pub use join::JoinBarrier;
pub use lazy::CellState;
pub use registry::KeyedValue;
pub use report::{CacheOutcome, MatchResult, ResolutionReport};
pub use scheduler::ScheduleSummary;
pub use session::ResolutionSession;
pub use tracker::{DependencyTracker, NodeState};
