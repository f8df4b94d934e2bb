//! Per-criteria readiness and demand tracking

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scheduler view of one criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Waiting on at least one prerequisite
    Unready,
    /// Ready but nobody consumes the result; skipped
    Idle,
    /// Ready and demanded; evaluated in the next round
    Eligible,
    Settled,
}

/// Prerequisite counter plus demand flag
///
/// The counter starts at 1 (the criteria's own slot), grows by one per
/// registered prerequisite and shrinks by one as each prerequisite settles.
/// The criteria is ready exactly when the counter is back at 1.
#[derive(Debug)]
pub struct DependencyTracker {
    pending: AtomicUsize,
    demanded: AtomicBool,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self {
            pending: AtomicUsize::new(1),
            demanded: AtomicBool::new(false),
        }
    }

    pub fn register(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    /// One prerequisite settled; returns `true` if this made the criteria ready
    pub fn prerequisite_settled(&self) -> bool {
        let previous = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n > 1).then(|| n - 1)
            });
        previous == Ok(2)
    }

    pub fn is_ready(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 1
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire) - 1
    }

    /// Flip the demand flag; `true` only for the call that flipped it
    pub fn demand(&self) -> bool {
        !self.demanded.swap(true, Ordering::AcqRel)
    }

    pub fn is_demanded(&self) -> bool {
        self.demanded.load(Ordering::Acquire)
    }

    pub fn state(&self, settled: bool) -> NodeState {
        if settled {
            NodeState::Settled
        } else if !self.is_ready() {
            NodeState::Unready
        } else if self.is_demanded() {
            NodeState::Eligible
        } else {
            NodeState::Idle
        }
    }
}

impl Default for DependencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_ready_after_all_prerequisites() {
        let tracker = DependencyTracker::new();
        assert!(tracker.is_ready());

        tracker.register();
        tracker.register();
        assert!(!tracker.is_ready());
        assert_eq!(tracker.pending(), 2);

        assert!(!tracker.prerequisite_settled());
        assert!(tracker.prerequisite_settled());
        assert!(tracker.is_ready());

        // never drops below the self slot
        assert!(!tracker.prerequisite_settled());
        assert!(tracker.is_ready());
    }

    #[test]
    fn test_state_transitions() {
        let tracker = DependencyTracker::new();
        tracker.register();
        assert_eq!(tracker.state(false), NodeState::Unready);
        assert!(tracker.demand());
        assert!(!tracker.demand());
        assert_eq!(tracker.state(false), NodeState::Unready);
        tracker.prerequisite_settled();
        assert_eq!(tracker.state(false), NodeState::Eligible);
        assert_eq!(tracker.state(true), NodeState::Settled);

        let idle = DependencyTracker::new();
        assert_eq!(idle.state(false), NodeState::Idle);
    }

    #[test]
    fn test_concurrent_settlements_are_not_lost() {
        let tracker = Arc::new(DependencyTracker::new());
        for _ in 0..64 {
            tracker.register();
        }

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                std::thread::spawn(move || {
                    (0..8).filter(|_| tracker.prerequisite_settled()).count()
                })
            })
            .collect();
        let became_ready: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert!(tracker.is_ready());
        assert_eq!(became_ready, 1);
    }
}
