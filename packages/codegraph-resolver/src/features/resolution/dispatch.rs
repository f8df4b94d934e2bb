//! Callback dispatch
//!
//! User-facing callbacks never run on the scan pool. They are handed to a
//! [`Dispatch`] target:
//!
//! - [`DeliveryContext`]: dedicated rayon pool, the designated executor
//! - [`PendingDispatch`]: records jobs while no executor exists yet (cache
//!   bootstrap) so they can be replayed onto the real one afterwards

use crate::errors::{ErrorSink, ResolverError, ResolverResult};
use crate::shared::utils::panic::catch;
use parking_lot::{Condvar, Mutex};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::sync::Arc;

/// One unit of deferred callback work
pub struct Job {
    context: Arc<str>,
    run: Box<dyn FnOnce() + Send>,
}

impl Job {
    pub fn new(context: Arc<str>, run: impl FnOnce() + Send + 'static) -> Self {
        Self {
            context,
            run: Box::new(run),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Run the job, converting a panic into a `UserCallback` failure
    pub(crate) fn run_guarded(self, errors: &ErrorSink) {
        let Job { context, run } = self;
        if let Err(message) = catch(run) {
            errors.report(ResolverError::user_callback(
                format!("callback on {}", context),
                message,
            ));
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("context", &self.context).finish()
    }
}

/// Target for user-facing callback work
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Records dispatched jobs for a later replay
#[derive(Debug, Default)]
pub struct PendingDispatch {
    jobs: Mutex<Vec<Job>>,
}

impl PendingDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Remove and return every recorded job
    pub(crate) fn take(&self) -> Vec<Job> {
        std::mem::take(&mut *self.jobs.lock())
    }

    /// Hand every recorded job, in recording order, to `target`
    pub fn replay(&self, target: &dyn Dispatch) -> usize {
        let jobs = self.take();
        let count = jobs.len();
        for job in jobs {
            target.dispatch(job);
        }
        count
    }
}

impl Dispatch for PendingDispatch {
    fn dispatch(&self, job: Job) {
        self.jobs.lock().push(job);
    }
}

/// Counts jobs handed to the pool but not finished yet
#[derive(Debug, Default)]
struct InFlight {
    count: Mutex<usize>,
    idle: Condvar,
}

impl InFlight {
    fn enter(&self) {
        *self.count.lock() += 1;
    }

    fn leave(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.idle.wait(&mut count);
        }
    }
}

/// The designated executor for user callbacks
pub struct DeliveryContext {
    pool: ThreadPool,
    in_flight: Arc<InFlight>,
    errors: Arc<ErrorSink>,
}

impl DeliveryContext {
    pub fn new(threads: usize, errors: Arc<ErrorSink>) -> ResolverResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("codegraph-resolver-delivery-{}", i))
            .build()
            .map_err(|e| ResolverError::Executor(e.to_string()))?;

        Ok(Self {
            pool,
            in_flight: Arc::new(InFlight::default()),
            errors,
        })
    }

    /// Block until every dispatched job has run
    ///
    /// Jobs dispatched by running jobs are waited for as well.
    pub fn wait_idle(&self) {
        self.in_flight.wait_idle();
    }
}

impl Dispatch for DeliveryContext {
    fn dispatch(&self, job: Job) {
        self.in_flight.enter();
        let in_flight = self.in_flight.clone();
        let errors = self.errors.clone();
        self.pool.spawn_fifo(move || {
            job.run_guarded(&errors);
            in_flight.leave();
        });
    }
}

impl fmt::Debug for DeliveryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryContext")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}
