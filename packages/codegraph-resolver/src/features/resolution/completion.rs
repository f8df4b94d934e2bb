//! Single-fire completion latch

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

struct Latch<T> {
    value: Mutex<Option<T>>,
    ready: Condvar,
}

/// Producer half; consumed by [`Completer::complete`]
pub(crate) struct Completer<T> {
    latch: Arc<Latch<T>>,
}

impl<T> Completer<T> {
    pub(crate) fn complete(self, value: T) {
        *self.latch.value.lock() = Some(value);
        self.latch.ready.notify_all();
    }
}

/// Awaitable result of a resolution
pub struct Completion<T> {
    latch: Arc<Latch<T>>,
}

impl<T> Completion<T> {
    pub(crate) fn channel() -> (Completer<T>, Completion<T>) {
        let latch = Arc::new(Latch {
            value: Mutex::new(None),
            ready: Condvar::new(),
        });
        (
            Completer {
                latch: latch.clone(),
            },
            Completion { latch },
        )
    }

    pub fn is_complete(&self) -> bool {
        self.latch.value.lock().is_some()
    }

    /// Block until the value is published
    pub fn wait(self) -> T {
        let mut value = self.latch.value.lock();
        loop {
            if let Some(value) = value.take() {
                return value;
            }
            self.latch.ready.wait(&mut value);
        }
    }

    /// Block at most `timeout`; gives the handle back on expiry
    pub fn wait_timeout(self, timeout: Duration) -> Result<T, Self> {
        {
            let mut value = self.latch.value.lock();
            if value.is_none() {
                self.latch.ready.wait_for(&mut value, timeout);
            }
            if let Some(value) = value.take() {
                return Ok(value);
            }
        }
        Err(self)
    }
}
