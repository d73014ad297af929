//! Auto-reset wake signal for the worker loops.
//!
//! A latched condition variable: `notify` arms the signal, `wait_timeout`
//! consumes it. A notification sent while no one is waiting is not lost:
//! the next wait returns immediately. Waits are always bounded, so a worker
//! that somehow misses a wake-up self-heals within one poll interval.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

pub(crate) struct WakeSignal {
    notified: Mutex<bool>,
    condvar: Condvar,
}

impl WakeSignal {
    pub(crate) fn new() -> Self {
        Self {
            notified: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Arm the signal and wake one waiter.
    pub(crate) fn notify(&self) {
        let mut notified = self.notified.lock().unwrap();
        *notified = true;
        self.condvar.notify_one();
    }

    /// Block until notified or until `timeout` elapses, whichever is first.
    ///
    /// Consumes a pending notification. Returns `true` if the wait ended
    /// because of a notification.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        let notified = self.notified.lock().unwrap();
        let (mut notified, _) = self
            .condvar
            .wait_timeout_while(notified, timeout, |armed| !*armed)
            .unwrap();

        let was_notified = *notified;
        *notified = false;
        was_notified
    }
}
