//! Stop and pause signals shared between tasks.
//!
//! [`StopSignal`] is the global termination flag every loop polls once per
//! cycle. [`PrisonGate`] pauses one gang's member workers while the gang is
//! imprisoned and wakes all of them at once on release.
//!
//! Both follow the same shape: an atomic flag for cheap polling plus a
//! [`Notify`] for tasks that need to sleep until the flag changes.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Global, one-way stop flag.
#[derive(Debug, Default)]
pub struct StopSignal {
    stopped: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    /// Create an unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every task to stop. Idempotent.
    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested. Returns immediately if it already was.
    pub async fn stopped(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

/// Pause point for one gang's member workers.
#[derive(Debug, Default)]
pub struct PrisonGate {
    closed: AtomicBool,
    released: Notify,
}

impl PrisonGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the gate. Workers that reach it will wait.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Open the gate and wake every waiting worker.
    pub fn open(&self) {
        self.closed.store(false, Ordering::Release);
        self.released.notify_waiters();
    }

    /// Whether the gate is closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Wait until the gate is open.
    ///
    /// Returns `true` once the gate is open, or `false` if `stop` fired
    /// first.
    pub async fn wait_until_open(&self, stop: &StopSignal) -> bool {
        loop {
            let released = self.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();
            if !self.is_closed() {
                return true;
            }
            if stop.is_stopped() {
                return false;
            }
            tokio::select! {
                () = &mut released => {}
                () = stop.stopped() => return false,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn stopped_returns_after_request() {
        let stop = Arc::new(StopSignal::new());
        let waiter = {
            let stop = Arc::clone(&stop);
            tokio::spawn(async move { stop.stopped().await })
        };
        tokio::task::yield_now().await;
        stop.request_stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(stop.is_stopped());
    }

    #[tokio::test]
    async fn stopped_is_immediate_when_already_set() {
        let stop = StopSignal::new();
        stop.request_stop();
        tokio::time::timeout(Duration::from_millis(100), stop.stopped())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn open_gate_does_not_block() {
        let gate = PrisonGate::new();
        let stop = StopSignal::new();
        assert!(gate.wait_until_open(&stop).await);
    }

    #[tokio::test]
    async fn open_wakes_every_waiter() {
        let gate = Arc::new(PrisonGate::new());
        let stop = Arc::new(StopSignal::new());
        gate.close();

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let stop = Arc::clone(&stop);
                tokio::spawn(async move { gate.wait_until_open(&stop).await })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.open();

        for waiter in waiters {
            let opened = tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .unwrap()
                .unwrap();
            assert!(opened);
        }
    }

    #[tokio::test]
    async fn stop_cancels_the_wait() {
        let gate = Arc::new(PrisonGate::new());
        let stop = Arc::new(StopSignal::new());
        gate.close();
        let waiter = {
            let gate = Arc::clone(&gate);
            let stop = Arc::clone(&stop);
            tokio::spawn(async move { gate.wait_until_open(&stop).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.request_stop();
        let opened = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(!opened);
    }
}
