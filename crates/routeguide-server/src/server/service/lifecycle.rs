//! Admission control and graceful shutdown for streaming calls.
//!
//! Every streaming call holds a [`StreamGuard`] for as long as it runs. The
//! guard keeps the in-flight count accurate even when a task ends on an
//! error path, and hands out the shared [`CancellationToken`] the call must
//! race against.
//!
//! Shutdown runs in three phases:
//!
//! 1. Refuse new calls (`UNAVAILABLE`).
//! 2. Wait, up to the drain timeout, for in-flight streams to finish.
//! 3. Cancel whatever is left.

use crate::server::telemetry::{decrement_streams_inflight, increment_streams_inflight};
use core::time::Duration;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use routeguide_core::Error;
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shared call lifecycle state of one service instance.
#[derive(Debug, Default)]
pub struct Lifecycle {
    draining: AtomicBool,
    inflight: AtomicUsize,
    shutdown_token: CancellationToken,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with [`Error::ServiceShutdown`] once shutdown has begun.
    pub fn ensure_accepting(&self) -> Result<(), Error> {
        if self.draining.load(Ordering::SeqCst) {
            return Err(Error::ServiceShutdown);
        }
        Ok(())
    }

    /// Registers a new streaming call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] if shutdown has begun.
    pub fn admit(self: &Arc<Self>) -> Result<StreamGuard, Error> {
        // Count first, then check: a drain that starts in between still sees
        // this call.
        self.inflight.fetch_add(1, Ordering::SeqCst);
        if self.draining.load(Ordering::SeqCst) {
            self.inflight.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::ServiceShutdown);
        }
        increment_streams_inflight();

        Ok(StreamGuard {
            lifecycle: Arc::clone(self),
        })
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn is_cancelled(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Refuses new calls, drains in-flight streams for up to `drain_timeout`,
    /// then cancels the rest.
    pub async fn shutdown(&self, drain_timeout: Duration) {
        // === Phase 1: Stop accepting new calls ===
        tracing::info!("Refusing new requests");
        self.draining.store(true, Ordering::SeqCst);

        // === Phase 2: Wait for in-flight streams to drain ===
        tracing::info!("Draining in-flight streams ({} active)", self.inflight());
        let drained = timeout(drain_timeout, async {
            while self.inflight() > 0 {
                sleep(DRAIN_POLL_INTERVAL).await;
            }
        })
        .await;

        match drained {
            Ok(()) => tracing::debug!("All in-flight streams drained"),
            Err(_) => tracing::warn!(
                "Graceful drain timed out ({} streams still active)",
                self.inflight()
            ),
        }

        // === Phase 3: Cancel any remaining work ===
        tracing::debug!("Cancelling remaining streams via shutdown token");
        self.shutdown_token.cancel();
    }
}

/// Membership of one streaming call in the in-flight set.
#[derive(Debug)]
pub struct StreamGuard {
    lifecycle: Arc<Lifecycle>,
}

impl StreamGuard {
    /// Resolves when the service cancels remaining streams.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.lifecycle.shutdown_token.cancelled()
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.lifecycle.inflight.fetch_sub(1, Ordering::SeqCst);
        decrement_streams_inflight();
    }
}
