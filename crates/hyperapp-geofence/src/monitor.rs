//! Position monitor
//!
//! Drives the continuous position subscription: `Stopped -> Monitoring ->
//! Stopped`. Each update is handed to the caller's handler in delivery
//! order, one at a time; a service error is delivered and then the monitor
//! stops itself (no auto-retry). `stop()` cancels the platform watch
//! immediately.

use crate::error::GeofenceError;
use crate::position::{PositionService, PositionUpdate, SubscribeOptions, WatchHandle};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Monitor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No active subscription
    Stopped,
    /// Subscription live, samples flowing
    Monitoring,
}

struct ActiveWatch {
    handle: WatchHandle,
    task: JoinHandle<()>,
}

/// Owns the platform watch and the sample-delivery loop.
pub struct PositionMonitor {
    positions: Arc<dyn PositionService>,
    state: Arc<Mutex<MonitorState>>,
    active: Mutex<Option<ActiveWatch>>,
}

impl PositionMonitor {
    /// Create a monitor over the given position service.
    #[inline]
    #[must_use]
    pub fn new(positions: Arc<dyn PositionService>) -> Self {
        Self {
            positions,
            state: Arc::new(Mutex::new(MonitorState::Stopped)),
            active: Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> MonitorState {
        *self.state.lock()
    }

    /// Whether a subscription is live.
    #[inline]
    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.state() == MonitorState::Monitoring
    }

    /// Subscribe and start delivering updates to `handler`.
    ///
    /// Updates are processed to completion in delivery order; there is no
    /// internal queueing beyond the subscription channel. After a stream
    /// error the handler sees the error once and the loop ends.
    ///
    /// # Errors
    /// - [`GeofenceError::AlreadyMonitoring`] if a watch is active
    /// - [`GeofenceError::Position`] if the subscription cannot start
    pub async fn start<F>(
        &self,
        options: SubscribeOptions,
        mut handler: F,
    ) -> Result<(), GeofenceError>
    where
        F: FnMut(PositionUpdate) + Send + 'static,
    {
        if self.is_monitoring() {
            return Err(GeofenceError::AlreadyMonitoring);
        }
        // Drop whatever a previous self-stopped run left behind.
        self.active.lock().take();

        let (handle, mut rx) = self.positions.subscribe(options).await?;
        tracing::info!(watch = handle.0, "position monitoring started");

        *self.state.lock() = MonitorState::Monitoring;

        let state = Arc::clone(&self.state);
        let positions = Arc::clone(&self.positions);
        let task = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                let failed = update.is_err();
                handler(update);
                if failed {
                    break;
                }
            }

            // Stream closed or errored: release the watch and settle state
            // so a later start is accepted.
            positions.unsubscribe(handle).await;
            *state.lock() = MonitorState::Stopped;
            tracing::info!(watch = handle.0, "position monitoring stopped");
        });

        *self.active.lock() = Some(ActiveWatch { handle, task });
        Ok(())
    }

    /// Cancel the watch and end the delivery loop. Idempotent; safe to call
    /// after the monitor stopped itself.
    pub async fn stop(&self) {
        let watch = self.active.lock().take();
        if let Some(watch) = watch {
            self.positions.unsubscribe(watch.handle).await;
            watch.task.abort();
            tracing::info!(watch = watch.handle.0, "position monitoring cancelled");
        }
        *self.state.lock() = MonitorState::Stopped;
    }
}

impl std::fmt::Debug for PositionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionMonitor")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
