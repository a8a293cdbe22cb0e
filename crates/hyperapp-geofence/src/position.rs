//! Position service collaborator
//!
//! Wraps the platform's continuous location stream behind a trait:
//! - `subscribe` opens a channel of position updates
//! - `unsubscribe` cancels the platform watch
//!
//! Updates arrive in delivery order; errors travel in-stream so the monitor
//! can surface them and stop.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// One GPS fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Reported accuracy in meters
    pub accuracy_m: f64,
}

impl PositionSample {
    /// Create a sample.
    #[inline]
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, accuracy_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m,
        }
    }
}

/// Options passed to the platform watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Request high-accuracy positioning
    pub high_accuracy: bool,
    /// Per-sample timeout in milliseconds
    pub timeout_ms: u64,
    /// Accept cached fixes up to this age. This is the primary guard
    /// against notification storms from GPS jitter near a boundary.
    pub max_age_ms: u64,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 30_000,
            max_age_ms: 60_000,
        }
    }
}

/// Position service errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum PositionError {
    /// User denied location access
    #[error("location permission denied")]
    PermissionDenied,

    /// Location service not available on this platform/session
    #[error("location service unavailable: {0}")]
    Unavailable(String),

    /// No fix within the configured timeout
    #[error("position request timed out after {0} ms")]
    Timeout(u64),
}

/// One item on the position stream: a fix, or a terminal service error.
pub type PositionUpdate = Result<PositionSample, PositionError>;

/// Identifies an active platform watch for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub u64);

/// Abstract continuous location stream (platform geolocation watch).
#[async_trait]
pub trait PositionService: Send + Sync {
    /// Begin a watch, returning its handle and the update channel.
    async fn subscribe(
        &self,
        options: SubscribeOptions,
    ) -> Result<(WatchHandle, mpsc::Receiver<PositionUpdate>), PositionError>;

    /// Cancel a watch. Idempotent.
    async fn unsubscribe(&self, handle: WatchHandle);
}
