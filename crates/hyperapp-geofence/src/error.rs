//! Error types for the monitoring layer

use crate::position::PositionError;
use hyperapp_zones::StoreError;

/// Main geofence engine error type
#[derive(Debug, thiserror::Error)]
pub enum GeofenceError {
    /// Monitoring requires a signed-in user
    #[error("authentication required")]
    AuthRequired,

    /// Monitoring already running
    #[error("monitoring already active")]
    AlreadyMonitoring,

    /// Underlying location service failed
    #[error("position service error: {0}")]
    Position(#[from] PositionError),

    /// Data store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Settings could not be encoded for persistence
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl GeofenceError {
    /// Whether the failure is transient (retry may succeed).
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Position(PositionError::Timeout(_))
        )
    }
}
