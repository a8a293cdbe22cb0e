//! HyperApp geofence monitoring engine
//!
//! Continuous position-based zone monitoring for the community safety app:
//! - Membership tracking against the active zone set
//! - Exactly-once enter/exit transition detection per boundary crossing
//! - Priority-tiered notification dispatch with settings gating
//! - Fire-and-forget event persistence for authenticated sessions
//!
//! All outward dependencies (data store, location stream, auth, notification
//! surface) are narrow injected traits, so the engine runs against fakes in
//! tests and against the hosted backend in production.
//!
//! # Example
//!
//! ```rust,ignore
//! use hyperapp_geofence::GeofenceController;
//!
//! # async fn example(
//! #     store: std::sync::Arc<dyn hyperapp_zones::DataStore>,
//! #     auth: std::sync::Arc<dyn hyperapp_geofence::AuthContext>,
//! #     positions: std::sync::Arc<dyn hyperapp_geofence::PositionService>,
//! #     notifier: std::sync::Arc<dyn hyperapp_geofence::NotificationSink>,
//! # ) -> Result<(), hyperapp_geofence::GeofenceError> {
//! let controller = GeofenceController::new(store, auth, positions, notifier);
//! let enabled = controller.toggle_monitoring().await?;
//! assert!(enabled);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod controller;
pub mod engine;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod position;
pub mod types;

// Re-exports for convenience
pub use auth::{AuthContext, UserId};
pub use controller::GeofenceController;
pub use engine::{
    notification_message, notification_priority, GeofenceEventEngine, ZoneTransition,
};
pub use error::GeofenceError;
pub use monitor::{MonitorState, PositionMonitor};
pub use notify::{NotificationPriority, NotificationSink, HIGH_PRIORITY_HAPTIC_MS};
pub use position::{
    PositionError, PositionSample, PositionService, PositionUpdate, SubscribeOptions, WatchHandle,
};
pub use types::{
    EventType, GeofenceEvent, GeofenceSession, UserGeofenceSettings, DEFAULT_RADIUS_M,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the geofence engine
    pub use crate::{
        AuthContext, EventType, GeofenceController, GeofenceError, GeofenceEventEngine,
        GeofenceSession, NotificationPriority, NotificationSink, PositionSample, PositionService,
        UserGeofenceSettings,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
