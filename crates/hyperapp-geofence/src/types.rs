//! Core types for the monitoring layer
//!
//! - Enter/exit event records persisted to the store
//! - Per-user monitoring settings
//! - The in-memory session holding the membership set

use crate::auth::UserId;
use chrono::{DateTime, Utc};
use hyperapp_zones::ZoneId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default monitoring radius preference, in meters.
pub const DEFAULT_RADIUS_M: u32 = 500;

/// Direction of a zone-membership transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Crossed into the zone
    Enter,
    /// Crossed out of the zone
    Exit,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Enter => write!(f, "enter"),
            EventType::Exit => write!(f, "exit"),
        }
    }
}

/// Write-only persisted record of a detected transition. Created exactly
/// once per transition, never updated or deleted by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceEvent {
    /// User the transition belongs to
    pub user_id: UserId,
    /// Zone whose boundary was crossed
    pub zone_id: ZoneId,
    /// Transition direction
    pub event_type: EventType,
    /// Sample latitude at detection time
    pub latitude: f64,
    /// Sample longitude at detection time
    pub longitude: f64,
    /// Sample accuracy in meters
    pub accuracy_m: f64,
    /// Detection time
    pub recorded_at: DateTime<Utc>,
}

/// Per-user monitoring preferences, one row per user.
///
/// Missing fields decode to their defaults so a partially written row never
/// blocks settings load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGeofenceSettings {
    /// Owning user
    pub user_id: UserId,
    /// Whether monitoring is on
    #[serde(default)]
    pub enabled: bool,
    /// Preferred alert radius in meters
    #[serde(default = "default_radius")]
    pub radius_meters: u32,
    /// Dispatch notifications for zone transitions
    #[serde(default = "default_flag")]
    pub notify_on_enter: bool,
    /// Stored preference; not consulted by the current notification gate
    #[serde(default = "default_flag")]
    pub notify_on_exit: bool,
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS_M
}

fn default_flag() -> bool {
    true
}

impl UserGeofenceSettings {
    /// Default settings for a user with no persisted row.
    #[inline]
    #[must_use]
    pub fn defaults(user_id: UserId) -> Self {
        Self {
            user_id,
            enabled: false,
            radius_meters: DEFAULT_RADIUS_M,
            notify_on_enter: true,
            notify_on_exit: true,
        }
    }
}

/// In-memory state of one monitoring run.
///
/// Owns the membership set: the zones whose containment test passed on the
/// most recent position sample. Reset when monitoring stops.
#[derive(Debug, Clone, Default)]
pub struct GeofenceSession {
    /// User the session belongs to; `None` for anonymous monitoring, in
    /// which case events are not persisted
    pub user_id: Option<UserId>,
    /// Zones the last sample fell within
    pub current_zone_ids: HashSet<ZoneId>,
}

impl GeofenceSession {
    /// Start a fresh session with an empty membership set.
    #[inline]
    #[must_use]
    pub fn new(user_id: Option<UserId>) -> Self {
        Self {
            user_id,
            current_zone_ids: HashSet::new(),
        }
    }

    /// Whether the last sample was inside the given zone.
    #[inline]
    #[must_use]
    pub fn is_inside(&self, zone_id: ZoneId) -> bool {
        self.current_zone_ids.contains(&zone_id)
    }

    /// Discard membership state.
    #[inline]
    pub fn reset(&mut self) {
        self.current_zone_ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn settings_defaults() {
        let user = UserId::new();
        let settings = UserGeofenceSettings::defaults(user);
        assert!(!settings.enabled);
        assert_eq!(settings.radius_meters, DEFAULT_RADIUS_M);
        assert!(settings.notify_on_enter);
        assert!(settings.notify_on_exit);
    }

    #[test]
    fn settings_decode_substitutes_missing_fields() {
        let user = UserId::new();
        let row = serde_json::json!({ "user_id": user.0, "enabled": true });
        let settings: UserGeofenceSettings = serde_json::from_value(row).unwrap();
        assert_eq!(
            settings,
            UserGeofenceSettings {
                user_id: user,
                enabled: true,
                radius_meters: DEFAULT_RADIUS_M,
                notify_on_enter: true,
                notify_on_exit: true,
            }
        );
    }

    #[test]
    fn session_reset_clears_membership() {
        let mut session = GeofenceSession::new(Some(UserId::new()));
        let zone = ZoneId::new();
        session.current_zone_ids.insert(zone);
        assert!(session.is_inside(zone));

        session.reset();
        assert!(!session.is_inside(zone));
        assert!(session.user_id.is_some());
    }

    #[test]
    fn event_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EventType::Enter).unwrap(), "\"enter\"");
        assert_eq!(serde_json::to_string(&EventType::Exit).unwrap(), "\"exit\"");
    }
}
