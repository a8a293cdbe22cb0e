//! Geofence event engine
//!
//! The core state machine. For each position sample it:
//! - Recomputes the membership set over all active zones
//! - Diffs against the previous set to detect enter/exit transitions
//! - Dispatches notifications by priority tier, subject to user settings
//! - Persists one event record per transition, fire-and-forget
//!
//! Detection is pure and synchronous; only the persistence side effect runs
//! asynchronously, and its failures never block notification dispatch or the
//! next sample.

use crate::auth::UserId;
use crate::notify::{NotificationPriority, NotificationSink, HIGH_PRIORITY_HAPTIC_MS};
use crate::position::PositionSample;
use crate::types::{EventType, GeofenceEvent, GeofenceSession, UserGeofenceSettings};
use chrono::Utc;
use hyperapp_zones::{tables, DataStore, Zone, ZoneId, ZoneType};
use std::collections::HashSet;
use std::sync::Arc;

/// One detected boundary crossing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTransition {
    /// Zone whose boundary was crossed
    pub zone_id: ZoneId,
    /// Zone display name, used in notification messages
    pub zone_name: String,
    /// Zone semantic type
    pub zone_type: ZoneType,
    /// Transition direction
    pub event_type: EventType,
}

/// Priority tier for a transition, per the fixed dispatch table.
#[inline]
#[must_use]
pub fn notification_priority(zone_type: ZoneType, event_type: EventType) -> NotificationPriority {
    match (zone_type, event_type) {
        (ZoneType::Risk, EventType::Enter) => NotificationPriority::High,
        (ZoneType::Risk, EventType::Exit) => NotificationPriority::Medium,
        (ZoneType::Safe, _) => NotificationPriority::Low,
    }
}

/// User-facing message for a transition. Templates are fixed strings shared
/// with the mobile clients.
#[must_use]
pub fn notification_message(
    zone_type: ZoneType,
    event_type: EventType,
    zone_name: &str,
) -> String {
    match (zone_type, event_type) {
        (ZoneType::Safe, EventType::Enter) => {
            format!("You've entered a Safe Zone: {zone_name}")
        }
        (ZoneType::Safe, EventType::Exit) => {
            format!("You've left the Safe Zone: {zone_name}")
        }
        (ZoneType::Risk, EventType::Enter) => format!(
            "Caution: You've entered a Risk Zone with multiple safety reports: {zone_name}"
        ),
        (ZoneType::Risk, EventType::Exit) => {
            format!("You've exited the Risk Zone: {zone_name}")
        }
    }
}

/// Detects transitions and dispatches their side effects.
pub struct GeofenceEventEngine {
    store: Arc<dyn DataStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl GeofenceEventEngine {
    /// Create an engine over the given collaborators.
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    /// Pure membership diff: recompute the set for `sample`, replace the
    /// session's set, and return one transition per changed zone.
    ///
    /// Feeding the same position twice with unchanged zones yields no
    /// transitions on the second call.
    #[must_use]
    pub fn detect_transitions(
        session: &mut GeofenceSession,
        zones: &[Zone],
        sample: &PositionSample,
    ) -> Vec<ZoneTransition> {
        let new_membership: HashSet<ZoneId> = zones
            .iter()
            .filter(|z| z.contains(sample.latitude, sample.longitude))
            .map(|z| z.id)
            .collect();

        let mut transitions = Vec::new();
        for zone in zones {
            let was_inside = session.current_zone_ids.contains(&zone.id);
            let is_inside = new_membership.contains(&zone.id);
            let event_type = match (was_inside, is_inside) {
                (false, true) => EventType::Enter,
                (true, false) => EventType::Exit,
                _ => continue,
            };
            transitions.push(ZoneTransition {
                zone_id: zone.id,
                zone_name: zone.name.clone(),
                zone_type: zone.zone_type,
                event_type,
            });
        }

        session.current_zone_ids = new_membership;
        transitions
    }

    /// Process one position sample to completion: detect, notify, persist.
    ///
    /// Returns the detected transitions. Must run inside a tokio runtime
    /// (event persistence is spawned).
    pub fn process_sample(
        &self,
        session: &mut GeofenceSession,
        zones: &[Zone],
        settings: &UserGeofenceSettings,
        sample: PositionSample,
    ) -> Vec<ZoneTransition> {
        let transitions = Self::detect_transitions(session, zones, &sample);

        for transition in &transitions {
            tracing::info!(
                zone = %transition.zone_name,
                event = %transition.event_type,
                "zone transition detected"
            );

            // Events are recorded regardless of notification gating, but
            // only for authenticated sessions.
            if let Some(user_id) = session.user_id {
                self.persist_event(user_id, transition, &sample);
            }

            // Both enter and exit notifications gate on notify_on_enter.
            // notify_on_exit is stored with the settings but never consulted
            // here; kept for parity with the shipped clients (DESIGN.md).
            if !settings.notify_on_enter {
                continue;
            }

            let priority = notification_priority(transition.zone_type, transition.event_type);
            let message = notification_message(
                transition.zone_type,
                transition.event_type,
                &transition.zone_name,
            );
            self.notifier.notify(&message, priority);
            if priority == NotificationPriority::High {
                self.notifier.haptic(&HIGH_PRIORITY_HAPTIC_MS);
            }
        }

        transitions
    }

    /// Fire-and-forget event write. Failures are logged and swallowed; they
    /// never block dispatch or the next sample.
    fn persist_event(&self, user_id: UserId, transition: &ZoneTransition, sample: &PositionSample) {
        let event = GeofenceEvent {
            user_id,
            zone_id: transition.zone_id,
            event_type: transition.event_type,
            latitude: sample.latitude,
            longitude: sample.longitude,
            accuracy_m: sample.accuracy_m,
            recorded_at: Utc::now(),
        };

        let record = match serde_json::to_value(&event) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "event encode failed, record dropped");
                return;
            }
        };

        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(e) = store.insert(tables::GEOFENCE_EVENTS, record).await {
                tracing::warn!(error = %e, "event persist failed, record dropped");
            }
        });
    }
}

impl std::fmt::Debug for GeofenceEventEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceEventEngine").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperapp_zones::ZoneId;
    use proptest::prelude::*;

    fn zone_at(lat: f64, lon: f64, radius_m: f64, zone_type: ZoneType, name: &str) -> Zone {
        Zone {
            id: ZoneId::new(),
            name: name.to_string(),
            zone_type,
            center_lat: lat,
            center_lon: lon,
            radius_meters: radius_m,
            is_active: true,
            description: None,
        }
    }

    #[test]
    fn enter_then_exit_detected_once_each() {
        let zone = zone_at(30.0444, 31.2357, 500.0, ZoneType::Risk, "Risk Zone 1");
        let zones = vec![zone.clone()];
        let mut session = GeofenceSession::new(None);

        let inside = PositionSample::new(30.0444, 31.2357, 10.0);
        let outside = PositionSample::new(30.0444 + 0.0054, 31.2357, 10.0); // ~600 m away

        let t = GeofenceEventEngine::detect_transitions(&mut session, &zones, &inside);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].event_type, EventType::Enter);
        assert_eq!(t[0].zone_id, zone.id);

        let t = GeofenceEventEngine::detect_transitions(&mut session, &zones, &outside);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].event_type, EventType::Exit);
    }

    #[test]
    fn repeated_sample_is_idempotent() {
        let zones = vec![zone_at(30.0444, 31.2357, 500.0, ZoneType::Safe, "Safe Zone 1")];
        let mut session = GeofenceSession::new(None);
        let sample = PositionSample::new(30.0444, 31.2357, 10.0);

        let first = GeofenceEventEngine::detect_transitions(&mut session, &zones, &sample);
        assert_eq!(first.len(), 1);

        let second = GeofenceEventEngine::detect_transitions(&mut session, &zones, &sample);
        assert!(second.is_empty());
    }

    #[test]
    fn overlapping_zones_transition_independently() {
        // Two zones sharing the same center; the user is inside both.
        let risk = zone_at(30.0444, 31.2357, 500.0, ZoneType::Risk, "Risk Zone 1");
        let safe = zone_at(30.0444, 31.2357, 900.0, ZoneType::Safe, "Safe Zone 1");
        let zones = vec![risk.clone(), safe.clone()];
        let mut session = GeofenceSession::new(None);

        let center = PositionSample::new(30.0444, 31.2357, 10.0);
        let t = GeofenceEventEngine::detect_transitions(&mut session, &zones, &center);
        assert_eq!(t.len(), 2);

        // ~600 m out: leaves the 500 m risk circle, stays in the 900 m one.
        let edge = PositionSample::new(30.0444 + 0.0054, 31.2357, 10.0);
        let t = GeofenceEventEngine::detect_transitions(&mut session, &zones, &edge);
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].zone_id, risk.id);
        assert_eq!(t[0].event_type, EventType::Exit);
        assert!(session.is_inside(safe.id));
    }

    #[test]
    fn priority_table() {
        use NotificationPriority::*;
        assert_eq!(notification_priority(ZoneType::Risk, EventType::Enter), High);
        assert_eq!(notification_priority(ZoneType::Risk, EventType::Exit), Medium);
        assert_eq!(notification_priority(ZoneType::Safe, EventType::Enter), Low);
        assert_eq!(notification_priority(ZoneType::Safe, EventType::Exit), Low);
    }

    #[test]
    fn message_templates() {
        assert_eq!(
            notification_message(ZoneType::Safe, EventType::Enter, "Safe Zone 1"),
            "You've entered a Safe Zone: Safe Zone 1"
        );
        assert_eq!(
            notification_message(ZoneType::Safe, EventType::Exit, "Safe Zone 1"),
            "You've left the Safe Zone: Safe Zone 1"
        );
        assert_eq!(
            notification_message(ZoneType::Risk, EventType::Enter, "Risk Zone 1"),
            "Caution: You've entered a Risk Zone with multiple safety reports: Risk Zone 1"
        );
        assert_eq!(
            notification_message(ZoneType::Risk, EventType::Exit, "Risk Zone 1"),
            "You've exited the Risk Zone: Risk Zone 1"
        );
    }

    proptest! {
        // Exits for a zone never outnumber enters by more than the start
        // state allows: you cannot exit a zone you never entered.
        #[test]
        fn prop_enter_exit_pairing(steps in proptest::collection::vec(0.0f64..0.02, 1..40)) {
            let zone = zone_at(30.0444, 31.2357, 500.0, ZoneType::Risk, "Risk Zone 1");
            let zones = vec![zone];
            let mut session = GeofenceSession::new(None);

            let mut enters = 0i64;
            let mut exits = 0i64;
            for offset in steps {
                let sample = PositionSample::new(30.0444 + offset, 31.2357, 10.0);
                for t in GeofenceEventEngine::detect_transitions(&mut session, &zones, &sample) {
                    match t.event_type {
                        EventType::Enter => enters += 1,
                        EventType::Exit => exits += 1,
                    }
                }
                prop_assert!(exits <= enters);
                prop_assert!(enters - exits <= 1);
            }
        }
    }
}
