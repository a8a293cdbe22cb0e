//! Geofence controller
//!
//! Lifecycle façade that wires the pieces together:
//! - Loads and persists per-user settings
//! - Toggles monitoring (auth-gated)
//! - Loads zones, opens the session, and feeds the event engine

use crate::auth::AuthContext;
use crate::engine::GeofenceEventEngine;
use crate::error::GeofenceError;
use crate::monitor::PositionMonitor;
use crate::notify::{NotificationPriority, NotificationSink};
use crate::position::{PositionService, SubscribeOptions};
use crate::types::{GeofenceSession, UserGeofenceSettings};
use hyperapp_zones::{tables, DataStore, QueryFilter, ZoneRepository};
use parking_lot::Mutex;
use std::sync::Arc;

/// Owns enable/disable lifecycle and settings for one device session.
///
/// Settings are single-writer: only this controller mutates them, and
/// user-initiated actions arrive serialized. The zone list is loaded once
/// per monitoring run and read-only while monitoring.
pub struct GeofenceController {
    store: Arc<dyn DataStore>,
    auth: Arc<dyn AuthContext>,
    notifier: Arc<dyn NotificationSink>,
    repository: ZoneRepository,
    monitor: PositionMonitor,
    engine: Arc<GeofenceEventEngine>,
    settings: Mutex<Option<UserGeofenceSettings>>,
    session: Arc<Mutex<GeofenceSession>>,
}

impl GeofenceController {
    /// Wire a controller from its four collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        auth: Arc<dyn AuthContext>,
        positions: Arc<dyn PositionService>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            repository: ZoneRepository::new(Arc::clone(&store)),
            monitor: PositionMonitor::new(positions),
            engine: Arc::new(GeofenceEventEngine::new(
                Arc::clone(&store),
                Arc::clone(&notifier),
            )),
            store,
            auth,
            notifier,
            settings: Mutex::new(None),
            session: Arc::new(Mutex::new(GeofenceSession::default())),
        }
    }

    /// Whether a monitoring run is live.
    #[inline]
    #[must_use]
    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_monitoring()
    }

    /// Last loaded settings, if any.
    #[inline]
    #[must_use]
    pub fn cached_settings(&self) -> Option<UserGeofenceSettings> {
        self.settings.lock().clone()
    }

    /// Fetch the current user's settings, creating and persisting defaults
    /// when no row exists. A store failure degrades to unpersisted defaults.
    ///
    /// # Errors
    /// - [`GeofenceError::AuthRequired`] when no user is signed in
    pub async fn load_settings(&self) -> Result<UserGeofenceSettings, GeofenceError> {
        let user_id = self.auth.current_user_id().ok_or(GeofenceError::AuthRequired)?;

        let filter = QueryFilter::new().eq("user_id", user_id.to_string());
        let settings = match self
            .store
            .query(tables::USER_GEOFENCE_SETTINGS, filter)
            .await
        {
            Ok(rows) => match rows.into_iter().next() {
                Some(row) => match serde_json::from_value::<UserGeofenceSettings>(row) {
                    Ok(settings) => settings,
                    Err(e) => {
                        tracing::warn!(error = %e, "malformed settings row, using defaults");
                        UserGeofenceSettings::defaults(user_id)
                    }
                },
                None => {
                    let defaults = UserGeofenceSettings::defaults(user_id);
                    tracing::info!(user = %user_id, "no settings row, creating defaults");
                    if let Err(e) = self.persist_settings(&defaults).await {
                        tracing::warn!(error = %e, "default settings persist failed");
                    }
                    defaults
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "settings load failed, using defaults");
                UserGeofenceSettings::defaults(user_id)
            }
        };

        *self.settings.lock() = Some(settings.clone());
        Ok(settings)
    }

    /// Upsert settings to the store and update the cache.
    ///
    /// # Errors
    /// - [`GeofenceError::Store`] when the write is rejected
    pub async fn save_settings(
        &self,
        settings: UserGeofenceSettings,
    ) -> Result<(), GeofenceError> {
        self.persist_settings(&settings).await?;
        *self.settings.lock() = Some(settings);
        Ok(())
    }

    /// Flip the enabled flag, persist it, and start or stop monitoring.
    /// Returns the new enabled state.
    ///
    /// A settings-write failure is logged but does not block the toggle
    /// (transient store errors never take monitoring down). A failed
    /// monitoring start rolls the flag back and surfaces the error.
    ///
    /// # Errors
    /// - [`GeofenceError::AuthRequired`] when no user is signed in
    /// - [`GeofenceError::Position`] when the location watch cannot start
    pub async fn toggle_monitoring(&self) -> Result<bool, GeofenceError> {
        if !self.auth.is_authenticated() {
            return Err(GeofenceError::AuthRequired);
        }

        let mut settings = match self.cached_settings() {
            Some(settings) => settings,
            None => self.load_settings().await?,
        };
        settings.enabled = !settings.enabled;

        if let Err(e) = self.persist_settings(&settings).await {
            tracing::warn!(error = %e, "settings persist failed during toggle");
        }
        *self.settings.lock() = Some(settings.clone());

        if settings.enabled {
            if let Err(e) = self.start_monitoring(&settings).await {
                settings.enabled = false;
                *self.settings.lock() = Some(settings);
                return Err(e);
            }
        } else {
            self.stop_monitoring().await;
        }

        Ok(settings.enabled)
    }

    /// Load zones (generating from reports when the store holds none), open
    /// a fresh session, and start the sample loop.
    async fn start_monitoring(
        &self,
        settings: &UserGeofenceSettings,
    ) -> Result<(), GeofenceError> {
        // Zone load/generation completes before the first containment test.
        let zones = Arc::new(self.repository.load_active_zones().await);
        if zones.is_empty() {
            tracing::warn!("monitoring starting with zero zones");
        }

        *self.session.lock() = GeofenceSession::new(self.auth.current_user_id());

        let engine = Arc::clone(&self.engine);
        let session = Arc::clone(&self.session);
        let notifier = Arc::clone(&self.notifier);
        let settings = settings.clone();

        self.monitor
            .start(SubscribeOptions::default(), move |update| match update {
                Ok(sample) => {
                    let mut session = session.lock();
                    engine.process_sample(&mut session, &zones, &settings, sample);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "position stream failed, monitoring stopped");
                    notifier.notify(
                        &format!("Location tracking stopped: {e}"),
                        NotificationPriority::Medium,
                    );
                }
            })
            .await
    }

    /// Cancel the watch and discard membership state.
    async fn stop_monitoring(&self) {
        self.monitor.stop().await;
        self.session.lock().reset();
    }

    async fn persist_settings(&self, settings: &UserGeofenceSettings) -> Result<(), GeofenceError> {
        let record = serde_json::to_value(settings)
            .map_err(|e| GeofenceError::InvalidSettings(e.to_string()))?;
        self.store
            .upsert(tables::USER_GEOFENCE_SETTINGS, record)
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for GeofenceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeofenceController")
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}
