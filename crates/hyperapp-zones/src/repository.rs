//! Zone repository
//!
//! Loads persisted zones from the data store, or bootstraps them from the
//! recent report history when the store holds none. Owns the in-memory zone
//! list handed to the monitoring layer; the monitor never mutates it.

use crate::classifier::classify;
use crate::clusterer::{cluster_reports, DEFAULT_LINK_RADIUS_KM, MIN_CLUSTER_SIZE};
use crate::store::{tables, DataStore, QueryFilter};
use crate::types::{Report, ReportId, VibeType, Zone};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Bounded window of recent reports considered during zone generation.
pub const RECENT_REPORT_LIMIT: usize = 1000;

/// Raw report row as stored; coordinates may be missing.
#[derive(Debug, Deserialize)]
struct ReportRow {
    id: ReportId,
    latitude: Option<f64>,
    longitude: Option<f64>,
    vibe_type: VibeType,
    created_at: DateTime<Utc>,
}

/// Loads zones and coordinates one-time generation from report history.
pub struct ZoneRepository {
    store: Arc<dyn DataStore>,
    link_radius_km: f64,
    min_cluster_size: usize,
}

impl ZoneRepository {
    /// Create a repository over the given store.
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            link_radius_km: DEFAULT_LINK_RADIUS_KM,
            min_cluster_size: MIN_CLUSTER_SIZE,
        }
    }

    /// Override the clustering link radius.
    #[inline]
    #[must_use]
    pub fn with_link_radius_km(mut self, radius_km: f64) -> Self {
        self.link_radius_km = radius_km;
        self
    }

    /// Load all active zones, generating them from reports when the store
    /// holds none.
    ///
    /// Store failures are contained: the result is an empty list and
    /// monitoring degrades to zero zones until the store is reachable.
    pub async fn load_active_zones(&self) -> Vec<Zone> {
        let filter = QueryFilter::new().eq("is_active", true);
        let rows = match self.store.query(tables::GEOFENCES, filter).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "zone load failed, monitoring with zero zones");
                return Vec::new();
            }
        };

        let zones: Vec<Zone> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Zone>(row) {
                Ok(zone) => Some(zone),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed zone row");
                    None
                }
            })
            .collect();

        if !zones.is_empty() {
            tracing::info!(count = zones.len(), "loaded active zones");
            return zones;
        }

        tracing::info!("no persisted zones, generating from report history");
        self.generate_zones_from_reports().await
    }

    /// Cluster recent reports, classify each cluster, and persist the
    /// resulting zones.
    ///
    /// Re-running appends new zones without deduplicating against existing
    /// ones; callers only invoke this when the zone set is empty.
    pub async fn generate_zones_from_reports(&self) -> Vec<Zone> {
        let reports = match self.fetch_recent_reports().await {
            Ok(reports) => reports,
            Err(e) => {
                tracing::warn!(error = %e, "report fetch failed, zone generation skipped");
                return Vec::new();
            }
        };

        let clusters = cluster_reports(&reports, self.link_radius_km, self.min_cluster_size);

        let mut zones = Vec::new();
        for cluster in &clusters {
            let Some(zone_type) = classify(cluster) else {
                continue; // neutral cluster, no zone
            };

            let name = format!("{} Zone {}", zone_type.title(), zones.len() + 1);
            let zone = Zone::from_cluster(cluster, zone_type, name);

            match serde_json::to_value(&zone) {
                Ok(record) => {
                    if let Err(e) = self.store.insert(tables::GEOFENCES, record).await {
                        tracing::warn!(zone = %zone.name, error = %e, "zone persist failed");
                        continue;
                    }
                }
                Err(e) => {
                    tracing::warn!(zone = %zone.name, error = %e, "zone encode failed");
                    continue;
                }
            }

            zones.push(zone);
        }

        tracing::info!(
            reports = reports.len(),
            clusters = clusters.len(),
            zones = zones.len(),
            "generated zones from reports"
        );

        zones
    }

    /// Fetch the bounded recent-report window. Rows without coordinates are
    /// excluded at the store, so they never consume window slots; the decode
    /// guard below covers adapters that ignore the filter.
    async fn fetch_recent_reports(&self) -> Result<Vec<Report>, crate::store::StoreError> {
        let filter = QueryFilter::new()
            .not_null("latitude")
            .not_null("longitude")
            .order_desc("created_at")
            .limit(RECENT_REPORT_LIMIT);
        let rows = self.store.query(tables::REPORTS, filter).await?;

        let reports = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<ReportRow>(row) {
                Ok(row) => {
                    let (Some(latitude), Some(longitude)) = (row.latitude, row.longitude) else {
                        return None; // no coordinates, excluded from clustering
                    };
                    Some(Report {
                        id: row.id,
                        latitude,
                        longitude,
                        vibe_type: row.vibe_type,
                        created_at: row.created_at,
                    })
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed report row");
                    None
                }
            })
            .collect();

        Ok(reports)
    }
}

impl std::fmt::Debug for ZoneRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneRepository")
            .field("link_radius_km", &self.link_radius_km)
            .field("min_cluster_size", &self.min_cluster_size)
            .finish_non_exhaustive()
    }
}
