//! Core types for the zone layer
//!
//! Defines the report and zone domain types:
//! - Typed identifiers (uuid newtypes)
//! - Vibe-type tags carried by community reports
//! - Ephemeral spatial clusters
//! - Persisted geofence zones

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum radius of a generated zone, in meters.
pub const MIN_ZONE_RADIUS_M: f64 = 200.0;

/// Maximum radius of a generated zone, in meters.
pub const MAX_ZONE_RADIUS_M: f64 = 1000.0;

/// Unique report identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportId(pub Uuid);

impl ReportId {
    /// Generate new report ID.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique zone identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub Uuid);

impl ZoneId {
    /// Generate new zone ID.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ZoneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Perceived-atmosphere tag on a community report.
///
/// Tags the engine does not recognize decode as [`VibeType::Unknown`] so a
/// single exotic row cannot fail a whole report fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VibeType {
    /// Area felt safe
    Safe,
    /// Quiet, relaxed atmosphere
    Calm,
    /// Busy but friendly
    Lively,
    /// Celebration or street event
    Festive,
    /// Unusually dense crowd
    Crowded,
    /// Something felt off
    Suspicious,
    /// Immediate danger observed
    Dangerous,
    /// Disruptive noise
    Noisy,
    /// Unusually empty
    Quiet,
    /// Tag this engine does not recognize
    #[serde(other)]
    Unknown,
}

/// A location-tagged community report. Read-only to this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report identifier
    pub id: ReportId,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Perceived atmosphere tag
    pub vibe_type: VibeType,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Create a report at the given coordinates.
    #[inline]
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, vibe_type: VibeType) -> Self {
        Self {
            id: ReportId::new(),
            latitude,
            longitude,
            vibe_type,
            created_at: Utc::now(),
        }
    }
}

/// Ephemeral spatial grouping of reports, produced during zone generation
/// and discarded after classification.
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Arithmetic mean of member latitudes
    pub center_lat: f64,
    /// Arithmetic mean of member longitudes
    pub center_lon: f64,
    /// Spread radius in meters, floored at [`MIN_ZONE_RADIUS_M`]
    pub radius_meters: f64,
    /// Member reports
    pub members: Vec<Report>,
}

impl Cluster {
    /// Number of member reports.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cluster has no members.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Count members carrying the given vibe type.
    #[inline]
    #[must_use]
    pub fn count_of(&self, vibe: VibeType) -> usize {
        self.members.iter().filter(|r| r.vibe_type == vibe).count()
    }
}

/// Semantic type inferred for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    /// Elevated share of dangerous/suspicious reports
    Risk,
    /// Dominated by calm/festive reports
    Safe,
}

impl ZoneType {
    /// Capitalized label used in generated zone names.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            ZoneType::Risk => "Risk",
            ZoneType::Safe => "Safe",
        }
    }
}

impl std::fmt::Display for ZoneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneType::Risk => write!(f, "risk"),
            ZoneType::Safe => write!(f, "safe"),
        }
    }
}

/// A persisted circular geofence with an inferred semantic type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    /// Zone identifier
    pub id: ZoneId,
    /// Display name, e.g. `"Risk Zone 1"`
    pub name: String,
    /// Inferred semantic type
    pub zone_type: ZoneType,
    /// Center latitude in degrees
    pub center_lat: f64,
    /// Center longitude in degrees
    pub center_lon: f64,
    /// Radius in meters, always within `[200, 1000]` for generated zones
    pub radius_meters: f64,
    /// Whether the zone participates in monitoring
    pub is_active: bool,
    /// Optional free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Zone {
    /// Build a zone from a classified cluster, clamping the radius.
    #[must_use]
    pub fn from_cluster(cluster: &Cluster, zone_type: ZoneType, name: impl Into<String>) -> Self {
        Self {
            id: ZoneId::new(),
            name: name.into(),
            zone_type,
            center_lat: cluster.center_lat,
            center_lon: cluster.center_lon,
            radius_meters: cluster
                .radius_meters
                .clamp(MIN_ZONE_RADIUS_M, MAX_ZONE_RADIUS_M),
            is_active: true,
            description: None,
        }
    }

    /// Containment test against this zone's circle.
    #[inline]
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        hyperapp_geo::is_within_radius(
            latitude,
            longitude,
            self.center_lat,
            self.center_lon,
            self.radius_meters,
        )
    }
}
