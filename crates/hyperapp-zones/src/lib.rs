//! HyperApp zone layer
//!
//! Turns the community's report history into persisted geofence zones:
//! - Greedy fixed-radius clustering of recent reports
//! - Vibe-distribution classification into risk/safe zones
//! - Repository that loads persisted zones or bootstraps them
//!
//! The data store is reached only through the [`DataStore`] trait, so the
//! whole layer runs against an in-memory fake in tests.

pub mod classifier;
pub mod clusterer;
pub mod repository;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use classifier::{
    classify, DANGER_RATIO_THRESHOLD, FESTIVE_WEIGHT, SAFETY_RATIO_THRESHOLD, SUSPICIOUS_WEIGHT,
};
pub use clusterer::{cluster_reports, DEFAULT_LINK_RADIUS_KM, MIN_CLUSTER_SIZE};
pub use repository::{ZoneRepository, RECENT_REPORT_LIMIT};
pub use store::{tables, DataStore, QueryFilter, SortOrder, StoreError};
pub use types::{
    Cluster, Report, ReportId, VibeType, Zone, ZoneId, ZoneType, MAX_ZONE_RADIUS_M,
    MIN_ZONE_RADIUS_M,
};
