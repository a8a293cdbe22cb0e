//! Report clustering
//!
//! Groups a batch of location-tagged reports into spatial clusters with a
//! fixed-radius greedy single pass. Cluster membership depends on input
//! order: the first unprocessed report seeds a cluster and pulls in every
//! later unprocessed report within the link radius, with no iterative
//! refinement. That order dependence is accepted behavior; callers feed
//! reports newest-first and tests pin the order.

use crate::types::{Cluster, Report, MIN_ZONE_RADIUS_M};
use hyperapp_geo::distance_km;
use std::collections::HashSet;

/// Default link radius between a seed report and joining reports.
pub const DEFAULT_LINK_RADIUS_KM: f64 = 0.5;

/// Clusters smaller than this are dropped.
pub const MIN_CLUSTER_SIZE: usize = 3;

/// Group reports into spatial clusters.
///
/// Each cluster center is the arithmetic mean of member coordinates (simple
/// average, acceptable at sub-kilometer scales). The radius grows to the
/// farthest member's distance from the seed, floored at 200 m.
#[must_use]
pub fn cluster_reports(
    reports: &[Report],
    link_radius_km: f64,
    min_cluster_size: usize,
) -> Vec<Cluster> {
    let mut processed: HashSet<_> = HashSet::new();
    let mut clusters = Vec::new();

    for (i, seed) in reports.iter().enumerate() {
        if processed.contains(&seed.id) {
            continue;
        }
        processed.insert(seed.id);

        let mut members = vec![seed.clone()];
        let mut center_lat = seed.latitude;
        let mut center_lon = seed.longitude;
        let mut radius_meters = MIN_ZONE_RADIUS_M;

        for other in reports.iter().skip(i + 1) {
            if processed.contains(&other.id) {
                continue;
            }
            let d_km = distance_km(seed.latitude, seed.longitude, other.latitude, other.longitude);
            if d_km > link_radius_km {
                continue;
            }

            processed.insert(other.id);
            members.push(other.clone());

            // Recompute after every join: mean center, seed-anchored radius.
            let n = members.len() as f64;
            center_lat = members.iter().map(|r| r.latitude).sum::<f64>() / n;
            center_lon = members.iter().map(|r| r.longitude).sum::<f64>() / n;
            radius_meters = radius_meters.max(d_km * 1000.0);
        }

        if members.len() >= min_cluster_size {
            clusters.push(Cluster {
                center_lat,
                center_lon,
                radius_meters,
                members,
            });
        }
    }

    tracing::debug!(
        reports = reports.len(),
        clusters = clusters.len(),
        "clustered reports"
    );

    clusters
}
