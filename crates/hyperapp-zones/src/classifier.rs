//! Zone classification
//!
//! Assigns a semantic zone type to a cluster from the distribution of vibe
//! types among its member reports. Pure function of the counts; the weights
//! and thresholds are design constants shared with the mobile clients, so
//! they must not drift.

use crate::types::{Cluster, VibeType, ZoneType};

/// A cluster becomes a risk zone at this weighted danger share.
pub const DANGER_RATIO_THRESHOLD: f64 = 0.4;

/// A cluster becomes a safe zone at this weighted safety share.
pub const SAFETY_RATIO_THRESHOLD: f64 = 0.5;

/// Weight of a `suspicious` report relative to a `dangerous` one.
pub const SUSPICIOUS_WEIGHT: f64 = 0.5;

/// Weight of a `festive` report relative to a `calm` one.
pub const FESTIVE_WEIGHT: f64 = 0.7;

/// Classify a cluster, or `None` for neutral clusters that produce no zone.
///
/// Danger takes precedence: a cluster passing both thresholds is `Risk`.
#[must_use]
pub fn classify(cluster: &Cluster) -> Option<ZoneType> {
    let total = cluster.len();
    if total == 0 {
        return None;
    }
    let total = total as f64;

    let dangerous = cluster.count_of(VibeType::Dangerous) as f64;
    let suspicious = cluster.count_of(VibeType::Suspicious) as f64;
    let calm = cluster.count_of(VibeType::Calm) as f64;
    let festive = cluster.count_of(VibeType::Festive) as f64;

    let danger_ratio = (dangerous + SUSPICIOUS_WEIGHT * suspicious) / total;
    let safety_ratio = (calm + FESTIVE_WEIGHT * festive) / total;

    if danger_ratio >= DANGER_RATIO_THRESHOLD {
        Some(ZoneType::Risk)
    } else if safety_ratio >= SAFETY_RATIO_THRESHOLD {
        Some(ZoneType::Safe)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Report;
    use pretty_assertions::assert_eq;

    fn cluster_of(vibes: &[VibeType]) -> Cluster {
        Cluster {
            center_lat: 30.0,
            center_lon: 31.0,
            radius_meters: 200.0,
            members: vibes
                .iter()
                .map(|&v| Report::new(30.0, 31.0, v))
                .collect(),
        }
    }

    #[test]
    fn three_dangerous_of_five_is_risk() {
        // danger_ratio = 3/5 = 0.6 >= 0.4
        let cluster = cluster_of(&[
            VibeType::Dangerous,
            VibeType::Dangerous,
            VibeType::Dangerous,
            VibeType::Calm,
            VibeType::Calm,
        ]);
        assert_eq!(classify(&cluster), Some(ZoneType::Risk));
    }

    #[test]
    fn all_calm_is_safe() {
        // safety_ratio = 4/4 = 1.0 >= 0.5
        let cluster = cluster_of(&[
            VibeType::Calm,
            VibeType::Calm,
            VibeType::Calm,
            VibeType::Calm,
        ]);
        assert_eq!(classify(&cluster), Some(ZoneType::Safe));
    }

    #[test]
    fn suspicious_counts_half() {
        // danger_ratio = (0 + 0.5*4) / 5 = 0.4, right at the threshold.
        let cluster = cluster_of(&[
            VibeType::Suspicious,
            VibeType::Suspicious,
            VibeType::Suspicious,
            VibeType::Suspicious,
            VibeType::Quiet,
        ]);
        assert_eq!(classify(&cluster), Some(ZoneType::Risk));
    }

    #[test]
    fn festive_counts_seven_tenths() {
        // safety_ratio = (1 + 0.7*2) / 4 = 0.6 >= 0.5
        let cluster = cluster_of(&[
            VibeType::Calm,
            VibeType::Festive,
            VibeType::Festive,
            VibeType::Noisy,
        ]);
        assert_eq!(classify(&cluster), Some(ZoneType::Safe));
    }

    #[test]
    fn neutral_cluster_yields_no_zone() {
        let cluster = cluster_of(&[
            VibeType::Crowded,
            VibeType::Lively,
            VibeType::Noisy,
            VibeType::Quiet,
        ]);
        assert_eq!(classify(&cluster), None);
    }

    #[test]
    fn danger_takes_precedence_over_safety() {
        // Both thresholds pass: 2/4 dangerous and 2/4 calm.
        let cluster = cluster_of(&[
            VibeType::Dangerous,
            VibeType::Dangerous,
            VibeType::Calm,
            VibeType::Calm,
        ]);
        assert_eq!(classify(&cluster), Some(ZoneType::Risk));
    }

    #[test]
    fn empty_cluster_yields_no_zone() {
        let cluster = cluster_of(&[]);
        assert_eq!(classify(&cluster), None);
    }

    #[test]
    fn classification_is_deterministic() {
        let cluster = cluster_of(&[
            VibeType::Dangerous,
            VibeType::Suspicious,
            VibeType::Calm,
            VibeType::Crowded,
        ]);
        let first = classify(&cluster);
        for _ in 0..10 {
            assert_eq!(classify(&cluster), first);
        }
    }
}
