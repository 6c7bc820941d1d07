//! Headroom monitor: how much space can disappear before the next report,
//! and how urgently space must be reclaimed right now.

use crate::config::{FreeSpaceSource, ReclaimConfig};
use crate::types::Snapshot;
use serde::Serialize;

/// Free-space band governing how aggressively space is reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum Tier {
    /// At least three increments free; nothing to do
    Safe,
    /// Between two and three increments free; drop idle complete items only
    Light,
    /// Under two increments free; free `target` weight units
    Urgent {
        /// Space to free, in weight units
        target: u64,
    },
}

impl Tier {
    /// Returns true if no reclamation is needed
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }

    /// Space the solver must free, zero outside the urgent tier
    pub fn target(&self) -> u64 {
        match self {
            Self::Urgent { target } => *target,
            _ => 0,
        }
    }

    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Light => "light",
            Self::Urgent { .. } => "urgent",
        }
    }
}

/// Result of assessing a snapshot against the configured margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Headroom {
    /// Current free space in bytes; negative when used space exceeds capacity
    pub free_space: i64,
    /// Space that may be consumed before the next report, in bytes
    pub increment: u64,
    /// Band the free space falls in
    pub tier: Tier,
}

/// Space that can be consumed before the next authoritative update:
/// `ceil(max_ingest_rate × report_interval) + reserve`.
pub fn increment(config: &ReclaimConfig) -> u64 {
    let ingest = config.max_ingest_rate as f64 * config.report_interval_duration().as_secs_f64();
    (ingest.ceil() as u64).saturating_add(config.reserve)
}

/// Free space according to the configured source.
///
/// Returns `None` when the source is the reported figure and the snapshot
/// does not carry one.
pub fn free_space(snapshot: &Snapshot, config: &ReclaimConfig) -> Option<i64> {
    match config.free_space {
        FreeSpaceSource::Capacity { total } => {
            Some(clamp_i64(i128::from(total) - i128::from(snapshot.used_space)))
        }
        FreeSpaceSource::Reported => snapshot.free_space.map(|free| clamp_i64(i128::from(free))),
    }
}

/// Classify free space into a tier.
///
/// Safe when `free ≥ 3 × increment`, light when `free ≥ 2 × increment`,
/// otherwise urgent with a target of `ceil((2 × increment − free) / weight_unit)`.
pub fn classify(free_space: i64, increment: u64, weight_unit: u64) -> Tier {
    let free = i128::from(free_space);
    let increment = i128::from(increment);

    if free >= 3 * increment {
        return Tier::Safe;
    }
    if free >= 2 * increment {
        return Tier::Light;
    }

    let deficit = 2 * increment - free;
    let unit = i128::from(weight_unit.max(1));
    let target = (deficit + unit - 1) / unit;
    Tier::Urgent {
        target: u64::try_from(target).unwrap_or(u64::MAX),
    }
}

/// Assess a snapshot. `None` means free space could not be determined.
pub fn assess(snapshot: &Snapshot, config: &ReclaimConfig) -> Option<Headroom> {
    let free_space = free_space(snapshot, config)?;
    let increment = increment(config);
    let tier = classify(free_space, increment, config.weight_unit);
    log::debug!(
        "headroom: free={} increment={} tier={}",
        free_space,
        increment,
        tier.label()
    );
    Some(Headroom {
        free_space,
        increment,
        tier,
    })
}

fn clamp_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;
    use crate::units::{GB, MB};
    use std::time::Duration;

    #[test]
    fn test_increment_default_deployment() {
        let config = ReclaimConfig::with_capacity(140 * GB);
        // 150 MiB/s for 60 s plus 1 GiB reserve
        assert_eq!(increment(&config), 150 * MB * 60 + GB);
    }

    #[test]
    fn test_increment_without_reserve() {
        let config = ReclaimConfig::with_reported()
            .max_ingest_rate(MB)
            .report_interval(Duration::from_secs(10))
            .reserve(0);
        assert_eq!(increment(&config), 10 * MB);
    }

    #[test]
    fn test_tier_boundaries() {
        let inc = 10 * GB;
        assert_eq!(classify(30 * GB as i64, inc, GB), Tier::Safe);
        assert_eq!(classify(30 * GB as i64 - 1, inc, GB), Tier::Light);
        assert_eq!(classify(20 * GB as i64, inc, GB), Tier::Light);
        assert_eq!(classify(20 * GB as i64 - 1, inc, GB), Tier::Urgent { target: 1 });
        assert_eq!(classify(5 * GB as i64, inc, GB), Tier::Urgent { target: 15 });
    }

    #[test]
    fn test_deficit_enlarges_target() {
        let inc = 10 * GB;
        assert_eq!(classify(-(5 * GB as i64), inc, GB), Tier::Urgent { target: 25 });
    }

    #[test]
    fn test_free_space_sources() {
        let snapshot = Snapshot::from_items(vec![Item::new("a", 100 * GB)]).with_free_space(7 * GB);

        let capacity = ReclaimConfig::with_capacity(140 * GB);
        assert_eq!(free_space(&snapshot, &capacity), Some(40 * GB as i64));

        let reported = ReclaimConfig::with_reported();
        assert_eq!(free_space(&snapshot, &reported), Some(7 * GB as i64));

        let no_report = Snapshot::from_items(vec![Item::new("a", GB)]);
        assert_eq!(free_space(&no_report, &reported), None);
        assert!(assess(&no_report, &reported).is_none());
    }

    #[test]
    fn test_capacity_below_used_is_negative() {
        let snapshot = Snapshot::missing_items(150 * GB);
        let config = ReclaimConfig::with_capacity(140 * GB);
        assert_eq!(free_space(&snapshot, &config), Some(-(10 * GB as i64)));
    }

    #[test]
    fn test_assess_original_scenario() {
        // 140 GiB volume with 135 GiB used: 5 GiB free against a ~9.8 GiB increment
        let snapshot = Snapshot::missing_items(135 * GB);
        let config = ReclaimConfig::with_capacity(140 * GB);
        let headroom = assess(&snapshot, &config).unwrap();
        assert_eq!(headroom.free_space, 5 * GB as i64);
        assert_eq!(headroom.tier, Tier::Urgent { target: 15 });
    }
}
