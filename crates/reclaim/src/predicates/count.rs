//! Count-based predicate: an alternate eviction heuristic that ignores disk
//! space and trims idle complete items once too many are being managed.

use crate::error::{Error, Result};
use crate::types::{Item, Snapshot};
use crate::units::{KB, MB, serde_size};
use serde::{Deserialize, Serialize};

/// Item-count thresholds with two severity bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountConfig {
    /// Above this many items, idle complete items are deleted
    #[serde(default = "default_soft_limit")]
    pub soft_limit: usize,
    /// Above this many items, slow complete items are deleted too
    #[serde(default = "default_hard_limit")]
    pub hard_limit: usize,
    /// Idle threshold for the soft band (bytes/s)
    #[serde(with = "serde_size", default = "default_soft_idle_threshold")]
    pub soft_idle_threshold: u64,
    /// Idle threshold for the hard band (bytes/s)
    #[serde(with = "serde_size", default = "default_hard_idle_threshold")]
    pub hard_idle_threshold: u64,
}

fn default_soft_limit() -> usize {
    15
}

fn default_hard_limit() -> usize {
    20
}

fn default_soft_idle_threshold() -> u64 {
    KB
}

fn default_hard_idle_threshold() -> u64 {
    MB
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            soft_limit: default_soft_limit(),
            hard_limit: default_hard_limit(),
            soft_idle_threshold: default_soft_idle_threshold(),
            hard_idle_threshold: default_hard_idle_threshold(),
        }
    }
}

impl CountConfig {
    /// The hard band must start at or above the soft band
    pub fn validate(&self) -> Result<()> {
        if self.hard_limit < self.soft_limit {
            return Err(Error::InvalidConfig(format!(
                "count.hard_limit ({}) is below count.soft_limit ({})",
                self.hard_limit, self.soft_limit
            )));
        }
        Ok(())
    }

    /// Should `item` be deleted because the snapshot holds too many items?
    pub fn should_delete(&self, snapshot: &Snapshot, item: &Item) -> bool {
        if !item.has_data() {
            return false;
        }

        let count = match snapshot.items.as_deref() {
            Some(items) if items.len() > self.soft_limit => items.len(),
            _ => return false,
        };

        let threshold = if count > self.hard_limit {
            self.hard_idle_threshold
        } else {
            self.soft_idle_threshold
        };

        item.is_complete() && item.upload_speed < threshold
    }
}
