//! Predicates that sit beside the reclamation engine: whether to start a
//! download, whether its free window has expired, and a count-based
//! alternative to disk-based eviction.

pub mod accept;
pub mod count;
pub mod expiry;

pub use accept::{AcceptConfig, AcceptPolicy, AcceptRule, Classification};
pub use count::CountConfig;
pub use expiry::{ExpiryPolicy, ExpiryRule, Promotion, SizeTier};

use crate::types::{Item, Listing, Snapshot};
use chrono::{DateTime, Utc};

/// Should a newly announced release be downloaded?
pub fn accept(listing: &Listing, policy: &AcceptPolicy) -> bool {
    policy.accept(listing)
}

/// Should an incomplete item be removed because its free window expired?
pub fn force_free(item: &Item, now: DateTime<Utc>, policy: &ExpiryPolicy) -> bool {
    policy.force_free(item, now)
}

/// Should an item be removed because too many items are managed?
pub fn count_should_delete(snapshot: &Snapshot, item: &Item, config: &CountConfig) -> bool {
    config.should_delete(snapshot, item)
}
