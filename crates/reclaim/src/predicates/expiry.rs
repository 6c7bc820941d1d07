//! Expiry predicate: force-free incomplete items whose free-download window
//! has run out, regardless of disk pressure.
//!
//! Only categories listed in the table are considered. A category has a
//! default window and optional promotions: a name pattern plus size tiers
//! that give larger releases longer windows.

use crate::error::{Error, Result};
use crate::types::Item;
use crate::units::{GB, serde_size_opt};
use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Free-window settings for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiryRule {
    /// Category tag this rule applies to
    pub category: String,
    /// Window when no promotion matches
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,
    /// Name-specific windows, first match wins
    #[serde(default)]
    pub promotions: Vec<Promotion>,
}

/// A name pattern with size-tiered windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    /// Pattern a release name must match
    pub pattern: String,
    /// Windows by size, first tier whose bound holds wins
    pub tiers: Vec<SizeTier>,
}

/// Window for releases up to a size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTier {
    /// Inclusive upper size bound, unbounded when absent
    #[serde(default, with = "serde_size_opt", skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    /// Window in hours
    pub window_hours: u32,
}

impl SizeTier {
    fn new(max_size: Option<u64>, window_hours: u32) -> Self {
        Self {
            max_size,
            window_hours,
        }
    }
}

fn default_window_hours() -> u32 {
    24
}

/// The deployed table: official web releases get 12–48 h depending on size,
/// everything else in the category 24 h.
pub fn default_rules() -> Vec<ExpiryRule> {
    vec![ExpiryRule {
        category: "chdbits".to_string(),
        window_hours: 24,
        promotions: vec![Promotion {
            pattern: "(-|@)CHDWEB".to_string(),
            tiers: vec![
                SizeTier::new(Some(15 * GB), 12),
                SizeTier::new(Some(40 * GB), 24),
                SizeTier::new(Some(100 * GB), 36),
                SizeTier::new(None, 48),
            ],
        }],
    }]
}

#[derive(Debug, Clone)]
struct CompiledPromotion {
    pattern: Regex,
    tiers: Vec<SizeTier>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    category: String,
    window: TimeDelta,
    promotions: Vec<CompiledPromotion>,
}

/// Compiled free-window table.
#[derive(Debug, Clone, Default)]
pub struct ExpiryPolicy {
    rules: Vec<CompiledRule>,
}

impl ExpiryPolicy {
    /// Validate and compile a rule table
    pub fn compile(rules: &[ExpiryRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let promotions = rule
                    .promotions
                    .iter()
                    .map(|promotion| {
                        if promotion.tiers.is_empty() {
                            return Err(Error::InvalidConfig(format!(
                                "expiry promotion '{}' for category '{}' has no tiers",
                                promotion.pattern, rule.category
                            )));
                        }
                        let pattern = Regex::new(&promotion.pattern).map_err(|source| Error::InvalidPattern {
                            context: format!("expiry category '{}'", rule.category),
                            pattern: promotion.pattern.clone(),
                            source,
                        })?;
                        Ok(CompiledPromotion {
                            pattern,
                            tiers: promotion.tiers.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(CompiledRule {
                    category: rule.category.clone(),
                    window: hours(rule.window_hours),
                    promotions,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules })
    }

    /// Free window for an item, `None` if its category is not tracked
    pub fn window_for(&self, item: &Item) -> Option<TimeDelta> {
        let rule = self.rules.iter().find(|rule| rule.category == item.category)?;

        let promoted = rule
            .promotions
            .iter()
            .find(|promotion| promotion.pattern.is_match(&item.name))
            .and_then(|promotion| {
                promotion
                    .tiers
                    .iter()
                    .find(|tier| tier.max_size.is_none_or(|max| item.size <= max))
            });

        Some(promoted.map_or(rule.window, |tier| hours(tier.window_hours)))
    }

    /// Should `item` be removed because its free window has passed?
    ///
    /// Complete items and items without an added time are never force-freed.
    pub fn force_free(&self, item: &Item, now: DateTime<Utc>) -> bool {
        if item.is_complete() {
            return false;
        }
        let Some(added_on) = item.added_on else {
            return false;
        };
        let Some(window) = self.window_for(item) else {
            return false;
        };
        let age = now - added_on;
        let expired = age > window;
        if expired {
            log::debug!(
                "'{}' expired: age {}h exceeds window {}h",
                item.name,
                age.num_hours(),
                window.num_hours()
            );
        }
        expired
    }
}

fn hours(hours: u32) -> TimeDelta {
    TimeDelta::hours(i64::from(hours))
}
