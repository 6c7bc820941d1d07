//! Decision function: should this item be deleted in this cycle?
//!
//! The per-cycle work (headroom assessment, candidate building, solving) is
//! done once by [`plan_cycle`]; [`CyclePlan::should_delete`] is a cheap
//! per-item lookup. [`should_delete`] combines both for callers that only
//! evaluate a single item.

use crate::candidates;
use crate::config::ReclaimConfig;
use crate::diagnostics::{self, DeletionReport, Diagnostic, DiagnosticSink, Rule};
use crate::headroom::{self, Headroom, Tier};
use crate::solver::{self, Selection};
use crate::types::{Item, Snapshot};

/// What the cycle decided for the snapshot as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Enough free space; nothing is deleted
    Hold,
    /// Only one item has data on disk; it is never deleted
    LastCopy,
    /// Item state or free space unavailable; purge slow items
    Emergency,
    /// Light tier; delete complete items that are idle
    IdleComplete,
    /// Urgent tier; delete the solver's selection
    Reclaim(Selection),
}

impl Verdict {
    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::LastCopy => "last-copy",
            Self::Emergency => "emergency",
            Self::IdleComplete => "idle-complete",
            Self::Reclaim(_) => "reclaim",
        }
    }
}

/// The result of evaluating one snapshot, reusable for every item in it.
#[derive(Debug, Clone)]
pub struct CyclePlan {
    headroom: Option<Headroom>,
    verdict: Verdict,
    candidate_count: usize,
    weight_unit: u64,
    idle_threshold: u64,
    emergency_threshold: u64,
}

impl CyclePlan {
    /// Headroom assessment, `None` if free space was unknown
    pub fn headroom(&self) -> Option<&Headroom> {
        self.headroom.as_ref()
    }

    /// Tier the cycle ran in, `None` if free space was unknown
    pub fn tier(&self) -> Option<Tier> {
        self.headroom.map(|h| h.tier)
    }

    /// Cycle-wide verdict
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Solver selection, present only in the urgent tier
    pub fn selection(&self) -> Option<&Selection> {
        match &self.verdict {
            Verdict::Reclaim(selection) => Some(selection),
            _ => None,
        }
    }

    /// Number of candidates the solver considered
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    /// Decide for one item without reporting diagnostics
    pub fn decide(&self, item: &Item) -> Option<Rule> {
        if !item.has_data() {
            return None;
        }

        match &self.verdict {
            Verdict::Hold | Verdict::LastCopy => None,
            Verdict::Emergency => (item.upload_speed < self.emergency_threshold).then_some(Rule::Emergency),
            Verdict::IdleComplete => {
                (item.is_complete() && item.upload_speed < self.idle_threshold).then_some(Rule::IdleComplete)
            }
            Verdict::Reclaim(selection) => selection.contains(&item.name).then_some(Rule::Reclaim),
        }
    }

    /// Decide for one item, reporting deletions to `sink`
    pub fn should_delete(&self, item: &Item, sink: &dyn DiagnosticSink) -> bool {
        let Some(rule) = self.decide(item) else {
            return false;
        };

        let report = DeletionReport {
            item,
            rule,
            free_space: self.headroom.map(|h| h.free_space),
            candidate_count: self.candidate_count,
            required_units: self.tier().map(|t| t.target()).unwrap_or(0),
            weight_unit: self.weight_unit,
        };
        diagnostics::emit(sink, &Diagnostic::Deletion(report));
        true
    }
}

/// Evaluate a snapshot once for the whole cycle.
///
/// Rules, in order:
/// 1. Safe tier: nothing is deleted.
/// 2. Missing item list, or free space unknown: emergency purge of slow items.
/// 3. Exactly one item with data: it is kept.
/// 4. Light tier: complete idle items are deleted.
/// 5. Urgent tier: the solver picks the cheapest set covering the target.
pub fn plan_cycle(snapshot: &Snapshot, config: &ReclaimConfig, sink: &dyn DiagnosticSink) -> CyclePlan {
    let headroom = headroom::assess(snapshot, config);
    let mut candidate_count = 0;

    let verdict = match (headroom, snapshot.items.as_deref()) {
        (Some(h), _) if h.tier.is_safe() => Verdict::Hold,
        (None, _) | (_, None) => {
            log::warn!("snapshot is missing item state, falling back to emergency purge");
            diagnostics::emit(
                sink,
                &Diagnostic::MissingState {
                    free_space: headroom.map(|h| h.free_space),
                    threshold: config.emergency_threshold,
                },
            );
            Verdict::Emergency
        }
        (Some(_), Some(_)) if snapshot.eligible_count() == 1 => Verdict::LastCopy,
        (Some(h), Some(items)) => match h.tier {
            Tier::Safe => Verdict::Hold,
            Tier::Light => Verdict::IdleComplete,
            Tier::Urgent { target } => {
                let candidates = candidates::build(items, config.weight_unit);
                candidate_count = candidates.len();
                let selection = solver::select(&candidates, target);
                if !selection.feasible {
                    log::warn!(
                        "cannot free {} units from {} candidates, deleting all of them",
                        target,
                        candidate_count
                    );
                }
                Verdict::Reclaim(selection)
            }
        },
    };

    CyclePlan {
        headroom,
        verdict,
        candidate_count,
        weight_unit: config.weight_unit,
        idle_threshold: config.idle_threshold,
        emergency_threshold: config.emergency_threshold,
    }
}

/// Should `item` be deleted given `snapshot`?
///
/// Equivalent to [`plan_cycle`] followed by [`CyclePlan::should_delete`].
/// When evaluating many items of the same snapshot, plan once instead.
pub fn should_delete(
    snapshot: &Snapshot,
    item: &Item,
    config: &ReclaimConfig,
    sink: &dyn DiagnosticSink,
) -> bool {
    plan_cycle(snapshot, config, sink).should_delete(item, sink)
}
