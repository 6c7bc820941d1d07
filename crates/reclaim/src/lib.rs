//! # reclaim
//!
//! Decides, on each polling cycle of a storage-constrained download manager,
//! which downloaded items to delete so that free disk space stays above a
//! safety margin, while keeping the items that upload the most.
//!
//! ## How a cycle is decided
//!
//! 1. **Headroom**: the space that may fill up before the next state report
//!    is `ceil(max_ingest_rate × report_interval) + reserve`. Free space is
//!    compared against multiples of that increment:
//!    - at least 3×: safe, nothing is deleted
//!    - at least 2×: light, complete items that are idle are deleted
//!    - below 2×: urgent, enough space to get back to 2× must be freed
//! 2. **Candidates**: every item with data on disk becomes a candidate whose
//!    weight is its size in weight units and whose value is its upload speed.
//! 3. **Solver**: picks the candidate set whose weight covers the target at
//!    the lowest total upload speed (a minimization knapsack).
//!
//! Items with no data are never deleted, and a lone item with data is kept
//! even under pressure. If the download manager fails to report its items,
//! slow items are purged instead.
//!
//! ## Example
//!
//! ```
//! use reclaim::{Item, NoopSink, ReclaimConfig, Snapshot, plan_cycle};
//! use reclaim::units::{GB, MB};
//!
//! let snapshot = Snapshot::from_items(vec![
//!     Item::new("busy", 60 * GB).with_speed(38 * MB).complete(),
//!     Item::new("quiet", 35 * GB).with_speed(MB).complete(),
//!     Item::new("dead", 40 * GB).complete(),
//! ]);
//! let config = ReclaimConfig::with_capacity(140 * GB);
//!
//! let plan = plan_cycle(&snapshot, &config, &NoopSink);
//! let doomed: Vec<_> = snapshot
//!     .items()
//!     .iter()
//!     .filter(|item| plan.should_delete(item, &NoopSink))
//!     .map(|item| item.name.as_str())
//!     .collect();
//!
//! assert_eq!(doomed, ["dead"]);
//! ```
//!
//! ## Side predicates
//!
//! The [`predicates`] module holds the simpler rules that run next to the
//! engine: acceptance of new releases, expiry of free-download windows, and
//! an item-count based eviction heuristic.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// Candidate builder.
pub mod candidates;
/// Engine configuration.
pub mod config;
/// Per-cycle planning and per-item decisions.
pub mod decision;
/// Diagnostic side channel.
pub mod diagnostics;
/// Error types for configuration.
pub mod error;
/// Headroom monitor and tiers.
pub mod headroom;
/// Acceptance, expiry and count-based predicates.
pub mod predicates;
/// Reclamation solver.
pub mod solver;
/// Snapshot, item and candidate types.
pub mod types;
/// Byte-size helpers.
pub mod units;

pub use config::{Config, FreeSpaceSource, Policies, ReclaimConfig};
pub use decision::{CyclePlan, Verdict, plan_cycle, should_delete};
pub use diagnostics::{Diagnostic, DiagnosticSink, LogSink, NoopSink, Rule, WriterSink};
pub use error::{Error, Result};
pub use headroom::{Headroom, Tier};
pub use predicates::{accept, count_should_delete, force_free};
pub use solver::Selection;
pub use types::{Candidate, Item, Listing, Snapshot};
