//! Reporting hooks for search milestones.
//!
//! The search core performs no I/O of its own; callers that want
//! progress output, exports or live dashboards implement
//! [`SearchReporter`] and receive the milestones.

use tracing::{debug, info};

use super::stats::SearchStats;

/// Milestone callbacks invoked by the search. All methods default to
/// no-ops. Leaves are reported in depth-first discovery order
/// regardless of how they were evaluated.
pub trait SearchReporter {
    /// A complete configuration was evaluated. `cost` is `None` when
    /// the configuration is infeasible.
    fn leaf_evaluated(&mut self, canonical: &str, cost: Option<f64>) {
        let _ = (canonical, cost);
    }

    /// A new best layout was recorded.
    fn best_updated(&mut self, canonical: &str, cost: f64) {
        let _ = (canonical, cost);
    }

    /// The search finished.
    fn search_complete(&mut self, stats: &SearchStats) {
        let _ = stats;
    }
}

/// Discards all milestones.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl SearchReporter for NullReporter {}

/// Forwards milestones to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl SearchReporter for LogReporter {
    fn leaf_evaluated(&mut self, canonical: &str, cost: Option<f64>) {
        match cost {
            Some(cost) => debug!(canonical, cost, "configuration evaluated"),
            None => debug!(canonical, "configuration infeasible"),
        }
    }

    fn best_updated(&mut self, canonical: &str, cost: f64) {
        info!(canonical, cost, "new best layout");
    }

    fn search_complete(&mut self, stats: &SearchStats) {
        info!(
            configurations = stats.configurations_total,
            valid = stats.configurations_valid,
            duplicates_skipped = stats.duplicates_skipped,
            "search complete"
        );
    }
}
