//! Statistics collected while searching for a layout.

use serde::{Deserialize, Serialize};

/// Counters describing one search run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Tree nodes created, root included.
    pub nodes_created: usize,

    /// Candidate placements discarded because their configuration was
    /// already in the tree.
    pub duplicates_skipped: usize,

    /// Complete configurations checked for feasibility.
    pub configurations_total: usize,

    /// Configurations that passed the feasibility check.
    pub configurations_valid: usize,

    /// Times a new best layout was recorded.
    pub best_updates: usize,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Share of checked configurations that were feasible.
    pub fn valid_ratio(&self) -> f64 {
        if self.configurations_total == 0 {
            return 0.0;
        }
        self.configurations_valid as f64 / self.configurations_total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ratio_handles_empty_runs() {
        assert_eq!(SearchStats::new().valid_ratio(), 0.0);

        let stats = SearchStats {
            configurations_total: 4,
            configurations_valid: 1,
            ..SearchStats::default()
        };
        assert!((stats.valid_ratio() - 0.25).abs() < 1e-12);
    }
}
