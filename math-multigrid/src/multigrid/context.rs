//! Per-solve bookkeeping threaded through every cycle call

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Order in which an additive cycle computes its per-level corrections
///
/// The corrections are independent, so the order never changes the result;
/// it only matters for where work happens first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelOrder {
    #[default]
    CoarseToFine,
    FineToCoarse,
}

/// Counters for a single level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelStats {
    /// Times a cycle entered this level
    pub visits: usize,
    pub pre_smooth_sweeps: usize,
    pub post_smooth_sweeps: usize,
    pub residual_evaluations: usize,
    /// Residuals restricted from this level to the next coarser one
    pub restrictions: usize,
    /// Corrections interpolated into this level
    pub interpolations: usize,
}

/// Accumulated statistics of one or more cycles
#[derive(Debug, Clone, Default)]
pub struct CycleStats {
    /// Completed cycles
    pub cycles: usize,
    pub coarse_solves: usize,
    /// Indexed like the hierarchy (0 = coarsest)
    pub levels: Vec<LevelStats>,
    /// Deepest frame stack seen
    pub max_stack_depth: usize,
    /// Time spent inside cycles
    pub elapsed: Duration,
}

impl CycleStats {
    /// Total smoothing sweeps over all levels
    pub fn total_sweeps(&self) -> usize {
        self.levels
            .iter()
            .map(|l| l.pre_smooth_sweeps + l.post_smooth_sweeps)
            .sum()
    }
}

/// Mode flags and counters for cycles run against one hierarchy
///
/// Nothing here is global: every solve owns its context, so two solves on the
/// same hierarchy never share counters.
#[derive(Debug, Clone)]
pub struct CycleContext {
    transpose: bool,
    additive_order: LevelOrder,
    stats: CycleStats,
}

impl CycleContext {
    pub fn new(num_levels: usize) -> Self {
        Self {
            transpose: false,
            additive_order: LevelOrder::default(),
            stats: CycleStats {
                levels: vec![LevelStats::default(); num_levels],
                ..CycleStats::default()
            },
        }
    }

    /// Run cycles with `Aᵀ` instead of `A`
    pub fn with_transpose(mut self, transpose: bool) -> Self {
        self.transpose = transpose;
        self
    }

    pub fn with_additive_order(mut self, order: LevelOrder) -> Self {
        self.additive_order = order;
        self
    }

    pub fn transpose(&self) -> bool {
        self.transpose
    }

    pub fn additive_order(&self) -> LevelOrder {
        self.additive_order
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    pub fn into_stats(self) -> CycleStats {
        self.stats
    }

    /// Clear counters, keep the mode flags
    pub fn reset(&mut self) {
        let num_levels = self.stats.levels.len();
        self.stats = CycleStats {
            levels: vec![LevelStats::default(); num_levels],
            ..CycleStats::default()
        };
    }

    pub(crate) fn level_mut(&mut self, level: usize) -> &mut LevelStats {
        if level >= self.stats.levels.len() {
            self.stats.levels.resize(level + 1, LevelStats::default());
        }
        &mut self.stats.levels[level]
    }

    pub(crate) fn record_coarse_solve(&mut self) {
        self.stats.coarse_solves += 1;
        self.level_mut(0).visits += 1;
    }

    pub(crate) fn record_depth(&mut self, depth: usize) {
        self.stats.max_stack_depth = self.stats.max_stack_depth.max(depth);
    }

    pub(crate) fn finish_cycle(&mut self, started: Instant) {
        self.stats.cycles += 1;
        self.stats.elapsed += started.elapsed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_flags() {
        let mut ctx = CycleContext::new(3)
            .with_transpose(true)
            .with_additive_order(LevelOrder::FineToCoarse);
        ctx.record_coarse_solve();
        ctx.level_mut(2).pre_smooth_sweeps += 4;
        ctx.record_depth(5);
        assert_eq!(ctx.stats().total_sweeps(), 4);

        ctx.reset();
        assert!(ctx.transpose());
        assert_eq!(ctx.additive_order(), LevelOrder::FineToCoarse);
        assert_eq!(ctx.stats().coarse_solves, 0);
        assert_eq!(ctx.stats().max_stack_depth, 0);
        assert_eq!(ctx.stats().levels.len(), 3);
    }
}
