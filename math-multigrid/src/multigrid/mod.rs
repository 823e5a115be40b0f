//! Multigrid cycle engine
//!
//! Levels are ordered from the coarsest (0) to the finest (L-1). A
//! [`LevelHierarchy`] owns the immutable description, a [`Workspace`] the
//! per-solve vectors and a [`CycleContext`] the per-solve counters; the
//! [`CycleScheduler`] walks the hierarchy and [`MultigridSolver`] repeats
//! cycles until the [`ConvergenceMonitor`] says stop.

mod context;
mod cycle;
mod hierarchy;
mod level;
mod monitor;
mod solver;
mod transfer;
mod workspace;

pub use context::{CycleContext, CycleStats, LevelOrder, LevelStats};
pub use cycle::CycleScheduler;
pub use hierarchy::{CycleType, HierarchyDiagnostics, LevelHierarchy};
pub use level::Level;
pub use monitor::{ConvergenceMonitor, ConvergenceStatus};
pub use solver::{MultigridSolution, MultigridSolver, Termination};
pub use transfer::{
    TransferDirection, TransferOperator, full_weighting_1d, injection_1d, linear_interpolation_1d,
};
pub use workspace::{LevelVectors, Workspace};
