//! Multigrid cycle engine for sparse linear systems
//!
//! This crate coordinates a hierarchy of discretizations at different
//! resolutions to solve `A x = b` (or `Aᵀ x = b`): smoothing on each level,
//! residual restriction, coarse-level solves and interpolated corrections.
//!
//! # Features
//!
//! - **Cycles**: V, W, F, multiplicative, additive and Kaskade, driven by an
//!   explicit frame stack
//! - **Transpose solves**: adjoint cycles on the same hierarchy
//! - **Pluggable components**: operators, transfers, smoothers and coarse
//!   solvers are trait objects chosen at build time
//! - **Galerkin setup**: coarse operators `Pᵀ A P` from interpolation matrices
//! - **Bundled collaborators**: CSR matrices, Jacobi/Richardson/Gauss-Seidel
//!   smoothers, LU/CG coarse solvers, 1D transfer builders
//! - **Generic Scalar Types**: Works with f64, f32, Complex64, Complex32
//!
//! # Example
//!
//! ```ignore
//! use math_audio_multigrid::{
//!     HierarchyConfig, LevelHierarchy, MultigridConfig, MultigridSolver, linear_interpolation_1d,
//! };
//!
//! let hierarchy = LevelHierarchy::from_galerkin(
//!     fine_matrix,
//!     vec![linear_interpolation_1d(15), linear_interpolation_1d(7)],
//!     &HierarchyConfig::default(),
//! )?;
//! let solver = MultigridSolver::new(hierarchy, MultigridConfig::default())?;
//! let solution = solver.solve(&rhs, None)?;
//! ```

pub mod coarse;
pub mod config;
pub mod direct;
pub mod error;
pub mod iterative;
pub mod multigrid;
pub mod smoothers;
pub mod sparse;
pub mod traits;
pub mod vector;

// Re-export main types
pub use error::{CoarseSolveError, MultigridError, Result, SmootherError};
pub use sparse::CsrMatrix;
pub use traits::{ComplexField, LinearOperator, Transposed};

// Re-export the engine
pub use multigrid::{
    ConvergenceMonitor, ConvergenceStatus, CycleContext, CycleScheduler, CycleStats, CycleType,
    HierarchyDiagnostics, Level, LevelHierarchy, LevelOrder, LevelStats, LevelVectors,
    MultigridSolution, MultigridSolver, Termination, TransferDirection, TransferOperator,
    Workspace, full_weighting_1d, injection_1d, linear_interpolation_1d,
};

// Re-export configuration
pub use config::{
    CoarseSolverKind, HierarchyConfig, MultigridConfig, MultigridSettings, SmootherKind,
};

// Re-export components
pub use coarse::{CgCoarseSolver, CoarseSolver, DirectCoarseSolver, SmoothingCoarseSolver};
pub use direct::{LuError, LuFactorization, lu_factorize, lu_solve};
pub use iterative::{CgConfig, CgSolution, cg};
pub use smoothers::{
    GaussSeidelSmoother, JacobiSmoother, RichardsonSmoother, Smoother, SweepDirection,
};
