//! Coarsest-level solvers
//!
//! The cycle engine asks for `x_0 = solve(b_0)` (or the transposed solve)
//! whenever it reaches level 0. Anything that approximately inverts the
//! coarsest operator qualifies:
//!
//! - [`DirectCoarseSolver`]: dense LU, factorized once
//! - [`CgCoarseSolver`]: conjugate gradients on the level operator
//! - [`SmoothingCoarseSolver`]: a fixed number of sweeps of any
//!   [`Smoother`](crate::smoothers::Smoother)

mod direct;
mod iterative;

pub use direct::DirectCoarseSolver;
pub use iterative::{CgCoarseSolver, SmoothingCoarseSolver};

use crate::error::CoarseSolveError;
use crate::traits::ComplexField;
use ndarray::Array1;

/// Solver for the coarsest level
pub trait CoarseSolver<T: ComplexField>: Send + Sync {
    /// Approximate `A_0^{-1} b`
    fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError>;

    /// Approximate `A_0^{-T} b`
    fn solve_transpose(&self, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError>;

    /// Size of the coarse system
    fn size(&self) -> usize;

    fn name(&self) -> &'static str;
}

pub(crate) fn check_len<T: ComplexField>(
    expected: usize,
    b: &Array1<T>,
) -> Result<(), CoarseSolveError> {
    if b.len() != expected {
        return Err(CoarseSolveError::DimensionMismatch {
            expected,
            got: b.len(),
        });
    }
    Ok(())
}
