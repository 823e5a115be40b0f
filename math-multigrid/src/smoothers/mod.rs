//! Smoothers for multigrid cycles
//!
//! A smoother performs a bounded number of relaxation sweeps on `(A, b, x)`,
//! updating `x` in place. The cycle engine only sees the [`Smoother`] trait;
//! the concrete relaxation is chosen when the hierarchy is built.
//!
//! # Available smoothers
//!
//! - [`JacobiSmoother`]: damped Jacobi, operator-agnostic apart from the stored diagonal
//! - [`RichardsonSmoother`]: `x += ω (b - A x)`, fully matrix-free
//! - [`GaussSeidelSmoother`]: forward or backward sweeps over a CSR matrix

mod gauss_seidel;
mod jacobi;
mod richardson;

pub use gauss_seidel::{GaussSeidelSmoother, SweepDirection};
pub use jacobi::JacobiSmoother;
pub use richardson::RichardsonSmoother;

use crate::error::SmootherError;
use crate::traits::{ComplexField, LinearOperator};
use crate::vector::all_finite;
use ndarray::Array1;

/// Relaxation capability used for pre- and post-smoothing.
///
/// `relax_transpose` must apply the adjoint relaxation (the smoother of
/// `A^T`); it is what transpose cycles call.
pub trait Smoother<T: ComplexField>: Send + Sync {
    /// Run `sweeps` relaxation steps of `A x = b`, updating `x` in place
    fn relax(
        &self,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
    ) -> Result<(), SmootherError>;

    /// Run `sweeps` relaxation steps of `A^T x = b`
    fn relax_transpose(
        &self,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
    ) -> Result<(), SmootherError>;

    /// Short name used in log output
    fn name(&self) -> &'static str;
}

/// Reject vectors that do not match the operator size
pub(crate) fn check_dims<T: ComplexField>(
    expected: usize,
    b: &Array1<T>,
    x: &Array1<T>,
) -> Result<(), SmootherError> {
    for got in [b.len(), x.len()] {
        if got != expected {
            return Err(SmootherError::DimensionMismatch { expected, got });
        }
    }
    Ok(())
}

/// Fail the sweep when the iterate stopped being a number
#[inline]
pub(crate) fn check_finite<T: ComplexField>(
    x: &Array1<T>,
    sweep: usize,
) -> Result<(), SmootherError> {
    if all_finite(x) {
        Ok(())
    } else {
        Err(SmootherError::NonFinite { sweep })
    }
}
