//! Iterative coarse solvers for operators that should not be factorized

use super::{CoarseSolver, check_len};
use crate::error::{CoarseSolveError, SmootherError};
use crate::iterative::{CgConfig, cg};
use crate::smoothers::Smoother;
use crate::traits::{ComplexField, LinearOperator, Transposed};
use crate::vector::all_finite;
use ndarray::Array1;
use num_traits::ToPrimitive;
use std::sync::Arc;

/// Conjugate gradients on the coarsest operator, from a zero initial guess
///
/// Only meaningful for symmetric (Hermitian) positive definite coarse
/// operators. Failing to reach the tolerance is an error, not a silent
/// approximation.
pub struct CgCoarseSolver<T: ComplexField> {
    operator: Arc<dyn LinearOperator<T>>,
    config: CgConfig<T::Real>,
}

impl<T: ComplexField> CgCoarseSolver<T> {
    pub fn new(operator: Arc<dyn LinearOperator<T>>, max_iterations: usize, tolerance: f64) -> Self {
        Self {
            operator,
            config: CgConfig {
                max_iterations,
                tolerance: T::real_from_f64(tolerance),
                print_interval: 0,
            },
        }
    }

    fn run<A>(&self, operator: &A, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError>
    where
        A: LinearOperator<T> + ?Sized,
    {
        check_len(self.operator.num_rows(), b)?;
        let solution = cg(operator, b, &self.config);
        if !solution.converged {
            return Err(CoarseSolveError::NotConverged {
                iterations: solution.iterations,
                residual: solution.residual.to_f64().unwrap_or(f64::NAN),
            });
        }
        if !all_finite(&solution.x) {
            return Err(CoarseSolveError::NonFinite);
        }
        Ok(solution.x)
    }
}

impl<T: ComplexField> CoarseSolver<T> for CgCoarseSolver<T> {
    fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError> {
        self.run(self.operator.as_ref(), b)
    }

    fn solve_transpose(&self, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError> {
        self.run(&Transposed::new(self.operator.as_ref()), b)
    }

    fn size(&self) -> usize {
        self.operator.num_rows()
    }

    fn name(&self) -> &'static str {
        "cg"
    }
}

/// Coarse "solve" by a fixed number of smoothing sweeps from zero
///
/// Cheap and inexact. Useful when the coarsest grid is still too large to
/// factorize and the smoother alone damps its error well enough.
pub struct SmoothingCoarseSolver<T: ComplexField> {
    operator: Arc<dyn LinearOperator<T>>,
    smoother: Arc<dyn Smoother<T>>,
    sweeps: usize,
}

impl<T: ComplexField> SmoothingCoarseSolver<T> {
    pub fn new(
        operator: Arc<dyn LinearOperator<T>>,
        smoother: Arc<dyn Smoother<T>>,
        sweeps: usize,
    ) -> Self {
        Self {
            operator,
            smoother,
            sweeps,
        }
    }

    fn run(&self, b: &Array1<T>, transpose: bool) -> Result<Array1<T>, CoarseSolveError> {
        check_len(self.operator.num_rows(), b)?;
        let mut x = Array1::from_elem(b.len(), T::zero());
        let op = self.operator.as_ref();
        let outcome = if transpose {
            self.smoother.relax_transpose(op, b, &mut x, self.sweeps)
        } else {
            self.smoother.relax(op, b, &mut x, self.sweeps)
        };
        outcome.map_err(|err| match err {
            SmootherError::NonFinite { .. } => CoarseSolveError::NonFinite,
            SmootherError::DimensionMismatch { expected, got } => {
                CoarseSolveError::DimensionMismatch { expected, got }
            }
        })?;
        Ok(x)
    }
}

impl<T: ComplexField> CoarseSolver<T> for SmoothingCoarseSolver<T> {
    fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError> {
        self.run(b, false)
    }

    fn solve_transpose(&self, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError> {
        self.run(b, true)
    }

    fn size(&self) -> usize {
        self.operator.num_rows()
    }

    fn name(&self) -> &'static str {
        "smoothing"
    }
}
