//! Gauss-Seidel smoother over an assembled CSR matrix
//!
//! Unlike Jacobi, the sweep needs row access to `A`, so the smoother keeps
//! its own copy of the matrix (and of `A^T` for adjoint sweeps) and ignores
//! the operator handle it is given apart from a size check.
//!
//! The adjoint of a forward sweep on `A` is a backward sweep on `A^T`, and
//! vice versa. A symmetric sweep stays symmetric under transposition.

use super::{Smoother, check_dims, check_finite};
use crate::error::SmootherError;
use crate::sparse::CsrMatrix;
use crate::traits::{ComplexField, LinearOperator};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Sweep ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepDirection {
    #[default]
    Forward,
    Backward,
    /// Forward then backward
    Symmetric,
}

impl SweepDirection {
    fn reversed(self) -> Self {
        match self {
            SweepDirection::Forward => SweepDirection::Backward,
            SweepDirection::Backward => SweepDirection::Forward,
            SweepDirection::Symmetric => SweepDirection::Symmetric,
        }
    }
}

/// Gauss-Seidel smoother
#[derive(Debug, Clone)]
pub struct GaussSeidelSmoother<T: ComplexField> {
    matrix: CsrMatrix<T>,
    matrix_t: CsrMatrix<T>,
    direction: SweepDirection,
}

impl<T: ComplexField> GaussSeidelSmoother<T> {
    pub fn new(matrix: &CsrMatrix<T>, direction: SweepDirection) -> Self {
        Self {
            matrix: matrix.clone(),
            matrix_t: matrix.transpose(),
            direction,
        }
    }

    pub fn direction(&self) -> SweepDirection {
        self.direction
    }

    fn run(
        matrix: &CsrMatrix<T>,
        direction: SweepDirection,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
    ) -> Result<(), SmootherError> {
        if operator.num_rows() != matrix.num_rows {
            return Err(SmootherError::DimensionMismatch {
                expected: matrix.num_rows,
                got: operator.num_rows(),
            });
        }
        check_dims(matrix.num_rows, b, x)?;

        for sweep in 0..sweeps {
            match direction {
                SweepDirection::Forward => sweep_rows(matrix, b, x, false),
                SweepDirection::Backward => sweep_rows(matrix, b, x, true),
                SweepDirection::Symmetric => {
                    sweep_rows(matrix, b, x, false);
                    sweep_rows(matrix, b, x, true);
                }
            }
            check_finite(x, sweep)?;
        }
        Ok(())
    }
}

/// Single in-place sweep; rows with a zero diagonal are left untouched
fn sweep_rows<T: ComplexField>(
    matrix: &CsrMatrix<T>,
    b: &Array1<T>,
    x: &mut Array1<T>,
    backward: bool,
) {
    let n = matrix.num_rows;
    let tiny = T::real_from_f64(1e-15);

    let mut update = |i: usize| {
        let mut diag = T::zero();
        let mut sigma = T::zero();
        for (j, val) in matrix.row_entries(i) {
            if j == i {
                diag += val;
            } else {
                sigma += val * x[j];
            }
        }
        if diag.norm() >= tiny {
            x[i] = (b[i] - sigma) * diag.inv();
        }
    };

    if backward {
        (0..n).rev().for_each(&mut update);
    } else {
        (0..n).for_each(&mut update);
    }
}

impl<T: ComplexField> Smoother<T> for GaussSeidelSmoother<T> {
    fn relax(
        &self,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
    ) -> Result<(), SmootherError> {
        Self::run(&self.matrix, self.direction, operator, b, x, sweeps)
    }

    fn relax_transpose(
        &self,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
    ) -> Result<(), SmootherError> {
        Self::run(
            &self.matrix_t,
            self.direction.reversed(),
            operator,
            b,
            x,
            sweeps,
        )
    }

    fn name(&self) -> &'static str {
        match self.direction {
            SweepDirection::Forward => "gauss-seidel",
            SweepDirection::Backward => "gauss-seidel-backward",
            SweepDirection::Symmetric => "symmetric-gauss-seidel",
        }
    }
}
