//! Direct coarse solve through a cached LU factorization

use super::{CoarseSolver, check_len};
use crate::direct::{LuError, LuFactorization, lu_factorize};
use crate::error::CoarseSolveError;
use crate::sparse::CsrMatrix;
use crate::traits::ComplexField;
use crate::vector::all_finite;
use ndarray::{Array1, Array2};

impl From<LuError> for CoarseSolveError {
    fn from(err: LuError) -> Self {
        match err {
            LuError::SingularMatrix => CoarseSolveError::Singular,
            LuError::DimensionMismatch { expected, got } => {
                CoarseSolveError::DimensionMismatch { expected, got }
            }
        }
    }
}

/// Dense LU of the coarsest operator
///
/// The factorization happens at construction, so a singular coarse operator
/// is reported while the hierarchy is assembled rather than mid-cycle.
#[derive(Debug, Clone)]
pub struct DirectCoarseSolver<T: ComplexField> {
    factorization: LuFactorization<T>,
}

impl<T: ComplexField> DirectCoarseSolver<T> {
    pub fn from_dense(matrix: &Array2<T>) -> Result<Self, CoarseSolveError> {
        Ok(Self {
            factorization: lu_factorize(matrix)?,
        })
    }

    pub fn from_csr(matrix: &CsrMatrix<T>) -> Result<Self, CoarseSolveError> {
        Self::from_dense(&matrix.to_dense())
    }

    fn finish(x: Array1<T>) -> Result<Array1<T>, CoarseSolveError> {
        if all_finite(&x) {
            Ok(x)
        } else {
            Err(CoarseSolveError::NonFinite)
        }
    }
}

impl<T: ComplexField> CoarseSolver<T> for DirectCoarseSolver<T> {
    fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError> {
        check_len(self.factorization.n, b)?;
        Self::finish(self.factorization.solve(b)?)
    }

    fn solve_transpose(&self, b: &Array1<T>) -> Result<Array1<T>, CoarseSolveError> {
        check_len(self.factorization.n, b)?;
        Self::finish(self.factorization.solve_transpose(b)?)
    }

    fn size(&self) -> usize {
        self.factorization.n
    }

    fn name(&self) -> &'static str {
        "lu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_direct_solves_both_orientations() {
        let a = array![[3.0_f64, 1.0], [-1.0, 2.0]];
        let solver = DirectCoarseSolver::from_dense(&a).expect("factorization");
        let b = array![5.0, 3.0];

        let x = solver.solve(&b).expect("solve");
        let xt = solver.solve_transpose(&b).expect("solve");

        let ax = a.dot(&x);
        let atx = a.t().dot(&xt);
        for i in 0..2 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-12);
            assert_relative_eq!(atx[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_singular_coarse_operator() {
        let a = CsrMatrix::from_dense(&array![[1.0_f64, 1.0], [1.0, 1.0]], 0.0);
        let err = DirectCoarseSolver::from_csr(&a).unwrap_err();
        assert_eq!(err, CoarseSolveError::Singular);
    }

    #[test]
    fn test_wrong_rhs_length() {
        let solver = DirectCoarseSolver::from_dense(&array![[2.0_f64]]).expect("factorization");
        let err = solver.solve(&array![1.0, 1.0]).unwrap_err();
        assert_eq!(err, CoarseSolveError::DimensionMismatch { expected: 1, got: 2 });
    }
}
