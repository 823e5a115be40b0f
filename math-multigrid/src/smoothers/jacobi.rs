//! Damped Jacobi smoother
//!
//! `x = x + ω D^{-1} (b - A x)`. The diagonal is captured once from the
//! assembled matrix; the product itself goes through the level operator, so
//! the smoother also works on matrix-free or distributed operators. `A` and
//! `A^T` share their diagonal, which makes the adjoint sweep the same update
//! with the transposed product.

use super::{Smoother, check_dims, check_finite};
use crate::error::SmootherError;
use crate::sparse::CsrMatrix;
use crate::traits::{ComplexField, LinearOperator};
use ndarray::Array1;

/// Damped Jacobi smoother
#[derive(Debug, Clone)]
pub struct JacobiSmoother<T: ComplexField> {
    /// Inverse diagonal elements
    inv_diag: Array1<T>,
    /// Damping factor ω
    omega: T,
}

impl<T: ComplexField> JacobiSmoother<T> {
    /// Create from a CSR matrix with damping `omega` (2/3 is the classical
    /// choice for Laplacians)
    pub fn from_csr(matrix: &CsrMatrix<T>, omega: f64) -> Self {
        Self::from_diagonal(&matrix.diagonal(), omega)
    }

    /// Create from a diagonal vector directly
    ///
    /// Zero diagonal entries are treated as 1 so the corresponding unknowns
    /// are relaxed by the plain residual.
    pub fn from_diagonal(diag: &Array1<T>, omega: f64) -> Self {
        let tiny = T::real_from_f64(1e-30);
        let inv_diag = diag.mapv(|d| if d.norm() > tiny { d.inv() } else { T::one() });
        Self {
            inv_diag,
            omega: T::from_real(T::real_from_f64(omega)),
        }
    }

    fn sweep(
        &self,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
        transpose: bool,
    ) -> Result<(), SmootherError> {
        check_dims(self.inv_diag.len(), b, x)?;

        for sweep in 0..sweeps {
            let ax = if transpose {
                operator.apply_transpose(x)
            } else {
                operator.apply(x)
            };
            for i in 0..x.len() {
                x[i] += self.omega * self.inv_diag[i] * (b[i] - ax[i]);
            }
            check_finite(x, sweep)?;
        }
        Ok(())
    }
}

impl<T: ComplexField> Smoother<T> for JacobiSmoother<T> {
    fn relax(
        &self,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
    ) -> Result<(), SmootherError> {
        self.sweep(operator, b, x, sweeps, false)
    }

    fn relax_transpose(
        &self,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
    ) -> Result<(), SmootherError> {
        self.sweep(operator, b, x, sweeps, true)
    }

    fn name(&self) -> &'static str {
        "jacobi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::residual_norm;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    fn laplacian_1d(n: usize) -> CsrMatrix<f64> {
        let mut triplets = Vec::new();
        for i in 0..n {
            triplets.push((i, i, 2.0));
            if i > 0 {
                triplets.push((i, i - 1, -1.0));
            }
            if i + 1 < n {
                triplets.push((i, i + 1, -1.0));
            }
        }
        CsrMatrix::from_triplets(n, n, triplets)
    }

    #[test]
    fn test_jacobi_reduces_residual() {
        let a = laplacian_1d(16);
        let b = Array1::from_elem(16, 1.0);
        let mut x = Array1::zeros(16);
        let smoother = JacobiSmoother::from_csr(&a, 2.0 / 3.0);

        let before = residual_norm(&a, &x, &b);
        smoother.relax(&a, &b, &mut x, 5).expect("relax should succeed");
        let after = residual_norm(&a, &x, &b);

        assert!(after < before, "Jacobi should reduce residual: {before} -> {after}");
    }

    #[test]
    fn test_undamped_jacobi_solves_diagonal_system() {
        let diag = array![Complex64::new(2.0, 0.0), Complex64::new(0.0, 4.0)];
        let a = CsrMatrix::from_diagonal(&diag);
        let b = array![Complex64::new(2.0, 0.0), Complex64::new(8.0, 0.0)];
        let mut x = Array1::from_elem(2, Complex64::new(0.0, 0.0));

        JacobiSmoother::from_csr(&a, 1.0)
            .relax(&a, &b, &mut x, 1)
            .expect("relax should succeed");

        assert_relative_eq!(x[0].re, 1.0, epsilon = 1e-14);
        assert_relative_eq!(x[1].im, -2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_jacobi_rejects_non_finite_iterate() {
        let a = laplacian_1d(3);
        let b = array![1.0, f64::NAN, 0.0];
        let mut x = Array1::zeros(3);

        let err = JacobiSmoother::from_csr(&a, 0.5)
            .relax(&a, &b, &mut x, 2)
            .unwrap_err();
        assert_eq!(err, SmootherError::NonFinite { sweep: 0 });
    }

    #[test]
    fn test_jacobi_dimension_check() {
        let a = laplacian_1d(3);
        let mut x = Array1::zeros(4);

        let err = JacobiSmoother::from_csr(&a, 0.5)
            .relax(&a, &Array1::zeros(3), &mut x, 1)
            .unwrap_err();
        assert_eq!(err, SmootherError::DimensionMismatch { expected: 3, got: 4 });
    }
}
