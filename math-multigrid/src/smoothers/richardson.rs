//! Richardson smoother: `x = x + ω (b - A x)`
//!
//! Needs nothing but products with the operator, so it is the fallback for
//! operators that expose no diagonal.

use super::{Smoother, check_dims, check_finite};
use crate::error::SmootherError;
use crate::traits::{ComplexField, LinearOperator};
use ndarray::Array1;

/// Richardson iteration with a fixed step
#[derive(Debug, Clone, Copy)]
pub struct RichardsonSmoother<T: ComplexField> {
    omega: T,
}

impl<T: ComplexField> RichardsonSmoother<T> {
    /// Step `omega`; convergent for SPD `A` when `0 < ω < 2 / λ_max`
    pub fn new(omega: f64) -> Self {
        Self {
            omega: T::from_real(T::real_from_f64(omega)),
        }
    }
}

impl<T: ComplexField> RichardsonSmoother<T> {
    fn sweep(
        &self,
        operator: &dyn LinearOperator<T>,
        b: &Array1<T>,
        x: &mut Array1<T>,
        sweeps: usize,
        transpose: bool,
    ) -> Result<(), SmootherError> {
        check_dims(operator.num_rows(), b, x)?;
        for sweep in 0..sweeps {
            let ax = if transpose {
                operator.apply_transpose(x)
            } else {
                operator.apply(x)
            };
            x.zip_mut_with(b, |xi, &bi| *xi += self.omega * bi);
            x.zip_mut_with(&ax, |xi, &axi| *xi -= self.omega * axi);
            check_finite(x, sweep)?;
        }
        Ok(())
    }
}

impl<T: ComplexField> Smoother<T> for RichardsonSmoother<T> {
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
        "richardson"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::CsrMatrix;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_richardson_transpose_uses_adjoint() {
        let a = CsrMatrix::from_dense(&array![[1.0_f64, 1.0], [0.0, 1.0]], 0.0);
        let b = array![0.0, 0.0];
        let smoother = RichardsonSmoother::new(1.0);

        let mut x = array![1.0, 1.0];
        smoother.relax(&a, &b, &mut x, 1).expect("relax should succeed");
        // x - A x = [1, 1] - [2, 1]
        assert_relative_eq!(x[0], -1.0);
        assert_relative_eq!(x[1], 0.0);

        let mut xt = array![1.0, 1.0];
        smoother
            .relax_transpose(&a, &b, &mut xt, 1)
            .expect("relax should succeed");
        // x - A^T x = [1, 1] - [1, 2]
        assert_relative_eq!(xt[0], 0.0);
        assert_relative_eq!(xt[1], -1.0);
    }

    #[test]
    fn test_richardson_blows_up_with_large_step() {
        let a = CsrMatrix::from_diagonal(&array![1.0e200_f64]);
        let mut x = array![1.0e200];

        let err = RichardsonSmoother::new(10.0)
            .relax(&a, &array![0.0], &mut x, 3)
            .unwrap_err();
        assert_eq!(err, SmootherError::NonFinite { sweep: 0 });
    }
}
