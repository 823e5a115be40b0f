//! Transfer operators between adjacent levels
//!
//! A [`TransferOperator`] belongs to the finer of two adjacent levels and holds
//! both directions: restriction `R` (fine → coarse) and interpolation `P`
//! (coarse → fine). Transpose cycles swap their roles, restricting with `Pᵀ`
//! and interpolating with `Rᵀ`.
//!
//! The 1D builders assume interior unknowns of a Dirichlet problem, where a
//! coarse grid with `n` points refines to `2n + 1` fine points.

use crate::sparse::CsrMatrix;
use crate::traits::{ComplexField, LinearOperator};
use ndarray::Array1;
use std::sync::Arc;

/// Which way a vector moves through the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// Fine → coarse
    Restrict,
    /// Coarse → fine
    Interpolate,
}

/// Restriction and interpolation between a level and the next coarser one
#[derive(Clone)]
pub struct TransferOperator<T: ComplexField> {
    restriction: Arc<dyn LinearOperator<T>>,
    interpolation: Arc<dyn LinearOperator<T>>,
}

impl<T: ComplexField> std::fmt::Debug for TransferOperator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferOperator")
            .field("fine_size", &self.fine_size())
            .field("coarse_size", &self.coarse_size())
            .finish()
    }
}

impl<T: ComplexField> TransferOperator<T> {
    /// Pair an arbitrary restriction with an arbitrary interpolation
    pub fn new(
        restriction: Arc<dyn LinearOperator<T>>,
        interpolation: Arc<dyn LinearOperator<T>>,
    ) -> Self {
        Self {
            restriction,
            interpolation,
        }
    }

    /// Variational pair `R = Pᵀ`
    pub fn galerkin(interpolation: CsrMatrix<T>) -> Self {
        let restriction = interpolation.transpose();
        Self {
            restriction: Arc::new(restriction),
            interpolation: Arc::new(interpolation),
        }
    }

    /// Pair two assembled matrices
    pub fn from_csr(restriction: CsrMatrix<T>, interpolation: CsrMatrix<T>) -> Self {
        Self {
            restriction: Arc::new(restriction),
            interpolation: Arc::new(interpolation),
        }
    }

    pub fn restriction(&self) -> &Arc<dyn LinearOperator<T>> {
        &self.restriction
    }

    pub fn interpolation(&self) -> &Arc<dyn LinearOperator<T>> {
        &self.interpolation
    }

    /// Length of vectors on the finer level
    pub fn fine_size(&self) -> usize {
        self.restriction.num_cols()
    }

    /// Length of vectors on the coarser level
    pub fn coarse_size(&self) -> usize {
        self.restriction.num_rows()
    }

    /// Move `v` one level in `direction`
    ///
    /// With `transpose` set the adjoint of the other direction is used:
    /// restriction becomes `Pᵀ v` and interpolation becomes `Rᵀ v`.
    pub fn apply(&self, direction: TransferDirection, v: &Array1<T>, transpose: bool) -> Array1<T> {
        match (direction, transpose) {
            (TransferDirection::Restrict, false) => self.restriction.apply(v),
            (TransferDirection::Restrict, true) => self.interpolation.apply_transpose(v),
            (TransferDirection::Interpolate, false) => self.interpolation.apply(v),
            (TransferDirection::Interpolate, true) => self.restriction.apply_transpose(v),
        }
    }

    /// First shape mismatch against the expected fine and coarse sizes, as
    /// `(context, expected, got)`
    pub(crate) fn shape_mismatch(
        &self,
        fine: usize,
        coarse: usize,
    ) -> Option<(&'static str, usize, usize)> {
        let checks = [
            ("restriction input", fine, self.restriction.num_cols()),
            ("restriction output", coarse, self.restriction.num_rows()),
            ("interpolation input", coarse, self.interpolation.num_cols()),
            ("interpolation output", fine, self.interpolation.num_rows()),
        ];
        checks
            .into_iter()
            .find(|&(_, expected, got)| expected != got)
    }
}

fn weight<T: ComplexField>(w: f64) -> T {
    T::from_real(T::real_from_f64(w))
}

/// Linear interpolation from `n_coarse` to `2 n_coarse + 1` interior points
///
/// Fine point `2i + 1` coincides with coarse point `i`; even fine points take
/// the average of their coarse neighbours (boundary values are zero).
pub fn linear_interpolation_1d<T: ComplexField>(n_coarse: usize) -> CsrMatrix<T> {
    let n_fine = 2 * n_coarse + 1;
    let mut triplets = Vec::with_capacity(3 * n_coarse);
    for i in 0..n_coarse {
        let fine = 2 * i + 1;
        triplets.push((fine - 1, i, weight(0.5)));
        triplets.push((fine, i, T::one()));
        triplets.push((fine + 1, i, weight(0.5)));
    }
    CsrMatrix::from_triplets(n_fine, n_coarse, triplets)
}

/// Full weighting `(1/4, 1/2, 1/4)` from `2 n_coarse + 1` to `n_coarse` points
///
/// Equal to half the transpose of [`linear_interpolation_1d`].
pub fn full_weighting_1d<T: ComplexField>(n_coarse: usize) -> CsrMatrix<T> {
    let n_fine = 2 * n_coarse + 1;
    let mut triplets = Vec::with_capacity(3 * n_coarse);
    for i in 0..n_coarse {
        let fine = 2 * i + 1;
        triplets.push((i, fine - 1, weight(0.25)));
        triplets.push((i, fine, weight(0.5)));
        triplets.push((i, fine + 1, weight(0.25)));
    }
    CsrMatrix::from_triplets(n_coarse, n_fine, triplets)
}

/// Injection: coarse point `i` takes the value of fine point `2i + 1`
pub fn injection_1d<T: ComplexField>(n_coarse: usize) -> CsrMatrix<T> {
    let n_fine = 2 * n_coarse + 1;
    let triplets = (0..n_coarse).map(|i| (i, 2 * i + 1, T::one())).collect();
    CsrMatrix::from_triplets(n_coarse, n_fine, triplets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_linear_interpolation_1d() {
        let p = linear_interpolation_1d::<f64>(2);
        assert_eq!((p.num_rows, p.num_cols), (5, 2));

        let fine = p.matvec(&array![2.0, 4.0]);
        let expected = [1.0, 2.0, 3.0, 4.0, 2.0];
        for (got, want) in fine.iter().zip(expected) {
            assert_relative_eq!(*got, want);
        }
    }

    #[test]
    fn test_full_weighting_is_scaled_transpose() {
        let p = linear_interpolation_1d::<f64>(3).to_dense();
        let r = full_weighting_1d::<f64>(3).to_dense();
        for i in 0..3 {
            for j in 0..7 {
                assert_relative_eq!(r[[i, j]], 0.5 * p[[j, i]]);
            }
        }
    }

    #[test]
    fn test_injection_1d() {
        let r = injection_1d::<f64>(3);
        let coarse = r.matvec(&array![0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        assert_eq!(coarse, array![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_transpose_swaps_roles() {
        let transfer = TransferOperator::from_csr(injection_1d::<f64>(1), linear_interpolation_1d(1));
        let fine = array![1.0, 2.0, 4.0];

        // Pᵀ v = 0.5 * 1 + 2 + 0.5 * 4
        let restricted = transfer.apply(TransferDirection::Restrict, &fine, true);
        assert_relative_eq!(restricted[0], 4.5);

        // Rᵀ v places the coarse value at the injected point only
        let lifted = transfer.apply(TransferDirection::Interpolate, &array![3.0], true);
        assert_eq!(lifted, array![0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_shape_mismatch_reports_first_offender() {
        let transfer = TransferOperator::galerkin(linear_interpolation_1d::<f64>(3));
        assert_eq!(transfer.shape_mismatch(7, 3), None);
        assert_eq!(
            transfer.shape_mismatch(5, 3),
            Some(("restriction input", 5, 7))
        );
    }
}
