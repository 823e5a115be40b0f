//! Core traits for linear algebra operations
//!
//! This module defines the abstractions the multigrid engine is written against:
//! - [`ComplexField`]: Trait for scalar types (complex and real numbers)
//! - [`LinearOperator`]: Trait for matrix-like objects that can perform matrix-vector products
//! - [`Transposed`]: Adapter exposing `A^T` of an existing operator

use ndarray::Array1;
use num_complex::{Complex32, Complex64};
use num_traits::{Float, FromPrimitive, NumAssign, One, ToPrimitive, Zero};
use std::fmt::Debug;
use std::ops::Neg;
use std::sync::Arc;

/// Trait for scalar types that can be used in linear algebra operations.
///
/// This trait abstracts over real and complex number types, providing
/// a unified interface for operations like conjugation, norm computation,
/// and conversion from real values.
///
/// # Implementations
///
/// Provided for:
/// - `f64` (default for most discretized PDE problems)
/// - `f32` (for memory-constrained applications)
/// - `Complex64` (Helmholtz-type problems)
/// - `Complex32`
pub trait ComplexField:
    NumAssign + Clone + Copy + Send + Sync + Debug + Zero + One + Neg<Output = Self> + 'static
{
    /// The real number type underlying this field
    type Real: Float + NumAssign + FromPrimitive + ToPrimitive + Send + Sync + Debug + 'static;

    /// Complex conjugate
    fn conj(&self) -> Self;

    /// Squared magnitude |z|²
    fn norm_sqr(&self) -> Self::Real;

    /// Magnitude |z|
    fn norm(&self) -> Self::Real {
        self.norm_sqr().sqrt()
    }

    /// Create from a real value
    fn from_real(r: Self::Real) -> Self;

    /// Real part
    fn re(&self) -> Self::Real;

    /// Imaginary part
    fn im(&self) -> Self::Real;

    /// Multiplicative inverse (1/z)
    fn inv(&self) -> Self;

    /// Both parts are finite (no NaN, no infinity)
    fn is_finite(&self) -> bool {
        self.re().is_finite() && self.im().is_finite()
    }

    /// Convert an `f64` constant into the real type.
    ///
    /// Values that cannot be represented become NaN, which every comparison
    /// downstream treats as "not satisfied".
    fn real_from_f64(value: f64) -> Self::Real {
        Self::Real::from_f64(value).unwrap_or_else(Self::Real::nan)
    }
}

macro_rules! impl_real_field {
    ($t:ty) => {
        impl ComplexField for $t {
            type Real = $t;

            #[inline]
            fn conj(&self) -> Self {
                *self
            }

            #[inline]
            fn norm_sqr(&self) -> $t {
                *self * *self
            }

            #[inline]
            fn norm(&self) -> $t {
                self.abs()
            }

            #[inline]
            fn from_real(r: $t) -> Self {
                r
            }

            #[inline]
            fn re(&self) -> $t {
                *self
            }

            #[inline]
            fn im(&self) -> $t {
                0.0
            }

            #[inline]
            fn inv(&self) -> Self {
                1.0 / *self
            }
        }
    };
}

macro_rules! impl_complex_field {
    ($t:ty, $r:ty) => {
        impl ComplexField for $t {
            type Real = $r;

            #[inline]
            fn conj(&self) -> Self {
                <$t>::new(self.re, -self.im)
            }

            #[inline]
            fn norm_sqr(&self) -> $r {
                self.re * self.re + self.im * self.im
            }

            #[inline]
            fn from_real(r: $r) -> Self {
                <$t>::new(r, 0.0)
            }

            #[inline]
            fn re(&self) -> $r {
                self.re
            }

            #[inline]
            fn im(&self) -> $r {
                self.im
            }

            #[inline]
            fn inv(&self) -> Self {
                let denom = self.norm_sqr();
                <$t>::new(self.re / denom, -self.im / denom)
            }
        }
    };
}

impl_real_field!(f64);
impl_real_field!(f32);
impl_complex_field!(Complex64, f64);
impl_complex_field!(Complex32, f32);

/// Trait for linear operators (matrices) that can perform matrix-vector products.
///
/// Level operators, restriction and interpolation are all expressed through this
/// trait, so sparse matrices, matrix-free stencils and distributed operators can
/// be mixed freely inside one hierarchy.
pub trait LinearOperator<T: ComplexField>: Send + Sync {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<T>) -> Array1<T>;

    /// Apply the transpose: y = A^T * x
    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T>;

    /// Check if the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}

impl<T: ComplexField, O: LinearOperator<T> + ?Sized> LinearOperator<T> for Arc<O> {
    fn num_rows(&self) -> usize {
        (**self).num_rows()
    }

    fn num_cols(&self) -> usize {
        (**self).num_cols()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        (**self).apply(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        (**self).apply_transpose(x)
    }
}

impl<T: ComplexField, O: LinearOperator<T> + ?Sized> LinearOperator<T> for &O {
    fn num_rows(&self) -> usize {
        (**self).num_rows()
    }

    fn num_cols(&self) -> usize {
        (**self).num_cols()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        (**self).apply(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        (**self).apply_transpose(x)
    }
}

/// View of `A^T` for an operator `A`.
///
/// Dimensions are swapped and the roles of `apply` / `apply_transpose` are
/// exchanged; no data is copied.
#[derive(Debug, Clone)]
pub struct Transposed<O>(pub O);

impl<O> Transposed<O> {
    /// Wrap an operator
    pub fn new(inner: O) -> Self {
        Self(inner)
    }

    /// The wrapped (untransposed) operator
    pub fn inner(&self) -> &O {
        &self.0
    }
}

impl<T: ComplexField, O: LinearOperator<T>> LinearOperator<T> for Transposed<O> {
    fn num_rows(&self) -> usize {
        self.0.num_cols()
    }

    fn num_cols(&self) -> usize {
        self.0.num_rows()
    }

    fn apply(&self, x: &Array1<T>) -> Array1<T> {
        self.0.apply_transpose(x)
    }

    fn apply_transpose(&self, x: &Array1<T>) -> Array1<T> {
        self.0.apply(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::CsrMatrix;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_complex64_field() {
        let z = Complex64::new(3.0, 4.0);
        assert_relative_eq!(z.norm_sqr(), 25.0);
        assert_relative_eq!(z.norm(), 5.0);

        let z_conj = ComplexField::conj(&z);
        assert_relative_eq!(z_conj.re, 3.0);
        assert_relative_eq!(z_conj.im, -4.0);

        let product = z * ComplexField::inv(&z);
        assert_relative_eq!(product.re, 1.0, epsilon = 1e-10);
        assert_relative_eq!(product.im, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_f64_field() {
        let x: f64 = -3.0;
        assert_relative_eq!(ComplexField::norm_sqr(&x), 9.0);
        assert_relative_eq!(ComplexField::norm(&x), 3.0);
        assert_relative_eq!(ComplexField::inv(&x), -1.0 / 3.0);
        assert!(ComplexField::is_finite(&x));
        assert!(!ComplexField::is_finite(&f64::NAN));
        assert!(!ComplexField::is_finite(&Complex64::new(0.0, f64::INFINITY)));
    }

    #[test]
    fn test_transposed_operator() {
        let a = CsrMatrix::from_dense(&array![[1.0_f64, 2.0, 0.0], [0.0, 3.0, 4.0]], 0.0);
        let at = Transposed::new(&a);

        assert_eq!(at.num_rows(), 3);
        assert_eq!(at.num_cols(), 2);

        let y = at.apply(&array![1.0, 1.0]);
        assert_relative_eq!(y[0], 1.0);
        assert_relative_eq!(y[1], 5.0);
        assert_relative_eq!(y[2], 4.0);

        let z = at.apply_transpose(&array![1.0, 1.0, 1.0]);
        assert_relative_eq!(z[0], 3.0);
        assert_relative_eq!(z[1], 7.0);
    }
}
