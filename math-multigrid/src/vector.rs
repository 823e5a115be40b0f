//! Vector kernels used by the cycle engine
//!
//! Inner products, norms, `axpy` and the residual `r = b - A x`. These are the
//! only vector operations the scheduler and the convergence monitor rely on.

use crate::traits::{ComplexField, LinearOperator};
use ndarray::Array1;
use num_traits::{Float, Zero};

/// Compute inner product (x, y) = Σ conj(x_i) * y_i
#[inline]
pub fn inner_product<T: ComplexField>(x: &Array1<T>, y: &Array1<T>) -> T {
    assert_eq!(
        x.len(),
        y.len(),
        "Vector lengths must match for inner product"
    );
    let mut sum = T::zero();
    for (xi, yi) in x.iter().zip(y.iter()) {
        sum += xi.conj() * *yi;
    }
    sum
}

/// Compute vector 2-norm: ||x||_2 = sqrt(Σ |x_i|^2)
#[inline]
pub fn vector_norm<T: ComplexField>(x: &Array1<T>) -> T::Real {
    vector_norm_sqr(x).sqrt()
}

/// Compute vector norm squared: ||x||_2^2 = Σ |x_i|^2
#[inline]
pub fn vector_norm_sqr<T: ComplexField>(x: &Array1<T>) -> T::Real {
    let mut sum = T::Real::zero();
    for xi in x.iter() {
        sum += xi.norm_sqr();
    }
    sum
}

/// Compute axpy: y = α * x + y
#[inline]
pub fn axpy<T: ComplexField>(alpha: T, x: &Array1<T>, y: &mut Array1<T>) {
    assert_eq!(x.len(), y.len(), "Vector lengths must match for axpy");
    for (xi, yi) in x.iter().zip(y.iter_mut()) {
        *yi += alpha * *xi;
    }
}

/// True when no entry is NaN or infinite
#[inline]
pub fn all_finite<T: ComplexField>(x: &Array1<T>) -> bool {
    x.iter().all(|v| v.is_finite())
}

/// Residual `r = b - op(A) x` written into `r`.
///
/// `op(A)` is `A` or `A^T` depending on `transpose`. Exactly one product and
/// one subtraction per entry.
pub fn residual_into<T, A>(
    operator: &A,
    x: &Array1<T>,
    b: &Array1<T>,
    r: &mut Array1<T>,
    transpose: bool,
) where
    T: ComplexField,
    A: LinearOperator<T> + ?Sized,
{
    let ax = if transpose {
        operator.apply_transpose(x)
    } else {
        operator.apply(x)
    };
    for ((ri, &bi), &axi) in r.iter_mut().zip(b.iter()).zip(ax.iter()) {
        *ri = bi - axi;
    }
}

/// Residual `r = b - A x` as a new vector
pub fn residual<T, A>(operator: &A, x: &Array1<T>, b: &Array1<T>) -> Array1<T>
where
    T: ComplexField,
    A: LinearOperator<T> + ?Sized,
{
    let mut r = Array1::from_elem(b.len(), T::zero());
    residual_into(operator, x, b, &mut r, false);
    r
}

/// Residual norm ||b - A x||_2
pub fn residual_norm<T, A>(operator: &A, x: &Array1<T>, b: &Array1<T>) -> T::Real
where
    T: ComplexField,
    A: LinearOperator<T> + ?Sized,
{
    vector_norm(&residual(operator, x, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::CsrMatrix;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    #[test]
    fn test_inner_product_complex() {
        let x = array![Complex64::new(1.0, 2.0), Complex64::new(3.0, 4.0)];
        let y = array![Complex64::new(5.0, 6.0), Complex64::new(7.0, 8.0)];

        let ip = inner_product(&x, &y);
        assert_relative_eq!(ip.re, 70.0, epsilon = 1e-10);
        assert_relative_eq!(ip.im, -8.0, epsilon = 1e-10);
    }

    #[test]
    fn test_vector_norm_complex() {
        let x = array![Complex64::new(3.0, 0.0), Complex64::new(0.0, 4.0)];
        assert_relative_eq!(vector_norm(&x), 5.0, epsilon = 1e-10);
    }

    #[test]
    fn test_axpy() {
        let x = array![1.0_f64, 2.0, 3.0];
        let mut y = array![1.0_f64, 1.0, 1.0];

        axpy(2.0, &x, &mut y);

        assert_relative_eq!(y[0], 3.0);
        assert_relative_eq!(y[1], 5.0);
        assert_relative_eq!(y[2], 7.0);
    }

    #[test]
    fn test_residual_plain_and_transposed() {
        let a = CsrMatrix::from_dense(&array![[2.0_f64, 1.0], [0.0, 3.0]], 0.0);
        let x = array![1.0, 1.0];
        let b = array![4.0, 4.0];

        let r = residual(&a, &x, &b);
        assert_relative_eq!(r[0], 1.0);
        assert_relative_eq!(r[1], 1.0);

        let mut rt = Array1::zeros(2);
        residual_into(&a, &x, &b, &mut rt, true);
        // A^T x = [2, 4]
        assert_relative_eq!(rt[0], 2.0);
        assert_relative_eq!(rt[1], 0.0);

        assert_relative_eq!(residual_norm(&a, &x, &b), 2.0_f64.sqrt());
    }

    #[test]
    fn test_all_finite() {
        assert!(all_finite(&array![1.0_f64, -2.0]));
        assert!(!all_finite(&array![1.0_f64, f64::NAN]));
    }
}
