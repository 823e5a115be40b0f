//! LU decomposition solver
//!
//! LU factorization with partial pivoting for the small dense systems found on
//! the coarsest multigrid level. The factors serve both `A x = b` and
//! `A^T x = b`, so transpose cycles do not need a second factorization.

use crate::traits::ComplexField;
use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors that can occur during LU factorization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("Matrix is singular or nearly singular")]
    SingularMatrix,
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// LU factorization result
///
/// `P A = L U` with `L` unit lower triangular (stored below the diagonal of
/// `lu`) and `U` upper triangular. Row `i` of `P A` is row `perm[i]` of `A`.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    /// Combined L and U factors
    pub lu: Array2<T>,
    /// Row permutation
    pub perm: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl<T: ComplexField> LuFactorization<T> {
    fn check_len(&self, b: &Array1<T>) -> Result<(), LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }
        Ok(())
    }

    /// Solve Ax = b using the pre-computed factors
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        self.check_len(b)?;
        let n = self.n;

        // Forward substitution: L y = P b
        let mut x = Array1::from_iter(self.perm.iter().map(|&p| b[p]));
        for i in 0..n {
            for j in 0..i {
                let l_ij = self.lu[[i, j]];
                x[i] = x[i] - l_ij * x[j];
            }
        }

        // Backward substitution: U x = y
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                let u_ij = self.lu[[i, j]];
                x[i] = x[i] - u_ij * x[j];
            }
            x[i] *= self.lu[[i, i]].inv();
        }

        Ok(x)
    }

    /// Solve A^T x = b using the same factors
    ///
    /// `A^T = U^T L^T P`, so solve `U^T z = b`, then `L^T w = z`, then scatter
    /// `x[perm[i]] = w[i]`.
    pub fn solve_transpose(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        self.check_len(b)?;
        let n = self.n;

        let mut w = b.clone();
        for i in 0..n {
            for j in 0..i {
                let u_ji = self.lu[[j, i]];
                w[i] = w[i] - u_ji * w[j];
            }
            w[i] *= self.lu[[i, i]].inv();
        }

        for i in (0..n).rev() {
            for j in (i + 1)..n {
                let l_ji = self.lu[[j, i]];
                w[i] = w[i] - l_ji * w[j];
            }
        }

        let mut x = Array1::from_elem(n, T::zero());
        for (i, &p) in self.perm.iter().enumerate() {
            x[p] = w[i];
        }
        Ok(x)
    }
}

/// Compute LU factorization with partial pivoting
pub fn lu_factorize<T: ComplexField>(a: &Array2<T>) -> Result<LuFactorization<T>, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let tiny = T::real_from_f64(1e-30);
    let mut lu = a.clone();
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        // Find pivot
        let mut max_val = lu[[k, k]].norm();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = lu[[i, k]].norm();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if !(max_val >= tiny) {
            return Err(LuError::SingularMatrix);
        }

        if max_row != k {
            for j in 0..n {
                lu.swap([k, j], [max_row, j]);
            }
            perm.swap(k, max_row);
        }

        // Compute multipliers and eliminate
        let pivot_inv = lu[[k, k]].inv();
        for i in (k + 1)..n {
            let mult = lu[[i, k]] * pivot_inv;
            lu[[i, k]] = mult;
            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, perm, n })
}

/// Solve Ax = b using LU decomposition
///
/// This is a convenience function that combines factorization and solve.
pub fn lu_solve<T: ComplexField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    lu_factorize(a)?.solve(b)
}
