//! Direct solvers for the coarsest level
//!
//! Dense LU factorization with partial pivoting; coarse systems are small
//! enough that a dense factorization is the accurate, cheap choice.

mod lu;

pub use lu::{LuError, LuFactorization, lu_factorize, lu_solve};
