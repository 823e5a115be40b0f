//! Iterative solvers for linear systems
//!
//! - [`cg`]: Conjugate Gradient - for symmetric positive definite coarse systems

mod cg;

pub use cg::{CgConfig, CgSolution, cg};
