//! Solve-scoped work vectors
//!
//! Every level owns an `x`, `b` and `r` slot of its operator's length. The
//! hierarchy itself stays immutable, so concurrent solves each bring their own
//! [`Workspace`]; one workspace may be reused for any number of solves.

use crate::error::{MultigridError, Result};
use crate::traits::ComplexField;
use ndarray::Array1;

/// Work vectors of one level
#[derive(Debug, Clone)]
pub struct LevelVectors<T: ComplexField> {
    /// Iterate (correction on coarse levels)
    pub x: Array1<T>,
    /// Right-hand side (restricted residual on coarse levels)
    pub b: Array1<T>,
    /// Residual scratch
    pub r: Array1<T>,
}

impl<T: ComplexField> LevelVectors<T> {
    fn zeros(n: usize) -> Self {
        Self {
            x: Array1::from_elem(n, T::zero()),
            b: Array1::from_elem(n, T::zero()),
            r: Array1::from_elem(n, T::zero()),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Arena of per-level work vectors, indexed like the hierarchy
#[derive(Debug, Clone)]
pub struct Workspace<T: ComplexField> {
    levels: Vec<LevelVectors<T>>,
}

impl<T: ComplexField> Workspace<T> {
    /// Allocate zeroed vectors for the given level sizes (coarsest first)
    pub fn new(sizes: impl IntoIterator<Item = usize>) -> Self {
        Self {
            levels: sizes.into_iter().map(LevelVectors::zeros).collect(),
        }
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.levels.iter().map(LevelVectors::len).collect()
    }

    pub fn level(&self, index: usize) -> Result<&LevelVectors<T>> {
        let len = self.levels.len();
        self.levels
            .get(index)
            .ok_or(MultigridError::IndexOutOfRange { index, len })
    }

    pub fn level_mut(&mut self, index: usize) -> Result<&mut LevelVectors<T>> {
        let len = self.levels.len();
        self.levels
            .get_mut(index)
            .ok_or(MultigridError::IndexOutOfRange { index, len })
    }

    /// Zero every slot
    pub fn reset(&mut self) {
        for level in &mut self.levels {
            level.x.fill(T::zero());
            level.b.fill(T::zero());
            level.r.fill(T::zero());
        }
    }

    /// Check the arena against a hierarchy's level sizes
    pub(crate) fn check_sizes(&self, sizes: impl ExactSizeIterator<Item = usize>) -> Result<()> {
        if sizes.len() != self.levels.len() {
            return Err(MultigridError::DimensionMismatch {
                level: 0,
                context: "workspace level count",
                expected: sizes.len(),
                got: self.levels.len(),
            });
        }
        for (level, (expected, slot)) in sizes.zip(&self.levels).enumerate() {
            if slot.len() != expected {
                return Err(MultigridError::DimensionMismatch {
                    level,
                    context: "workspace vectors",
                    expected,
                    got: slot.len(),
                });
            }
        }
        Ok(())
    }

    /// Disjoint borrows of level `fine - 1` and level `fine`
    pub(crate) fn coarse_fine_mut(
        &mut self,
        fine: usize,
    ) -> (&mut LevelVectors<T>, &mut LevelVectors<T>) {
        let (lower, upper) = self.levels.split_at_mut(fine);
        (&mut lower[fine - 1], &mut upper[0])
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut LevelVectors<T> {
        &mut self.levels[index]
    }

    pub(crate) fn slot(&self, index: usize) -> &LevelVectors<T> {
        &self.levels[index]
    }
}
