//! Residual history and stopping criteria

use num_traits::Float;

/// Outcome of recording one residual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// Keep cycling
    Iterating,
    Converged,
    /// Residual grew past the divergence factor or stopped being finite
    Diverged,
    /// Cycle budget used up without convergence
    Exhausted,
}

/// Append-only residual history with convergence and divergence tests
///
/// Convergence means the latest norm is at most
/// `max(tolerance, relative_tolerance * initial)`. Divergence is judged
/// against the previous norm (the initial one for the first record).
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor<R: Float> {
    history: Vec<R>,
    initial: Option<R>,
    tolerance: R,
    relative_tolerance: R,
    max_cycles: usize,
    divergence_factor: R,
}

impl<R: Float> ConvergenceMonitor<R> {
    /// Absolute tolerance and cycle budget; divergence factor 1e3
    pub fn new(tolerance: R, max_cycles: usize) -> Self {
        Self {
            history: Vec::new(),
            initial: None,
            tolerance,
            relative_tolerance: R::zero(),
            max_cycles,
            divergence_factor: R::from(1e3).unwrap_or_else(R::max_value),
        }
    }

    pub fn with_relative_tolerance(mut self, relative_tolerance: R) -> Self {
        self.relative_tolerance = relative_tolerance;
        self
    }

    pub fn with_divergence_factor(mut self, factor: R) -> Self {
        self.divergence_factor = factor;
        self
    }

    /// Residual norm before the first cycle
    pub fn with_initial(mut self, norm: R) -> Self {
        self.initial = Some(norm);
        self
    }

    pub fn history(&self) -> &[R] {
        &self.history
    }

    pub fn initial(&self) -> Option<R> {
        self.initial
    }

    /// Latest recorded norm, falling back to the initial one
    pub fn latest(&self) -> Option<R> {
        self.history.last().copied().or(self.initial)
    }

    pub fn cycles(&self) -> usize {
        self.history.len()
    }

    /// Effective stopping threshold
    pub fn threshold(&self) -> R {
        match self.initial {
            Some(initial) => self.tolerance.max(self.relative_tolerance * initial),
            None => self.tolerance,
        }
    }

    pub fn record_residual(&mut self, norm: R) -> ConvergenceStatus {
        let previous = self.latest();
        self.history.push(norm);

        let diverged = !norm.is_finite()
            || previous.is_some_and(|prev| norm > self.divergence_factor * prev);
        if diverged {
            ConvergenceStatus::Diverged
        } else if self.is_converged() {
            ConvergenceStatus::Converged
        } else if self.is_exhausted() {
            ConvergenceStatus::Exhausted
        } else {
            ConvergenceStatus::Iterating
        }
    }

    pub fn is_converged(&self) -> bool {
        self.latest().is_some_and(|norm| norm <= self.threshold())
    }

    pub fn is_exhausted(&self) -> bool {
        self.history.len() >= self.max_cycles
    }

    /// Geometric mean reduction factor per cycle
    pub fn convergence_rate(&self) -> Option<R> {
        let first = self.initial.or_else(|| self.history.first().copied())?;
        let last = *self.history.last()?;
        let steps = if self.initial.is_some() {
            self.history.len()
        } else {
            self.history.len() - 1
        };
        if steps == 0 || first <= R::zero() {
            return None;
        }
        let steps = R::from(steps)?;
        Some((last / first).powf(steps.recip()))
    }
}
