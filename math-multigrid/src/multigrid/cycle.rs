//! Multigrid cycle implementations
//!
//! Provides V, W, F, multiplicative, additive and Kaskade cycles over a
//! [`LevelHierarchy`]. The recursive cycles run on an explicit stack of
//! frames, so hierarchy depth never turns into native stack depth, and every
//! failure surfaces through `?` exactly as the nested level reported it.
//!
//! One visit at a level `l > 0` of a recursive cycle:
//!
//! 1. pre-smooth `x_l`
//! 2. `r_l = b_l - A_l x_l`, `b_{l-1} = R r_l`, `x_{l-1} = 0`
//! 3. cycle level `l-1` (level 0 is a coarse solve)
//! 4. `x_l += P x_{l-1}`; steps 2-4 repeat for every coarse visit
//! 5. post-smooth `x_l`

use super::context::{CycleContext, LevelOrder};
use super::hierarchy::{CycleType, LevelHierarchy};
use super::level::Level;
use super::transfer::{TransferDirection, TransferOperator};
use super::workspace::Workspace;
use crate::error::{MultigridError, Result};
use crate::smoothers::Smoother;
use crate::traits::ComplexField;
use crate::vector::residual_into;
use ndarray::Array1;
use std::time::Instant;

/// Recursion pattern of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    V,
    W,
    F,
}

/// Side of a visit a smoothing pass belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SmoothingRole {
    /// Before restriction (pre-smoothing, additive corrections)
    Descent,
    /// After interpolation (post-smoothing, Kaskade)
    Ascent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Enter,
    Restrict,
    Correct,
    PostSmooth,
}

#[derive(Debug)]
struct Frame {
    level: usize,
    shape: Shape,
    visit: usize,
    visits: usize,
    phase: Phase,
}

impl Frame {
    /// Shape of the coarse visit about to start
    fn child_shape(&self) -> Shape {
        match self.shape {
            Shape::F if self.visit == 0 => Shape::F,
            Shape::F => Shape::V,
            shape => shape,
        }
    }
}

/// Drives cycles over a borrowed hierarchy
pub struct CycleScheduler<'h, T: ComplexField> {
    hierarchy: &'h LevelHierarchy<T>,
}

impl<'h, T: ComplexField> CycleScheduler<'h, T> {
    pub fn new(hierarchy: &'h LevelHierarchy<T>) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> &'h LevelHierarchy<T> {
        self.hierarchy
    }

    /// One cycle at `level`, in place on `workspace.level(level).x` given its `b`
    ///
    /// Coarser work vectors are overwritten. A failure leaves the workspace in
    /// whatever state the failing step produced.
    pub fn apply_cycle(
        &self,
        level: usize,
        workspace: &mut Workspace<T>,
        context: &mut CycleContext,
    ) -> Result<()> {
        let len = self.hierarchy.num_levels();
        if level >= len {
            return Err(MultigridError::IndexOutOfRange { index: level, len });
        }
        workspace.check_sizes(self.hierarchy.levels().iter().map(Level::size))?;

        let started = Instant::now();
        match self.hierarchy.cycle_type() {
            CycleType::V | CycleType::Multiplicative => {
                self.run_frames(level, Shape::V, workspace, context)?
            }
            CycleType::W => self.run_frames(level, Shape::W, workspace, context)?,
            CycleType::F => self.run_frames(level, Shape::F, workspace, context)?,
            CycleType::Additive => self.additive(level, workspace, context)?,
            CycleType::Kaskade => self.kaskade(level, workspace, context)?,
        }
        context.finish_cycle(started);

        log::trace!(
            "{:?} cycle {} at level {} done ({} coarse solves so far)",
            self.hierarchy.cycle_type(),
            context.stats().cycles,
            level,
            context.stats().coarse_solves
        );
        Ok(())
    }

    /// Copy `(x, b)` into the workspace, run one cycle, copy `x` back
    pub fn apply_to(
        &self,
        level: usize,
        x: &mut Array1<T>,
        b: &Array1<T>,
        workspace: &mut Workspace<T>,
        context: &mut CycleContext,
    ) -> Result<()> {
        let slot = workspace.level_mut(level)?;
        for (context_name, got) in [("iterate", x.len()), ("right-hand side", b.len())] {
            if got != slot.len() {
                return Err(MultigridError::DimensionMismatch {
                    level,
                    context: context_name,
                    expected: slot.len(),
                    got,
                });
            }
        }
        slot.x.assign(x);
        slot.b.assign(b);

        self.apply_cycle(level, workspace, context)?;
        x.assign(&workspace.slot(level).x);
        Ok(())
    }

    fn visits_for(&self, level: usize, shape: Shape) -> usize {
        let cycles = self.hierarchy.levels()[level].cycles();
        match shape {
            Shape::V => cycles.unwrap_or(1),
            Shape::W => cycles.unwrap_or(2),
            Shape::F => 2,
        }
    }

    /// V, W and F cycles
    fn run_frames(
        &self,
        top: usize,
        shape: Shape,
        ws: &mut Workspace<T>,
        ctx: &mut CycleContext,
    ) -> Result<()> {
        let mut stack = vec![Frame {
            level: top,
            shape,
            visit: 0,
            visits: self.visits_for(top, shape),
            phase: Phase::Enter,
        }];
        ctx.record_depth(stack.len());

        while let Some(frame) = stack.last_mut() {
            let level = frame.level;
            match frame.phase {
                Phase::Enter => {
                    if level == 0 {
                        self.coarse_solve(ws, ctx)?;
                        stack.pop();
                        continue;
                    }
                    frame.phase = Phase::Restrict;
                    ctx.level_mut(level).visits += 1;
                    self.pre_smooth(level, ws, ctx)?;
                }
                Phase::Restrict => {
                    let child_shape = frame.child_shape();
                    frame.visit += 1;
                    frame.phase = Phase::Correct;
                    self.restrict_residual(level, ws, ctx)?;
                    stack.push(Frame {
                        level: level - 1,
                        shape: child_shape,
                        visit: 0,
                        visits: self.visits_for(level - 1, child_shape),
                        phase: Phase::Enter,
                    });
                    ctx.record_depth(stack.len());
                }
                Phase::Correct => {
                    frame.phase = if frame.visit < frame.visits {
                        Phase::Restrict
                    } else {
                        Phase::PostSmooth
                    };
                    self.interpolate_correction(level, ws, ctx)?;
                }
                Phase::PostSmooth => {
                    self.post_smooth(level, ws, ctx)?;
                    stack.pop();
                }
            }
        }
        Ok(())
    }

    /// Independent corrections from a single residual snapshot
    fn additive(&self, top: usize, ws: &mut Workspace<T>, ctx: &mut CycleContext) -> Result<()> {
        if top == 0 {
            return self.coarse_solve(ws, ctx);
        }
        let transpose = ctx.transpose();
        self.restrict_chain(top, ws, ctx)?;

        let order: Vec<usize> = match ctx.additive_order() {
            LevelOrder::CoarseToFine => (0..=top).collect(),
            LevelOrder::FineToCoarse => (0..=top).rev().collect(),
        };
        for k in order {
            if k == 0 {
                self.coarse_solve(ws, ctx)?;
                continue;
            }
            if k < top {
                ws.slot_mut(k).x.fill(T::zero());
            }
            let (smoother, steps) = self.smoother_for(k, SmoothingRole::Descent, transpose);
            self.smooth(k, smoother, steps, ws, transpose)?;
            let stats = ctx.level_mut(k);
            stats.visits += 1;
            stats.pre_smooth_sweeps += steps;
        }

        for k in 1..=top {
            self.interpolate_correction(k, ws, ctx)?;
        }
        Ok(())
    }

    /// Cascadic sweep: coarse solve, then interpolate and smooth upward
    fn kaskade(&self, top: usize, ws: &mut Workspace<T>, ctx: &mut CycleContext) -> Result<()> {
        if top == 0 {
            return self.coarse_solve(ws, ctx);
        }
        let transpose = ctx.transpose();
        self.restrict_chain(top, ws, ctx)?;
        self.coarse_solve(ws, ctx)?;

        for k in 1..=top {
            if k < top {
                let transfer = self.transfer(k)?;
                let (coarse, fine) = ws.coarse_fine_mut(k);
                let lifted = transfer.apply(TransferDirection::Interpolate, &coarse.x, transpose);
                fine.x.assign(&lifted);
                ctx.level_mut(k).interpolations += 1;
            } else {
                self.interpolate_correction(k, ws, ctx)?;
            }
            let (smoother, steps) = self.smoother_for(k, SmoothingRole::Ascent, transpose);
            self.smooth(k, smoother, steps, ws, transpose)?;
            let stats = ctx.level_mut(k);
            stats.visits += 1;
            stats.post_smooth_sweeps += steps;
        }
        Ok(())
    }

    /// Residual at `top`, restricted through every coarser level
    fn restrict_chain(&self, top: usize, ws: &mut Workspace<T>, ctx: &mut CycleContext) -> Result<()> {
        let transpose = ctx.transpose();
        let slot = ws.slot_mut(top);
        residual_into(
            self.hierarchy.levels()[top].operator(),
            &slot.x,
            &slot.b,
            &mut slot.r,
            transpose,
        );
        ctx.level_mut(top).residual_evaluations += 1;

        for k in (1..=top).rev() {
            let transfer = self.transfer(k)?;
            let (coarse, fine) = ws.coarse_fine_mut(k);
            let source = if k == top { &fine.r } else { &fine.b };
            let restricted = transfer.apply(TransferDirection::Restrict, source, transpose);
            coarse.b.assign(&restricted);
            ctx.level_mut(k).restrictions += 1;
        }
        Ok(())
    }

    fn transfer(&self, level: usize) -> Result<&'h TransferOperator<T>> {
        self.hierarchy.levels()[level]
            .transfer()
            .ok_or(MultigridError::MissingComponent {
                level,
                component: "transfer operator",
            })
    }

    fn coarse_solve(&self, ws: &mut Workspace<T>, ctx: &mut CycleContext) -> Result<()> {
        let solver = self.hierarchy.coarse_solver();
        let slot = ws.slot_mut(0);
        let solved = if ctx.transpose() {
            solver.solve_transpose(&slot.b)
        } else {
            solver.solve(&slot.b)
        };
        slot.x = solved.map_err(|source| MultigridError::CoarseSolveFailure { source })?;
        ctx.record_coarse_solve();
        Ok(())
    }

    /// Smoother and sweep count for one side of a visit
    ///
    /// Transpose cycles run the adjoint of the other side: `smoother_up` with
    /// the post count on the way down, `smoother_down` with the pre count on
    /// the way up.
    fn smoother_for(
        &self,
        level: usize,
        role: SmoothingRole,
        transpose: bool,
    ) -> (Option<&'h dyn Smoother<T>>, usize) {
        let entry = &self.hierarchy.levels()[level];
        match (role, transpose) {
            (SmoothingRole::Descent, false) | (SmoothingRole::Ascent, true) => {
                (entry.smoother_down(), self.hierarchy.pre_steps_at(level))
            }
            (SmoothingRole::Ascent, false) | (SmoothingRole::Descent, true) => {
                (entry.smoother_up(), self.hierarchy.post_steps_at(level))
            }
        }
    }

    fn pre_smooth(&self, level: usize, ws: &mut Workspace<T>, ctx: &mut CycleContext) -> Result<()> {
        let transpose = ctx.transpose();
        let (smoother, steps) = self.smoother_for(level, SmoothingRole::Descent, transpose);
        self.smooth(level, smoother, steps, ws, transpose)?;
        ctx.level_mut(level).pre_smooth_sweeps += steps;
        Ok(())
    }

    fn post_smooth(&self, level: usize, ws: &mut Workspace<T>, ctx: &mut CycleContext) -> Result<()> {
        let transpose = ctx.transpose();
        let (smoother, steps) = self.smoother_for(level, SmoothingRole::Ascent, transpose);
        self.smooth(level, smoother, steps, ws, transpose)?;
        ctx.level_mut(level).post_smooth_sweeps += steps;
        Ok(())
    }

    fn smooth(
        &self,
        level: usize,
        smoother: Option<&dyn Smoother<T>>,
        steps: usize,
        ws: &mut Workspace<T>,
        transpose: bool,
    ) -> Result<()> {
        if steps == 0 {
            return Ok(());
        }
        let smoother = smoother.ok_or(MultigridError::MissingComponent {
            level,
            component: "smoother",
        })?;
        let operator = self.hierarchy.levels()[level].operator();
        let slot = ws.slot_mut(level);
        let outcome = if transpose {
            smoother.relax_transpose(operator, &slot.b, &mut slot.x, steps)
        } else {
            smoother.relax(operator, &slot.b, &mut slot.x, steps)
        };
        outcome.map_err(|source| MultigridError::SmootherFailure { level, source })
    }

    /// `r_l = b_l - A_l x_l`, `b_{l-1} = R r_l`, `x_{l-1} = 0`
    fn restrict_residual(
        &self,
        level: usize,
        ws: &mut Workspace<T>,
        ctx: &mut CycleContext,
    ) -> Result<()> {
        let transpose = ctx.transpose();
        let transfer = self.transfer(level)?;
        let operator = self.hierarchy.levels()[level].operator();
        let (coarse, fine) = ws.coarse_fine_mut(level);

        residual_into(operator, &fine.x, &fine.b, &mut fine.r, transpose);
        let restricted = transfer.apply(TransferDirection::Restrict, &fine.r, transpose);
        coarse.b.assign(&restricted);
        coarse.x.fill(T::zero());

        let stats = ctx.level_mut(level);
        stats.residual_evaluations += 1;
        stats.restrictions += 1;
        Ok(())
    }

    /// `x_l += P x_{l-1}`
    fn interpolate_correction(
        &self,
        level: usize,
        ws: &mut Workspace<T>,
        ctx: &mut CycleContext,
    ) -> Result<()> {
        let transfer = self.transfer(level)?;
        let (coarse, fine) = ws.coarse_fine_mut(level);
        let correction = transfer.apply(TransferDirection::Interpolate, &coarse.x, ctx.transpose());
        fine.x += &correction;
        ctx.level_mut(level).interpolations += 1;
        Ok(())
    }
}
