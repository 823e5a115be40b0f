//! One tier of the hierarchy

use super::transfer::TransferOperator;
use crate::smoothers::Smoother;
use crate::traits::{ComplexField, LinearOperator};
use std::sync::Arc;

/// A level: its operator, the transfer to the next coarser level, smoothers
/// and optional per-level overrides.
///
/// Levels are assembled with the builder methods and handed to
/// [`LevelHierarchy::build`](super::LevelHierarchy::build), which assigns the
/// index by position (0 = coarsest).
#[derive(Clone)]
pub struct Level<T: ComplexField> {
    pub(crate) index: usize,
    pub(crate) operator: Arc<dyn LinearOperator<T>>,
    pub(crate) transfer: Option<TransferOperator<T>>,
    pub(crate) smoother_down: Option<Arc<dyn Smoother<T>>>,
    pub(crate) smoother_up: Option<Arc<dyn Smoother<T>>>,
    pub(crate) pre_smooth_steps: Option<usize>,
    pub(crate) post_smooth_steps: Option<usize>,
    pub(crate) cycles: Option<usize>,
}

impl<T: ComplexField> std::fmt::Debug for Level<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("index", &self.index)
            .field("size", &self.size())
            .field("transfer", &self.transfer)
            .field("smoother_down", &self.smoother_down.as_ref().map(|s| s.name()))
            .field("smoother_up", &self.smoother_up.as_ref().map(|s| s.name()))
            .field("pre_smooth_steps", &self.pre_smooth_steps)
            .field("post_smooth_steps", &self.post_smooth_steps)
            .field("cycles", &self.cycles)
            .finish()
    }
}

impl<T: ComplexField> Level<T> {
    pub fn new(operator: Arc<dyn LinearOperator<T>>) -> Self {
        Self {
            index: 0,
            operator,
            transfer: None,
            smoother_down: None,
            smoother_up: None,
            pre_smooth_steps: None,
            post_smooth_steps: None,
            cycles: None,
        }
    }

    /// Transfer to the next coarser level
    pub fn with_transfer(mut self, transfer: TransferOperator<T>) -> Self {
        self.transfer = Some(transfer);
        self
    }

    /// Use the same smoother going down and up
    pub fn with_smoother(self, smoother: Arc<dyn Smoother<T>>) -> Self {
        self.with_smoothers(smoother.clone(), smoother)
    }

    pub fn with_smoothers(mut self, down: Arc<dyn Smoother<T>>, up: Arc<dyn Smoother<T>>) -> Self {
        self.smoother_down = Some(down);
        self.smoother_up = Some(up);
        self
    }

    /// Override the hierarchy-wide smoothing counts on this level
    pub fn with_smoothing_steps(mut self, pre: usize, post: usize) -> Self {
        self.pre_smooth_steps = Some(pre);
        self.post_smooth_steps = Some(post);
        self
    }

    /// Number of coarse-grid visits per cycle from this level
    pub fn with_cycles(mut self, cycles: usize) -> Self {
        self.cycles = Some(cycles);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of unknowns
    pub fn size(&self) -> usize {
        self.operator.num_rows()
    }

    pub fn operator(&self) -> &dyn LinearOperator<T> {
        self.operator.as_ref()
    }

    pub fn transfer(&self) -> Option<&TransferOperator<T>> {
        self.transfer.as_ref()
    }

    pub fn smoother_down(&self) -> Option<&dyn Smoother<T>> {
        self.smoother_down.as_deref()
    }

    pub fn smoother_up(&self) -> Option<&dyn Smoother<T>> {
        self.smoother_up.as_deref()
    }

    pub fn cycles(&self) -> Option<usize> {
        self.cycles
    }
}
