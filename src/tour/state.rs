use std::sync::Arc;

use crate::foundation::core::Rect;
use crate::foundation::error::{TourError, TourResult};
use crate::geometry::placement::TipPlacement;
use crate::geometry::shape::SpotGeometry;
use crate::model::step::Step;
use crate::sequencer::transition::TransitionPhase;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Lifecycle of a tour run.
pub enum TourStatus {
    /// Never started.
    #[default]
    Idle,
    /// A step is active.
    Running,
    /// Stopped or finished.
    Stopped,
}

/// Mutable progress of one tour.
///
/// `current` and `spot` are only `Some` while running; `spot` stays `None` until the first
/// measurement for the run resolves.
#[derive(Clone, Debug)]
pub struct TourState {
    status: TourStatus,
    current: Option<usize>,
    spot: Option<Rect>,
    steps: Arc<[Step]>,
}

impl TourState {
    /// Idle state over `steps`.
    pub fn new(steps: impl Into<Arc<[Step]>>) -> Self {
        Self {
            status: TourStatus::Idle,
            current: None,
            spot: None,
            steps: steps.into(),
        }
    }

    /// Lifecycle status.
    pub fn status(&self) -> TourStatus {
        self.status
    }

    /// Whether a step is active.
    pub fn is_running(&self) -> bool {
        self.status == TourStatus::Running
    }

    /// Active step index.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Last measured bounds of the active target.
    pub fn spot(&self) -> Option<Rect> {
        self.spot
    }

    /// All steps in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step at `index`.
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// The active step.
    pub fn current_step(&self) -> Option<&Step> {
        self.current.and_then(|i| self.steps.get(i))
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the tour has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the final step, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Whether the active step is the final one.
    pub fn is_last(&self) -> bool {
        self.current.is_some() && self.current == self.last_index()
    }

    /// `Ok` when `index` names a step.
    pub fn check_index(&self, index: usize) -> TourResult<()> {
        if index < self.steps.len() {
            Ok(())
        } else {
            Err(TourError::InvalidIndex {
                index,
                len: self.steps.len(),
            })
        }
    }

    pub(crate) fn run_at(&mut self, index: usize) {
        if !self.is_running() {
            self.spot = None;
        }
        self.status = TourStatus::Running;
        self.current = Some(index);
    }

    pub(crate) fn set_spot(&mut self, spot: Rect) {
        self.spot = Some(spot);
    }

    pub(crate) fn reset(&mut self) {
        self.status = TourStatus::Stopped;
        self.current = None;
        self.spot = None;
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Read-only view of a tour handed to presentation code.
pub struct TourSnapshot {
    /// Lifecycle status.
    pub status: TourStatus,
    /// Active step.
    pub current: Option<usize>,
    /// Last measured bounds of the active step's target.
    pub spot: Option<Rect>,
    /// Number of steps.
    pub step_count: usize,
    /// Transition progress.
    pub phase: TransitionPhase,
    /// Cut-out for `spot`.
    pub geometry: Option<SpotGeometry>,
    /// Tooltip placement, once the tooltip has been laid out.
    pub tip: Option<TipPlacement>,
}

#[cfg(test)]
#[path = "../../tests/unit/tour/state.rs"]
mod tests;
