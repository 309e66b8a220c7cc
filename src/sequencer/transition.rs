//! Transition sequencing between tour steps.
//!
//! The sequencer never blocks. Each navigation starts a transition identified by a
//! [`TransitionId`]; the sequencer queues [`Effect`]s for the host and advances when the host
//! reports back (animation finished, measurement resolved, retry due, tooltip laid out).
//! Callbacks carrying a superseded id are dropped, so a cancelled continuation can never touch
//! tour state.
//!
//! ```text
//! Idle -> AwaitingHide -> AwaitingMeasurement -> Placing -> Revealing -> Settled
//!            (any non-terminal state) -- stop / supersede --> Cancelled
//! ```

use std::time::Duration;

use crate::foundation::core::{Rect, Size};
use crate::foundation::error::{TourError, TourResult};
use crate::geometry::placement::{TipPlacement, tip_placement};
use crate::geometry::shape::{SpotGeometry, spot_geometry};
use crate::model::config::{MotionTiming, RetryPolicy, Timing};
use crate::model::step::{Motion, Step};
use crate::tour::state::TourState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
/// Identity of one transition; callbacks must echo it back.
pub struct TransitionId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
/// Where the current transition stands.
pub enum TransitionPhase {
    /// No transition has run yet.
    #[default]
    Idle,
    /// Waiting for the visible tooltip to fade out.
    AwaitingHide,
    /// Waiting for the new target's bounds.
    AwaitingMeasurement {
        /// 1-based attempt counter.
        attempt: u32,
        /// A retry delay is running; the next `Measure` is issued when it fires.
        retry_pending: bool,
    },
    /// Computing geometry for a fresh measurement.
    Placing,
    /// Spot moving and tooltip fading in.
    Revealing {
        /// Spot animation finished.
        spot_moved: bool,
        /// Tooltip fade-in finished.
        tip_shown: bool,
    },
    /// Nothing in flight until the next navigation.
    Settled,
    /// Stopped mid-flight.
    Cancelled,
}

impl TransitionPhase {
    /// Whether a transition is still waiting on the host.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::AwaitingHide
                | Self::AwaitingMeasurement { .. }
                | Self::Placing
                | Self::Revealing { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Animations the host runs on the sequencer's behalf.
pub enum AnimationKind {
    /// Tooltip fade-out.
    HideTip,
    /// Spotlight move to the new spot.
    MoveSpot,
    /// Tooltip fade-in.
    RevealTip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// How an animation ended.
pub enum AnimationOutcome {
    /// Ran to completion.
    Completed,
    /// Halted before completion; its continuation is dropped.
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
/// Work the host must perform, reporting back with the same transition id.
pub enum Effect {
    /// Fade the visible tooltip out, then report [`AnimationKind::HideTip`].
    HideTip {
        /// Owning transition.
        transition: TransitionId,
        /// Fade timing.
        timing: Timing,
    },
    /// Measure the target registered for `index`.
    Measure {
        /// Owning transition.
        transition: TransitionId,
        /// Step whose target to measure.
        index: usize,
    },
    /// Report `on_retry_due` after `delay`.
    RetryMeasure {
        /// Owning transition.
        transition: TransitionId,
        /// Step whose target is missing.
        index: usize,
        /// Attempt that runs when the delay fires.
        attempt: u32,
        /// Wait before retrying.
        delay: Duration,
    },
    /// Animate the spotlight, then report [`AnimationKind::MoveSpot`].
    MoveSpot {
        /// Owning transition.
        transition: TransitionId,
        /// Cut-out currently on screen, if any.
        from: Option<SpotGeometry>,
        /// Cut-out for the new step.
        to: SpotGeometry,
        /// Motion style of the new step.
        motion: Motion,
        /// Timing for `motion`.
        timing: Timing,
    },
    /// Fade the tooltip in, then report [`AnimationKind::RevealTip`].
    RevealTip {
        /// Owning transition.
        transition: TransitionId,
        /// Fade timing.
        timing: Timing,
    },
    /// Halt every animation started for `transition` without completing it.
    CancelAnimations {
        /// Superseded transition.
        transition: TransitionId,
    },
}

impl Effect {
    /// Transition the effect belongs to.
    pub fn transition(&self) -> TransitionId {
        match *self {
            Self::HideTip { transition, .. }
            | Self::Measure { transition, .. }
            | Self::RetryMeasure { transition, .. }
            | Self::MoveSpot { transition, .. }
            | Self::RevealTip { transition, .. }
            | Self::CancelAnimations { transition } => transition,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Result of feeding a host callback to the sequencer.
pub(crate) enum Progress {
    /// Stale or out-of-phase callback.
    Ignored,
    /// Phase moved on.
    Advanced,
    /// Retry budget exhausted; the transition settled without moving the spot.
    GaveUp { index: usize, attempts: u32 },
}

#[derive(Debug)]
pub(crate) struct Sequencer {
    phase: TransitionPhase,
    active: Option<TransitionId>,
    target: Option<usize>,
    next_id: u64,
    tip_visible: bool,
    geometry: Option<SpotGeometry>,
    tip_size: Option<Size>,
    tip: Option<TipPlacement>,
    retry: RetryPolicy,
    timing: MotionTiming,
    effects: Vec<Effect>,
}

impl Sequencer {
    pub(crate) fn new(retry: RetryPolicy, timing: MotionTiming) -> Self {
        Self {
            phase: TransitionPhase::Idle,
            active: None,
            target: None,
            next_id: 0,
            tip_visible: false,
            geometry: None,
            tip_size: None,
            tip: None,
            retry,
            timing,
            effects: Vec::new(),
        }
    }

    pub(crate) fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub(crate) fn active(&self) -> Option<TransitionId> {
        self.active
    }

    pub(crate) fn target(&self) -> Option<usize> {
        self.target
    }

    pub(crate) fn geometry(&self) -> Option<SpotGeometry> {
        self.geometry
    }

    pub(crate) fn tip(&self) -> Option<TipPlacement> {
        self.tip
    }

    pub(crate) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Start a transition to step `index`, superseding any transition in flight.
    pub(crate) fn begin(&mut self, index: usize) -> TransitionId {
        self.supersede();
        self.next_id += 1;
        let id = TransitionId(self.next_id);
        self.active = Some(id);
        self.target = Some(index);

        if self.tip_visible {
            self.set_phase(TransitionPhase::AwaitingHide);
            self.effects.push(Effect::HideTip {
                transition: id,
                timing: self.timing.tip_fade,
            });
        } else {
            self.request_measure(id, index, 1);
        }
        id
    }

    /// Abandon the transition in flight and forget everything derived from it.
    pub(crate) fn cancel(&mut self) {
        self.supersede();
        self.active = None;
        self.target = None;
        self.tip_visible = false;
        self.geometry = None;
        self.tip_size = None;
        self.tip = None;
        self.set_phase(TransitionPhase::Cancelled);
    }

    pub(crate) fn on_animation_finished(
        &mut self,
        id: TransitionId,
        kind: AnimationKind,
        outcome: AnimationOutcome,
    ) -> Progress {
        if self.active != Some(id) || outcome == AnimationOutcome::Cancelled {
            return Progress::Ignored;
        }
        match (self.phase, kind) {
            (TransitionPhase::AwaitingHide, AnimationKind::HideTip) => {
                self.tip_visible = false;
                let Some(index) = self.target else {
                    return Progress::Ignored;
                };
                self.request_measure(id, index, 1);
                Progress::Advanced
            }
            (
                TransitionPhase::Revealing {
                    spot_moved,
                    tip_shown,
                },
                AnimationKind::MoveSpot | AnimationKind::RevealTip,
            ) => {
                let spot_moved = spot_moved || kind == AnimationKind::MoveSpot;
                let tip_shown = tip_shown || kind == AnimationKind::RevealTip;
                if spot_moved && tip_shown {
                    self.set_phase(TransitionPhase::Settled);
                } else {
                    self.set_phase(TransitionPhase::Revealing {
                        spot_moved,
                        tip_shown,
                    });
                }
                Progress::Advanced
            }
            _ => Progress::Ignored,
        }
    }

    /// Feed a measurement for the transition's target.
    ///
    /// On success this is the only place `state.spot` changes.
    pub(crate) fn on_measured(
        &mut self,
        id: TransitionId,
        result: TourResult<Rect>,
        state: &mut TourState,
    ) -> Progress {
        if self.active != Some(id) {
            return Progress::Ignored;
        }
        let TransitionPhase::AwaitingMeasurement {
            attempt,
            retry_pending: false,
        } = self.phase
        else {
            return Progress::Ignored;
        };
        let Some(index) = self.target else {
            return Progress::Ignored;
        };

        match result.and_then(checked_bounds) {
            Ok(rect) => {
                self.place(id, index, rect, state);
                Progress::Advanced
            }
            Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                tracing::debug!(index, attempt, %err, "measurement failed, retrying");
                let next = attempt + 1;
                self.set_phase(TransitionPhase::AwaitingMeasurement {
                    attempt: next,
                    retry_pending: true,
                });
                self.effects.push(Effect::RetryMeasure {
                    transition: id,
                    index,
                    attempt: next,
                    delay: self.retry.interval(),
                });
                Progress::Advanced
            }
            Err(err) => {
                tracing::warn!(index, attempts = attempt, %err, "target never measured");
                self.set_phase(TransitionPhase::Settled);
                self.tip = None;
                self.tip_size = None;
                // Keep the overlay where it was and bring the controls back.
                if !self.tip_visible {
                    self.tip_visible = true;
                    self.effects.push(Effect::RevealTip {
                        transition: id,
                        timing: self.timing.tip_fade,
                    });
                }
                Progress::GaveUp {
                    index,
                    attempts: attempt,
                }
            }
        }
    }

    pub(crate) fn on_retry_due(&mut self, id: TransitionId) -> Progress {
        if self.active != Some(id) {
            return Progress::Ignored;
        }
        self.fire_retry()
    }

    /// A target registered; skip the remaining retry delay if it is the one we wait for.
    pub(crate) fn on_registered(&mut self, index: usize) -> Progress {
        if self.target != Some(index) {
            return Progress::Ignored;
        }
        self.fire_retry()
    }

    /// The tooltip for the current step reported its laid-out size.
    pub(crate) fn on_tip_layout(
        &mut self,
        size: Size,
        step: &Step,
        viewport_width: f64,
    ) -> Progress {
        if !self.tip_is_current() {
            return Progress::Ignored;
        }
        self.tip_size = Some(size);
        if self.replace_tip(step, viewport_width) {
            Progress::Advanced
        } else {
            Progress::Ignored
        }
    }

    /// Recompute the tooltip placement from the stored tooltip size, e.g. after a viewport change.
    ///
    /// Only once the current step's spot is placed; before that `geometry` and `tip_size` still
    /// describe the previous step.
    pub(crate) fn replace_tip(&mut self, step: &Step, viewport_width: f64) -> bool {
        if !self.tip_is_current() {
            return false;
        }
        let (Some(geometry), Some(size)) = (self.geometry, self.tip_size) else {
            return false;
        };
        let placement = tip_placement(&geometry, size, step.position, step.align_to, viewport_width);
        tracing::trace!(?placement, "tooltip placed");
        self.tip = Some(placement);
        true
    }

    fn tip_is_current(&self) -> bool {
        matches!(
            self.phase,
            TransitionPhase::Revealing { .. } | TransitionPhase::Settled
        )
    }

    fn place(&mut self, id: TransitionId, index: usize, rect: Rect, state: &mut TourState) {
        self.set_phase(TransitionPhase::Placing);
        let Some((shape, props, motion)) = state
            .step(index)
            .map(|s| (s.shape, s.shape_properties, s.motion))
        else {
            return;
        };
        state.set_spot(rect);

        let from = self.geometry;
        let to = spot_geometry(rect, shape, &props);
        self.geometry = Some(to);
        // Size and placement belong to the previous step's content.
        self.tip = None;
        self.tip_size = None;

        self.effects.push(Effect::MoveSpot {
            transition: id,
            from,
            to,
            motion,
            timing: self.timing.for_motion(motion),
        });
        self.effects.push(Effect::RevealTip {
            transition: id,
            timing: self.timing.tip_fade,
        });
        self.tip_visible = true;
        self.set_phase(TransitionPhase::Revealing {
            spot_moved: false,
            tip_shown: false,
        });
    }

    fn fire_retry(&mut self) -> Progress {
        let (Some(id), Some(index)) = (self.active, self.target) else {
            return Progress::Ignored;
        };
        match self.phase {
            TransitionPhase::AwaitingMeasurement {
                attempt,
                retry_pending: true,
            } => {
                self.set_phase(TransitionPhase::AwaitingMeasurement {
                    attempt,
                    retry_pending: false,
                });
                self.effects.push(Effect::Measure {
                    transition: id,
                    index,
                });
                Progress::Advanced
            }
            _ => Progress::Ignored,
        }
    }

    fn request_measure(&mut self, id: TransitionId, index: usize, attempt: u32) {
        self.set_phase(TransitionPhase::AwaitingMeasurement {
            attempt,
            retry_pending: false,
        });
        self.effects.push(Effect::Measure {
            transition: id,
            index,
        });
    }

    fn supersede(&mut self) {
        if let Some(old) = self.active
            && self.phase.is_in_flight()
        {
            tracing::debug!(transition = old.0, phase = ?self.phase, "superseding transition");
            // Work the host has not picked up yet is dropped outright.
            self.effects.retain(|e| {
                e.transition() != old || matches!(e, Effect::CancelAnimations { .. })
            });
            self.effects.push(Effect::CancelAnimations { transition: old });
        }
    }

    fn set_phase(&mut self, phase: TransitionPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "transition phase");
            self.phase = phase;
        }
    }
}

fn checked_bounds(rect: Rect) -> TourResult<Rect> {
    let ok = [rect.x0, rect.y0, rect.x1, rect.y1]
        .iter()
        .all(|v| v.is_finite());
    if !ok {
        return Err(TourError::validation("measured bounds must be finite"));
    }
    Ok(rect.abs())
}

#[cfg(test)]
#[path = "../../tests/unit/sequencer/transition.rs"]
mod tests;
