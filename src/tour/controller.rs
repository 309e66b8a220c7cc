use std::sync::Arc;

use crate::foundation::core::{BezPath, Rect, Size, Viewport};
use crate::foundation::error::TourResult;
use crate::geometry::placement::TipPlacement;
use crate::geometry::shape::SpotGeometry;
use crate::model::config::{MaskStyle, TourConfig};
use crate::model::step::{Step, TipAction, TipContent, TipProps};
use crate::registry::target::{MeasureTarget, TargetRegistry};
use crate::sequencer::transition::{
    AnimationKind, AnimationOutcome, Effect, Progress, Sequencer, TransitionId, TransitionPhase,
};
use crate::tour::state::{TourSnapshot, TourState, TourStatus};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
/// Notifications delivered to subscribers.
pub enum TourEvent {
    /// Observable state changed.
    Changed(TourSnapshot),
    /// A step's target could not be measured within the retry budget; the overlay stays put.
    TargetNeverMeasured {
        /// Step whose target never resolved.
        index: usize,
        /// Attempts made.
        attempts: u32,
    },
    /// `next()` was called on the last step.
    Finished {
        /// Step the tour ended on.
        last_index: usize,
    },
    /// The tour was stopped.
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Handle returned by [`SpotlightTour::subscribe`].
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&TourEvent)>;

/// Public facade of a spotlight tour.
///
/// Owns the tour state, the target registry and the transition sequencer. Presentation code
/// drives it from a single thread: navigation calls and host callbacks go in, [`Effect`]s come
/// out through [`SpotlightTour::take_effects`] and state changes are pushed to subscribers.
pub struct SpotlightTour {
    config: TourConfig,
    state: TourState,
    registry: TargetRegistry,
    sequencer: Sequencer,
    viewport: Viewport,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    last_snapshot: Option<TourSnapshot>,
}

impl std::fmt::Debug for SpotlightTour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotlightTour")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("sequencer", &self.sequencer)
            .field("viewport", &self.viewport)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SpotlightTour {
    /// Validate `config` and build an idle tour.
    pub fn new(config: TourConfig, viewport: Viewport) -> TourResult<Self> {
        config.validate()?;
        let state = TourState::new(config.steps.clone());
        let sequencer = Sequencer::new(config.retry, config.timing);
        Ok(Self {
            config,
            state,
            registry: TargetRegistry::new(),
            sequencer,
            viewport,
            listeners: Vec::new(),
            next_subscription: 0,
            last_snapshot: None,
        })
    }

    // ---- navigation ----

    /// Start at the first step.
    pub fn start(&mut self) -> TourResult<()> {
        self.start_at(0)
    }

    /// Start (or restart) at `index`.
    #[tracing::instrument(skip(self))]
    pub fn start_at(&mut self, index: usize) -> TourResult<()> {
        self.state.check_index(index)?;
        self.state.run_at(index);
        self.sequencer.begin(index);
        self.notify_if_changed();
        Ok(())
    }

    /// Advance one step; stops the tour when called on the last step.
    #[allow(clippy::should_implement_trait)]
    #[tracing::instrument(skip(self))]
    pub fn next(&mut self) {
        let Some(current) = self.running_index() else {
            return;
        };
        if self.state.is_last() {
            self.finish(current);
            return;
        }
        self.move_to(current + 1);
    }

    /// Go back one step; a no-op on the first step.
    #[tracing::instrument(skip(self))]
    pub fn previous(&mut self) {
        let Some(current) = self.running_index() else {
            return;
        };
        if current == 0 {
            return;
        }
        self.move_to(current - 1);
    }

    /// Jump straight to `index` without visiting the steps in between.
    ///
    /// Jumping to the current step re-measures its target. A no-op when the tour is not
    /// running, but the index is still checked.
    #[tracing::instrument(skip(self))]
    pub fn go_to(&mut self, index: usize) -> TourResult<()> {
        self.state.check_index(index)?;
        if self.state.is_running() {
            self.move_to(index);
        }
        Ok(())
    }

    /// End the tour, cancelling any transition in flight. Registrations are kept.
    #[tracing::instrument(skip(self))]
    pub fn stop(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.sequencer.cancel();
        self.state.reset();
        self.emit(TourEvent::Stopped);
        self.notify_if_changed();
    }

    /// Route a tooltip button press.
    pub fn dispatch(&mut self, action: TipAction) {
        match action {
            TipAction::Next => self.next(),
            TipAction::Previous => self.previous(),
            TipAction::Stop => self.stop(),
        }
    }

    /// Backdrop tapped: advance when configured to, otherwise ignore.
    pub fn on_backdrop_press(&mut self) {
        if self.config.should_continue_on_backdrop_press {
            self.next();
        }
    }

    // ---- targets ----

    /// Register the measurement handle for step `index`. The last registration wins, and a
    /// transition waiting to retry that step measures it right away.
    pub fn register(&mut self, index: usize, handle: Arc<dyn MeasureTarget>) {
        self.registry.register(index, handle);
        if self.state.is_running() {
            let progress = self.sequencer.on_registered(index);
            self.absorb(progress);
        }
    }

    /// Remove the handle for step `index`.
    pub fn unregister(&mut self, index: usize) -> bool {
        self.registry.unregister(index)
    }

    /// Registered measurement handles.
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    // ---- host callbacks ----

    /// Drain the work queued for the host, oldest first.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.sequencer.take_effects()
    }

    /// Report that an animation started by an [`Effect`] ended.
    pub fn on_animation_finished(
        &mut self,
        transition: TransitionId,
        kind: AnimationKind,
        outcome: AnimationOutcome,
    ) {
        let progress = self
            .sequencer
            .on_animation_finished(transition, kind, outcome);
        self.absorb(progress);
    }

    /// Report the bounds measured for an [`Effect::Measure`].
    pub fn on_measured(&mut self, transition: TransitionId, result: TourResult<Rect>) {
        let progress = self
            .sequencer
            .on_measured(transition, result, &mut self.state);
        self.absorb(progress);
    }

    /// Perform an [`Effect::Measure`] through the registered handle.
    pub fn resolve_measurement(&mut self, transition: TransitionId) {
        if self.sequencer.active() != Some(transition) {
            return;
        }
        let Some(index) = self.sequencer.target() else {
            return;
        };
        let result = self.registry.measure(index);
        self.on_measured(transition, result);
    }

    /// Report that the delay of an [`Effect::RetryMeasure`] elapsed.
    pub fn on_retry_due(&mut self, transition: TransitionId) {
        let progress = self.sequencer.on_retry_due(transition);
        self.absorb(progress);
    }

    /// Report the laid-out size of the current step's tooltip.
    pub fn on_tip_layout(&mut self, size: Size) {
        let Some(step) = self.state.current_step() else {
            return;
        };
        let progress = self
            .sequencer
            .on_tip_layout(size, step, self.viewport.width);
        self.absorb(progress);
    }

    /// Update the viewport and re-place the tooltip against it.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(step) = self.state.current_step() {
            self.sequencer.replace_tip(step, viewport.width);
        }
        self.notify_if_changed();
    }

    // ---- observation ----

    /// Listen for [`TourEvent`]s.
    pub fn subscribe(&mut self, listener: impl FnMut(&TourEvent) + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Stop delivering events to `id`. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Current observable state.
    pub fn snapshot(&self) -> TourSnapshot {
        TourSnapshot {
            status: self.state.status(),
            current: self.state.current(),
            spot: self.state.spot(),
            step_count: self.state.len(),
            phase: self.sequencer.phase(),
            geometry: self.sequencer.geometry(),
            tip: self.sequencer.tip(),
        }
    }

    /// Underlying tour state.
    pub fn state(&self) -> &TourState {
        &self.state
    }

    /// Lifecycle status.
    pub fn status(&self) -> TourStatus {
        self.state.status()
    }

    /// Active step index while running.
    pub fn current(&self) -> Option<usize> {
        self.state.current()
    }

    /// Measured bounds of the active target.
    pub fn spot(&self) -> Option<Rect> {
        self.state.spot()
    }

    /// All steps in order.
    pub fn steps(&self) -> &[Step] {
        self.state.steps()
    }

    /// The active step while running.
    pub fn current_step(&self) -> Option<&Step> {
        self.state.current_step()
    }

    /// Progress of the current transition.
    pub fn phase(&self) -> TransitionPhase {
        self.sequencer.phase()
    }

    /// Cut-out for `spot`.
    pub fn geometry(&self) -> Option<SpotGeometry> {
        self.sequencer.geometry()
    }

    /// Tooltip placement, once the tooltip reported its size.
    pub fn tip_placement(&self) -> Option<TipPlacement> {
        self.sequencer.tip()
    }

    /// Viewport used for placement.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Configuration the tour was built from.
    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Overlay colour and opacity.
    pub fn mask_style(&self) -> MaskStyle {
        self.config.mask()
    }

    /// Overlay path with the current cut-out removed.
    pub fn mask_path(&self) -> Option<BezPath> {
        self.sequencer
            .geometry()
            .map(|g| g.mask_path(self.viewport))
    }

    /// Props for the active step's tooltip.
    pub fn tip_props(&self) -> Option<TipProps> {
        self.state
            .current()
            .map(|i| TipProps::new(i, self.state.len()))
    }

    /// Render the current step's tooltip.
    pub fn render_current_tip(&self) -> Option<TipContent> {
        let props = self.tip_props()?;
        let step = self.state.current_step()?;
        Some(step.render_tip(&props))
    }

    // ---- internals ----

    fn running_index(&self) -> Option<usize> {
        if self.state.is_running() {
            self.state.current()
        } else {
            None
        }
    }

    fn move_to(&mut self, index: usize) {
        self.state.run_at(index);
        self.sequencer.begin(index);
        self.notify_if_changed();
    }

    fn finish(&mut self, last_index: usize) {
        tracing::debug!(last_index, "tour finished");
        self.sequencer.cancel();
        self.state.reset();
        self.emit(TourEvent::Finished { last_index });
        self.notify_if_changed();
    }

    fn absorb(&mut self, progress: Progress) {
        match progress {
            Progress::Ignored => return,
            Progress::Advanced => {}
            Progress::GaveUp { index, attempts } => {
                self.emit(TourEvent::TargetNeverMeasured { index, attempts });
            }
        }
        self.notify_if_changed();
    }

    fn notify_if_changed(&mut self) {
        let snapshot = self.snapshot();
        if self.last_snapshot.as_ref() == Some(&snapshot) {
            return;
        }
        self.last_snapshot = Some(snapshot.clone());
        self.emit(TourEvent::Changed(snapshot));
    }

    fn emit(&mut self, event: TourEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tour/controller.rs"]
mod tests;
