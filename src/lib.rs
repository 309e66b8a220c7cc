//! Spotlight tour is a headless engine for guided product tours.
//!
//! A tour is an ordered list of [`Step`]s. Each step points at a target element that the host
//! registers under the step's index. While a tour runs, everything outside the active target is
//! dimmed by a mask with a cut-out (circle or rounded rectangle), and a tooltip is placed next to
//! the cut-out.
//!
//! # Pipeline overview
//!
//! 1. **Navigate**: [`SpotlightTour::start`], [`SpotlightTour::next`], [`SpotlightTour::previous`],
//!    [`SpotlightTour::go_to`] and [`SpotlightTour::stop`] move the tour between steps.
//! 2. **Sequence**: every move starts a transition (hide tooltip, measure target, move spot,
//!    reveal tooltip). The engine queues [`Effect`]s; the host performs them and reports back.
//! 3. **Place**: measured bounds become a [`SpotGeometry`] and, once the tooltip reports its size,
//!    a [`TipPlacement`].
//! 4. **Render** (host side): [`SpotTween`] samples the cut-out animation, and
//!    [`SpotGeometry::mask_path`] yields the even-odd overlay path for any 2D backend.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No IO in the engine**: measuring, timers and animation belong to the host.
//! - **Stale work is inert**: callbacks carrying a superseded [`TransitionId`] are ignored.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod foundation;
mod geometry;
mod model;
mod registry;
mod sequencer;
mod tour;

pub use animation::ease::Ease;
pub use animation::tween::{Lerp, SpotFrame, SpotTween, tip_opacity};
pub use foundation::core::{
    BezPath, Point, Rect, Rgba8, Rgba8Premul, Size, SpotRect, Vec2, Viewport, spot_rect,
};
pub use foundation::error::{TourError, TourResult};
pub use geometry::placement::{
    Margin, RECT_TIP_GAP, SPOTLIGHT_TIP_GAP_PERCENT, TipMargin, TipPlacement, tip_placement,
};
pub use geometry::shape::{SPOTLIGHT_MARGIN, SpotGeometry, spot_geometry};
pub use model::config::{MaskColor, MaskStyle, MotionTiming, RetryPolicy, Timing, TourConfig};
pub use model::step::{
    AlignTo, Motion, Position, RenderFn, Shape, ShapeProperties, Step, TipAction, TipContent,
    TipProps,
};
pub use registry::target::{MeasureTarget, TargetRegistry};
pub use sequencer::transition::{
    AnimationKind, AnimationOutcome, Effect, TransitionId, TransitionPhase,
};
pub use tour::controller::{SpotlightTour, SubscriptionId, TourEvent};
pub use tour::state::{TourSnapshot, TourState, TourStatus};
