use std::time::Duration;

use crate::foundation::core::{Point, Rect};
use crate::foundation::math::lerp;
use crate::geometry::shape::SpotGeometry;
use crate::model::config::Timing;
use crate::model::step::Motion;

/// Linear interpolation between two values of the same type.
pub trait Lerp: Sized {
    /// Value `t` of the way from `a` to `b`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        lerp(*a, *b, t)
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.lerp(*b, t)
    }
}

impl Lerp for Rect {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Rect::new(
            lerp(a.x0, b.x0, t),
            lerp(a.y0, b.y0, t),
            lerp(a.x1, b.x1, t),
            lerp(a.y1, b.y1, t),
        )
    }
}

impl SpotGeometry {
    /// Interpolate between two cut-outs of the same kind.
    ///
    /// Returns `None` when the shapes differ; such moves snap instead of sliding.
    pub fn try_lerp(a: &Self, b: &Self, t: f64) -> Option<Self> {
        match (*a, *b) {
            (
                Self::Circle {
                    center: ca,
                    radius: ra,
                },
                Self::Circle {
                    center: cb,
                    radius: rb,
                },
            ) => Some(Self::Circle {
                center: <Point as Lerp>::lerp(&ca, &cb, t),
                radius: lerp(ra, rb, t),
            }),
            (
                Self::Rect {
                    rect: ra,
                    horizontal_radius: ha,
                    vertical_radius: va,
                },
                Self::Rect {
                    rect: rb,
                    horizontal_radius: hb,
                    vertical_radius: vb,
                },
            ) => Some(Self::Rect {
                rect: <Rect as Lerp>::lerp(&ra, &rb, t),
                horizontal_radius: lerp(ha, hb, t),
                vertical_radius: lerp(va, vb, t),
            }),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Overlay state at one instant of a spot move.
pub struct SpotFrame {
    /// Cut-out to draw.
    pub geometry: SpotGeometry,
    /// Overlay opacity multiplier in `[0, 1]`.
    pub opacity: f64,
    /// The tween has run its full duration.
    pub done: bool,
}

/// Frame-by-frame sampler for a spot move, for hosts without their own animation driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotTween {
    from: Option<SpotGeometry>,
    to: SpotGeometry,
    motion: Motion,
    timing: Timing,
}

impl SpotTween {
    /// Tween from the cut-out on screen (if any) to `to`.
    pub fn new(from: Option<SpotGeometry>, to: SpotGeometry, motion: Motion, timing: Timing) -> Self {
        Self {
            from,
            to,
            motion,
            timing,
        }
    }

    /// Total running time. Fading runs one timing for the fade-out and one for the fade-in.
    pub fn duration(&self) -> Duration {
        match self.motion {
            Motion::Sliding => self.timing.duration(),
            Motion::Fading => self.timing.duration() * 2,
        }
    }

    /// Overlay state `elapsed` into the move.
    pub fn sample(&self, elapsed: Duration) -> SpotFrame {
        let total = self.duration();
        let done = elapsed >= total;
        let frame = match self.motion {
            Motion::Sliding => self.sample_sliding(progress(elapsed, total)),
            Motion::Fading => self.sample_fading(elapsed),
        };
        SpotFrame { done, ..frame }
    }

    fn sample_sliding(&self, t: f64) -> SpotFrame {
        let te = self.timing.ease.apply(t);
        let (geometry, opacity) = match self.from {
            // First appearance: nothing to slide from, fade the overlay in.
            None => (self.to, te.clamp(0.0, 1.0)),
            Some(from) => match SpotGeometry::try_lerp(&from, &self.to, te) {
                Some(g) => (g, 1.0),
                None => (self.to, 1.0),
            },
        };
        SpotFrame {
            geometry,
            opacity,
            done: false,
        }
    }

    fn sample_fading(&self, elapsed: Duration) -> SpotFrame {
        let half = self.timing.duration();
        let (geometry, opacity) = if elapsed < half {
            let out = self.timing.ease.apply(progress(elapsed, half));
            match self.from {
                Some(from) => (from, 1.0 - out),
                None => (self.to, 0.0),
            }
        } else {
            let t = progress(elapsed.saturating_sub(half), half);
            (self.to, self.timing.ease.apply(t))
        };
        SpotFrame {
            geometry,
            opacity,
            done: false,
        }
    }
}

/// Tooltip opacity `elapsed` into a fade.
pub fn tip_opacity(elapsed: Duration, timing: Timing, fading_in: bool) -> f64 {
    let t = timing.ease.apply(progress(elapsed, timing.duration()));
    if fading_in { t } else { 1.0 - t }
}

fn progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
