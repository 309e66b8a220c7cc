//! Tooltip placement around a resolved cut-out.

use crate::foundation::core::{Point, Size, Viewport};
use crate::foundation::math::round_half_up;
use crate::geometry::shape::SpotGeometry;
use crate::model::step::{AlignTo, Position};

/// Gap between a rectangle cut-out and a tooltip above or below it.
pub const RECT_TIP_GAP: f64 = 10.0;
/// Gap between a circular cut-out and a tooltip above or below it, as a percentage.
pub const SPOTLIGHT_TIP_GAP_PERCENT: f64 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
/// Margin length as the host layout understands it.
pub enum Margin {
    /// Absolute units.
    Px(f64),
    /// Percentage of the containing width.
    Percent(f64),
}

impl Margin {
    /// Resolve to absolute units against `container_width`.
    pub fn resolve(self, container_width: f64) -> f64 {
        match self {
            Self::Px(v) => v,
            Self::Percent(p) => container_width * p / 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(tag = "side", content = "margin", rename_all = "snake_case")]
/// Extra margin on one side of the tooltip box.
pub enum TipMargin {
    #[default]
    /// No extra margin.
    None,
    /// Margin above the box.
    Top(Margin),
    /// Margin below the box.
    Bottom(Margin),
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Tooltip top-left placement, rounded to whole units.
pub struct TipPlacement {
    /// Left edge.
    pub left: f64,
    /// Top edge, before `margin`.
    pub top: f64,
    /// Deferred margin the host applies.
    pub margin: TipMargin,
}

impl TipPlacement {
    /// Absolute top-left once the margin is applied.
    ///
    /// A bottom margin pushes the box up, matching how an absolutely positioned box with a
    /// bottom margin is laid out when anchored by its top.
    pub fn resolved_origin(&self, viewport: Viewport) -> Point {
        let dy = match self.margin {
            TipMargin::None => 0.0,
            TipMargin::Top(m) => m.resolve(viewport.width),
            TipMargin::Bottom(m) => -m.resolve(viewport.width),
        };
        Point::new(self.left, round_half_up(self.top + dy))
    }
}

/// Place a tooltip of `tip` size on `position`'s side of `geometry`.
///
/// Circular cut-outs use the spotlight policy (percentage gap above/below), rectangular ones a
/// fixed [`RECT_TIP_GAP`].
pub fn tip_placement(
    geometry: &SpotGeometry,
    tip: Size,
    position: Position,
    align_to: AlignTo,
    viewport_width: f64,
) -> TipPlacement {
    let centered_left = |anchor_x: f64| match align_to {
        AlignTo::Spot => anchor_x - tip.width / 2.0,
        AlignTo::Center => (viewport_width - tip.width) / 2.0,
    };

    let (left, top, margin) = match *geometry {
        SpotGeometry::Circle { center, radius } => {
            let gap = Margin::Percent(SPOTLIGHT_TIP_GAP_PERCENT);
            match position {
                Position::Bottom => (
                    centered_left(center.x),
                    center.y + radius,
                    TipMargin::Top(gap),
                ),
                Position::Top => (
                    centered_left(center.x),
                    center.y - radius - tip.height,
                    TipMargin::Bottom(gap),
                ),
                Position::Left => (
                    center.x - radius - tip.width,
                    center.y - tip.height / 2.0,
                    TipMargin::None,
                ),
                Position::Right => (
                    center.x + radius,
                    center.y - tip.height / 2.0,
                    TipMargin::None,
                ),
            }
        }
        SpotGeometry::Rect { rect, .. } => {
            let mid = rect.center();
            match position {
                Position::Bottom => (
                    centered_left(mid.x),
                    rect.y1,
                    TipMargin::Top(Margin::Px(RECT_TIP_GAP)),
                ),
                Position::Top => (
                    centered_left(mid.x),
                    rect.y0 - tip.height - RECT_TIP_GAP,
                    TipMargin::None,
                ),
                Position::Left => (rect.x0 - tip.width, mid.y - tip.height / 2.0, TipMargin::None),
                Position::Right => (rect.x1, mid.y - tip.height / 2.0, TipMargin::None),
            }
        }
    };

    TipPlacement {
        left: round_half_up(left),
        top: round_half_up(top),
        margin,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/placement.rs"]
mod tests;
