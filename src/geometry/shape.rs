//! Spotlight cut-out geometry derived from a measured spot.

use kurbo::{Circle, Shape as _};

use crate::foundation::core::{BezPath, Point, Rect, Viewport};
use crate::model::step::{Shape, ShapeProperties};

/// Margin factor so a circular cut-out clears the target's corners.
pub const SPOTLIGHT_MARGIN: f64 = 1.15;

const BEZ_TOLERANCE: f64 = 0.1;
// Cubic approximation constant for a quarter ellipse.
const KAPPA: f64 = 0.552_284_749_831;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Resolved cut-out for one spot.
pub enum SpotGeometry {
    /// Circle centred on the spot.
    Circle {
        /// Spot centre.
        center: Point,
        /// Radius including [`SPOTLIGHT_MARGIN`].
        radius: f64,
    },
    /// Rectangle grown by the border width.
    Rect {
        /// Padded rectangle.
        rect: Rect,
        /// Horizontal corner radius.
        horizontal_radius: f64,
        /// Vertical corner radius.
        vertical_radius: f64,
    },
}

/// Compute the cut-out for `spot` under `shape`.
pub fn spot_geometry(spot: Rect, shape: Shape, props: &ShapeProperties) -> SpotGeometry {
    match shape {
        Shape::Spotlight => SpotGeometry::Circle {
            center: spot.center(),
            radius: spot.width().max(spot.height()) / 2.0 * SPOTLIGHT_MARGIN,
        },
        Shape::Rectangle => SpotGeometry::Rect {
            rect: spot.inflate(props.border_width, props.border_width),
            horizontal_radius: props.horizontal_radius,
            vertical_radius: props.vertical_radius,
        },
    }
}

impl SpotGeometry {
    /// Shape this cut-out was built for.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Circle { .. } => Shape::Spotlight,
            Self::Rect { .. } => Shape::Rectangle,
        }
    }

    /// Axis-aligned bounds of the cut-out.
    pub fn bounds(&self) -> Rect {
        match *self {
            Self::Circle { center, radius } => Circle::new(center, radius).bounding_box(),
            Self::Rect { rect, .. } => rect,
        }
    }

    /// Centre of the cut-out.
    pub fn center(&self) -> Point {
        match *self {
            Self::Circle { center, .. } => center,
            Self::Rect { rect, .. } => rect.center(),
        }
    }

    /// Outline of the cut-out alone.
    pub fn outline(&self) -> BezPath {
        match *self {
            Self::Circle { center, radius } => Circle::new(center, radius).to_path(BEZ_TOLERANCE),
            Self::Rect {
                rect,
                horizontal_radius,
                vertical_radius,
            } => rounded_rect_path(rect, horizontal_radius, vertical_radius),
        }
    }

    /// Dimmed overlay covering `viewport` with this cut-out removed.
    ///
    /// Fill with the even-odd rule.
    pub fn mask_path(&self, viewport: Viewport) -> BezPath {
        let mut path = viewport.rect().to_path(BEZ_TOLERANCE);
        path.extend(self.outline().elements().iter().copied());
        path
    }
}

fn rounded_rect_path(rect: Rect, rx: f64, ry: f64) -> BezPath {
    let rx = rx.clamp(0.0, rect.width() / 2.0);
    let ry = ry.clamp(0.0, rect.height() / 2.0);
    if rx == 0.0 || ry == 0.0 {
        return rect.to_path(BEZ_TOLERANCE);
    }

    let (x0, y0, x1, y1) = (rect.x0, rect.y0, rect.x1, rect.y1);
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let mut p = BezPath::new();
    p.move_to((x0 + rx, y0));
    p.line_to((x1 - rx, y0));
    p.curve_to((x1 - rx + kx, y0), (x1, y0 + ry - ky), (x1, y0 + ry));
    p.line_to((x1, y1 - ry));
    p.curve_to((x1, y1 - ry + ky), (x1 - rx + kx, y1), (x1 - rx, y1));
    p.line_to((x0 + rx, y1));
    p.curve_to((x0 + rx - kx, y1), (x0, y1 - ry + ky), (x0, y1 - ry));
    p.line_to((x0, y0 + ry));
    p.curve_to((x0, y0 + ry - ky), (x0 + rx - kx, y0), (x0 + rx, y0));
    p.close_path();
    p
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/shape.rs"]
mod tests;
