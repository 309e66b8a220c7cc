use crate::foundation::error::{TourError, TourResult};

pub use kurbo::{BezPath, Point, Rect, Size, Vec2};

/// Build a screen rectangle from `{x, y, width, height}`.
///
/// Sizes must be finite and non-negative; origins must be finite.
pub fn spot_rect(x: f64, y: f64, width: f64, height: f64) -> TourResult<Rect> {
    if !(x.is_finite() && y.is_finite()) {
        return Err(TourError::validation("spot origin must be finite"));
    }
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(TourError::validation(format!(
            "spot size must be finite and non-negative, got {width}x{height}"
        )));
    }
    Ok(Rect::from_origin_size((x, y), (width, height)))
}

/// JSON-facing `{x, y, width, height}` form of a screen rectangle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpotRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width, `>= 0`.
    pub width: f64,
    /// Height, `>= 0`.
    pub height: f64,
}

impl SpotRect {
    /// Validate and convert into a [`Rect`].
    pub fn to_rect(self) -> TourResult<Rect> {
        spot_rect(self.x, self.y, self.width, self.height)
    }
}

impl From<Rect> for SpotRect {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
        }
    }
}

/// Visible screen area the overlay covers.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in screen units.
    pub width: f64,
    /// Height in screen units.
    pub height: f64,
}

impl Viewport {
    /// Validated viewport; both sides must be finite and positive.
    pub fn new(width: f64, height: f64) -> TourResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(TourError::validation(format!(
                "viewport must be finite and > 0, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// The viewport as a rectangle at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 640.0,
        }
    }
}

/// Straight (non-premultiplied) RGBA8 colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black, the default mask tint.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Fully opaque colour.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Premultiply, scaling alpha by an extra `opacity` factor in `[0, 1]`.
    pub fn premultiplied(self, opacity: f64) -> Rgba8Premul {
        let a = (f64::from(self.a) * opacity.clamp(0.0, 1.0)).round() as u8;
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, a)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red, premultiplied.
    pub r: u8,
    /// Green, premultiplied.
    pub g: u8,
    /// Blue, premultiplied.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// All channels zero.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply straight RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
