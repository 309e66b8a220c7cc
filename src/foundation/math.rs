/// Round to the nearest integer with ties going toward positive infinity.
///
/// Matches the rounding host UI layers apply to layout coordinates, which differs from
/// [`f64::round`] for negative ties (`-2.5` rounds to `-2.0` here).
pub(crate) fn round_half_up(v: f64) -> f64 {
    let r = (v + 0.5).floor();
    // Keep `-0.0` out of placements.
    if r == 0.0 { 0.0 } else { r }
}

pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub(crate) fn is_finite_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}
