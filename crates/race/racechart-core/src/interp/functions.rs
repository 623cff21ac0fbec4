//! Interpolation helpers:
//! - lerp (scalar blend)
//! - nearest_unit (integer detection under a tolerance)
//! - ease_multiplier (speed profile over range progress)

use crate::config::Easing;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// The integer `t` rounds to, if it lies within `tolerance` of it.
#[inline]
pub fn nearest_unit(t: f64, tolerance: f64) -> Option<i32> {
    let r = t.round();
    ((t - r).abs() <= tolerance).then_some(r as i32)
}

/// Largest tolerance honored for integer detection.
pub const MAX_TIME_TOLERANCE: f64 = 1e-3;

/// Tolerance actually used: absolute, at most [`MAX_TIME_TOLERANCE`], zero when not finite.
#[inline]
pub fn clamp_tolerance(tolerance: f64) -> f64 {
    if tolerance.is_finite() {
        tolerance.abs().min(MAX_TIME_TOLERANCE)
    } else {
        0.0
    }
}

/// Multiplier applied to nominal speed at `progress` in [0, 1].
///
/// `Sine { floor }` yields `floor` at both ends and 1.0 mid-range.
/// The floor is clamped to [0.01, 1] so playback always makes progress.
#[inline]
pub fn ease_multiplier(easing: Easing, progress: f64) -> f64 {
    match easing {
        Easing::Linear => 1.0,
        Easing::Sine { floor } => {
            let floor = if floor.is_finite() {
                floor.clamp(0.01, 1.0)
            } else {
                1.0
            };
            let p = progress.clamp(0.0, 1.0);
            floor + (1.0 - floor) * (std::f64::consts::PI * p).sin()
        }
    }
}
