//! Angle utilities used across the detection pipeline.
//!
//! Row orientations are ambiguous modulo π (a row has no inherent direction),
//! while traversal bearings are full-circle. Helpers for both live here.

use std::f64::consts::PI;

/// Normalizes an orientation into the range [0, π).
#[inline]
pub fn normalize_half_pi(angle: f64) -> f64 {
    let norm = angle.rem_euclid(PI);
    if norm >= PI - 1e-9 {
        0.0
    } else {
        norm
    }
}

/// Smallest unsigned difference between two orientations, treating antipodal
/// directions as equivalent (π apart → 0). Result lies in [0, π/2].
#[inline]
pub fn orientation_difference(a: f64, b: f64) -> f64 {
    let mut diff = (a - b).abs();
    if diff > PI {
        diff = diff.rem_euclid(PI);
    }
    if diff > PI / 2.0 {
        PI - diff
    } else {
        diff
    }
}

/// Full-circle bearing of the vector `from → to`, in (-π, π].
#[inline]
pub fn bearing(from: [f64; 2], to: [f64; 2]) -> f64 {
    (to[1] - from[1]).atan2(to[0] - from[0])
}

/// Signed turn from bearing `a` to bearing `b`, wrapped into (-π, π].
#[inline]
pub fn turn_angle(a: f64, b: f64) -> f64 {
    let mut d = b - a;
    while d > PI {
        d -= 2.0 * PI;
    }
    while d <= -PI {
        d += 2.0 * PI;
    }
    d
}

/// Circular mean of orientations taken modulo π, via angle doubling.
/// Returns a value in [0, π). `None` when the input is empty or the
/// resultant vector is degenerate (uniformly spread orientations).
pub fn circular_mean_half_pi(angles: &[f64]) -> Option<f64> {
    if angles.is_empty() {
        return None;
    }
    let mut sx = 0.0;
    let mut sy = 0.0;
    for &a in angles {
        sx += (2.0 * a).cos();
        sy += (2.0 * a).sin();
    }
    let norm = (sx * sx + sy * sy).sqrt();
    if norm < 1e-9 {
        return None;
    }
    Some(normalize_half_pi(sy.atan2(sx) / 2.0))
}

/// Euclidean distance between two planar points.
#[inline]
pub fn dist(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}
