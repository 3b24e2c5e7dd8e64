//! Least-squares circle fit (Kåsa) for local curvature estimation.
//!
//! The classifier fits a circle through each hole's nearest neighbours and
//! reads curvature as 1/radius. The Kåsa formulation reduces to one linear
//! 3×3 normal-equation solve, which keeps degenerate (near-collinear)
//! neighbourhoods well behaved: the solve fails or yields a huge radius, and
//! both map to zero curvature.

use nalgebra::{Matrix3, Vector3};

#[derive(Clone, Copy, Debug)]
pub struct CircleFit {
    pub center: [f64; 2],
    pub radius: f64,
}

impl CircleFit {
    /// Curvature magnitude 1/r, saturating to 0 for near-infinite radius.
    pub fn curvature(&self) -> f64 {
        if self.radius.is_finite() && self.radius > 1e-9 {
            1.0 / self.radius
        } else {
            0.0
        }
    }
}

/// Fits `x² + y² + D·x + E·y + F = 0` by least squares. `None` for fewer
/// than three points or a singular system (collinear input).
pub fn fit_circle(pts: &[[f64; 2]]) -> Option<CircleFit> {
    if pts.len() < 3 {
        return None;
    }
    let mut a11 = 0.0;
    let mut a12 = 0.0;
    let mut a13 = 0.0;
    let mut a22 = 0.0;
    let mut a23 = 0.0;
    let mut b1 = 0.0;
    let mut b2 = 0.0;
    let mut b3 = 0.0;
    let n = pts.len() as f64;
    for p in pts {
        let [x, y] = *p;
        let s = x * x + y * y;
        a11 += x * x;
        a12 += x * y;
        a13 += x;
        a22 += y * y;
        a23 += y;
        b1 += -s * x;
        b2 += -s * y;
        b3 += -s;
    }
    let a = Matrix3::new(a11, a12, a13, a12, a22, a23, a13, a23, n);
    let b = Vector3::new(b1, b2, b3);
    let sol = a.lu().solve(&b)?;
    let d = sol[0];
    let e = sol[1];
    let f = sol[2];
    let cx = -d / 2.0;
    let cy = -e / 2.0;
    let r2 = cx * cx + cy * cy - f;
    if !r2.is_finite() || r2 <= 0.0 {
        return None;
    }
    Some(CircleFit {
        center: [cx, cy],
        radius: r2.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_circle() {
        let pts: Vec<[f64; 2]> = (0..8)
            .map(|i| {
                let t = i as f64 * std::f64::consts::PI / 4.0;
                [3.0 + 5.0 * t.cos(), -2.0 + 5.0 * t.sin()]
            })
            .collect();
        let fit = fit_circle(&pts).unwrap();
        assert!((fit.center[0] - 3.0).abs() < 1e-9);
        assert!((fit.center[1] + 2.0).abs() < 1e-9);
        assert!((fit.radius - 5.0).abs() < 1e-9);
        assert!((fit.curvature() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn collinear_points_do_not_panic() {
        let pts: Vec<[f64; 2]> = (0..5).map(|i| [i as f64, 2.0 * i as f64]).collect();
        match fit_circle(&pts) {
            None => {}
            Some(fit) => assert!(fit.curvature() < 1e-6, "radius={}", fit.radius),
        }
    }
}
