//! Cubic B-spline evaluation via Cox–de Boor recursion.
//!
//! The spline-fit strategy threads a clamped cubic B-spline through control
//! points sampled from the token-ordered holes and measures how far each hole
//! sits from the curve. Evaluation uses the textbook Cox–de Boor basis on a
//! clamped uniform knot vector; distances are measured against a dense
//! polyline sampling of the curve.

/// Clamped cubic B-spline over a fixed control polygon.
#[derive(Clone, Debug)]
pub struct BSpline {
    ctrl: Vec<[f64; 2]>,
    knots: Vec<f64>,
    degree: usize,
}

impl BSpline {
    /// Builds a clamped cubic spline (degree drops for short control
    /// polygons). `None` for fewer than two control points.
    pub fn clamped_cubic(ctrl: Vec<[f64; 2]>) -> Option<Self> {
        if ctrl.len() < 2 {
            return None;
        }
        let degree = 3.min(ctrl.len() - 1);
        let n = ctrl.len();
        let interior = n - degree;
        let mut knots = Vec::with_capacity(n + degree + 1);
        for _ in 0..=degree {
            knots.push(0.0);
        }
        for i in 1..interior {
            knots.push(i as f64 / interior as f64);
        }
        for _ in 0..=degree {
            knots.push(1.0);
        }
        Some(Self {
            ctrl,
            knots,
            degree,
        })
    }

    /// Cox–de Boor basis function N_{i,p}(t).
    fn basis(&self, i: usize, p: usize, t: f64) -> f64 {
        if p == 0 {
            let in_span = t >= self.knots[i] && t < self.knots[i + 1];
            // Close the final span so t = 1 is covered.
            let last = t >= 1.0 && (self.knots[i + 1] - 1.0).abs() < 1e-12 && self.knots[i] < 1.0;
            if in_span || last {
                1.0
            } else {
                0.0
            }
        } else {
            let mut acc = 0.0;
            let d1 = self.knots[i + p] - self.knots[i];
            if d1 > 1e-12 {
                acc += (t - self.knots[i]) / d1 * self.basis(i, p - 1, t);
            }
            let d2 = self.knots[i + p + 1] - self.knots[i + 1];
            if d2 > 1e-12 {
                acc += (self.knots[i + p + 1] - t) / d2 * self.basis(i + 1, p - 1, t);
            }
            acc
        }
    }

    /// Evaluates the curve at `t ∈ [0, 1]`.
    pub fn eval(&self, t: f64) -> [f64; 2] {
        let t = t.clamp(0.0, 1.0);
        let mut x = 0.0;
        let mut y = 0.0;
        for (i, c) in self.ctrl.iter().enumerate() {
            let b = self.basis(i, self.degree, t);
            x += b * c[0];
            y += b * c[1];
        }
        [x, y]
    }

    /// Densely samples the curve as a polyline.
    pub fn sample(&self, samples: usize) -> Vec<[f64; 2]> {
        let samples = samples.max(2);
        (0..samples)
            .map(|i| self.eval(i as f64 / (samples - 1) as f64))
            .collect()
    }

    /// Shortest distance from `p` to the sampled polyline.
    pub fn distance_to(&self, p: [f64; 2], samples: usize) -> f64 {
        let poly = self.sample(samples);
        let mut best = f64::INFINITY;
        for pair in poly.windows(2) {
            let d = point_segment_distance(p, pair[0], pair[1]);
            if d < best {
                best = d;
            }
        }
        best
    }
}

/// Distance from `p` to the segment `a`–`b`.
pub fn point_segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let abx = b[0] - a[0];
    let aby = b[1] - a[1];
    let len2 = abx * abx + aby * aby;
    if len2 < 1e-18 {
        return crate::angle::dist(p, a);
    }
    let t = (((p[0] - a[0]) * abx + (p[1] - a[1]) * aby) / len2).clamp(0.0, 1.0);
    crate::angle::dist(p, [a[0] + t * abx, a[1] + t * aby])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_clamped() {
        let spline =
            BSpline::clamped_cubic(vec![[0.0, 0.0], [1.0, 2.0], [2.0, -1.0], [3.0, 0.0]]).unwrap();
        let p0 = spline.eval(0.0);
        let p1 = spline.eval(1.0);
        assert!((p0[0]).abs() < 1e-9 && (p0[1]).abs() < 1e-9);
        assert!((p1[0] - 3.0).abs() < 1e-9 && (p1[1]).abs() < 1e-9);
    }

    #[test]
    fn straight_control_polygon_stays_straight() {
        let ctrl: Vec<[f64; 2]> = (0..6).map(|i| [i as f64, 0.0]).collect();
        let spline = BSpline::clamped_cubic(ctrl).unwrap();
        for i in 0..=10 {
            let p = spline.eval(i as f64 / 10.0);
            assert!(p[1].abs() < 1e-9, "off-line at t={}: {:?}", i, p);
        }
    }

    #[test]
    fn distance_to_curve_is_small_on_curve() {
        let spline =
            BSpline::clamped_cubic(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 1.0], [3.0, 0.0]]).unwrap();
        let on_curve = spline.eval(0.4);
        assert!(spline.distance_to(on_curve, 64) < 1e-3);
        assert!(spline.distance_to([0.0, 5.0], 64) > 3.0);
    }

    #[test]
    fn point_segment_distance_basic() {
        assert!((point_segment_distance([1.0, 1.0], [0.0, 0.0], [2.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!((point_segment_distance([-1.0, 0.0], [0.0, 0.0], [2.0, 0.0]) - 1.0).abs() < 1e-12);
    }
}
