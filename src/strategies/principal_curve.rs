//! Principal-curve extraction (Hastie–Stuetzle iteration).
//!
//! Used when sequence tokens are unreliable and the subset shows high
//! curvature: a single curved row whose order must be recovered from
//! geometry alone. The curve initialises from the first principal axis and
//! alternates {LOESS-smooth the coordinates over the arc parameter,
//! reproject points onto the smoothed polyline} until movement drops below
//! the convergence delta or the iteration cap is hit; the best intermediate
//! state (lowest residual) is returned in that case.

use super::{build_row, residual_confidence, Detection, StrategyContext};
use crate::math::loess::loess_smooth;
use crate::math::pca::pca2;
use crate::math::spline::point_segment_distance;
use log::debug;

const MAX_ITERATIONS: usize = 20;
const LOESS_FRACTION: f64 = 0.3;

pub(crate) fn run(ctx: &StrategyContext) -> Option<Detection> {
    let pts = ctx.pts;
    if pts.len() < 5 {
        return None;
    }
    let spacing = ctx.spacing();
    let pca = pca2(pts)?;
    let convergence = 1e-3 * spacing;

    // Arc parameter per point, seeded from the along-axis projection.
    let mut t: Vec<f64> = pts.iter().map(|p| pca.project(*p)[0]).collect();
    let mut best_order: Option<Vec<usize>> = None;
    let mut best_residual = f64::INFINITY;
    let mut prev_curve: Option<Vec<[f64; 2]>> = None;

    for iteration in 0..MAX_ITERATIONS {
        let xs: Vec<f64> = pts.iter().map(|p| p[0]).collect();
        let ys: Vec<f64> = pts.iter().map(|p| p[1]).collect();
        let sx = loess_smooth(&t, &xs, LOESS_FRACTION);
        let sy = loess_smooth(&t, &ys, LOESS_FRACTION);

        let mut order: Vec<usize> = (0..pts.len()).collect();
        order.sort_by(|&a, &b| {
            t[a].partial_cmp(&t[b])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        let polyline: Vec<[f64; 2]> = order.iter().map(|&i| [sx[i], sy[i]]).collect();

        // Reproject every point onto the smoothed polyline.
        let mut residual_sum = 0.0;
        for (i, p) in pts.iter().enumerate() {
            let (arc, d) = project_onto_polyline(&polyline, *p);
            t[i] = arc;
            residual_sum += d;
        }
        let residual = residual_sum / pts.len() as f64;
        if residual < best_residual {
            best_residual = residual;
            best_order = Some(order.clone());
        }

        let movement = match &prev_curve {
            Some(prev) => {
                let sum: f64 = prev
                    .iter()
                    .zip(&polyline)
                    .map(|(a, b)| crate::angle::dist(*a, *b))
                    .sum();
                sum / polyline.len() as f64
            }
            None => f64::INFINITY,
        };
        prev_curve = Some(polyline);
        if movement < convergence {
            debug!(
                "principal-curve: converged after {} iteration(s), residual={:.4}",
                iteration + 1,
                residual
            );
            break;
        }
    }

    let order = best_order?;
    let confidence = residual_confidence(best_residual, spacing);
    debug!(
        "principal-curve: residual={:.3} confidence={:.3}",
        best_residual, confidence
    );
    Some(Detection {
        rows: vec![build_row(pts, order, spacing)],
        confidence,
        winding: false,
    })
}

/// Arc-length parameter and distance of the closest point on a polyline.
fn project_onto_polyline(poly: &[[f64; 2]], p: [f64; 2]) -> (f64, f64) {
    if poly.len() < 2 {
        return (0.0, crate::angle::dist(poly.first().copied().unwrap_or(p), p));
    }
    let mut best_d = f64::INFINITY;
    let mut best_arc = 0.0;
    let mut arc_before = 0.0;
    for pair in poly.windows(2) {
        let [a, b] = [pair[0], pair[1]];
        let seg_len = crate::angle::dist(a, b);
        let d = point_segment_distance(p, a, b);
        if d < best_d {
            best_d = d;
            // Parameter of the projection within this segment.
            let abx = b[0] - a[0];
            let aby = b[1] - a[1];
            let len2 = (abx * abx + aby * aby).max(1e-18);
            let s = (((p[0] - a[0]) * abx + (p[1] - a[1]) * aby) / len2).clamp(0.0, 1.0);
            best_arc = arc_before + s * seg_len;
        }
        arc_before += seg_len;
    }
    (best_arc, best_d)
}

#[cfg(test)]
mod tests {
    use crate::analysis::{analyze_point_set, classify};
    use crate::config::DetectorConfig;
    use crate::strategies::StrategyContext;
    use crate::types::RowShape;

    #[test]
    fn arc_without_tokens_recovers_arc_order() {
        let pts: Vec<[f64; 2]> = (0..20)
            .map(|i| {
                let t = 2.0 * std::f64::consts::FRAC_PI_3 * i as f64 / 19.0;
                [50.0 * t.cos(), 50.0 * t.sin()]
            })
            .collect();
        let stats = analyze_point_set(&pts, &vec![None; 20]);
        let cfg = DetectorConfig::default();
        let classification = classify(&pts, stats.median_spacing, &cfg);
        let ctx = StrategyContext {
            pts: &pts,
            stats: &stats,
            classification: &classification,
            config: &cfg,
        };
        let det = super::run(&ctx).expect("detection");
        assert_eq!(det.rows.len(), 1);
        let order = &det.rows[0].order;
        let fwd: Vec<usize> = (0..20).collect();
        let rev: Vec<usize> = (0..20).rev().collect();
        assert!(order == &fwd || order == &rev, "order={order:?}");
        assert_eq!(det.rows[0].shape, RowShape::Curved);
        assert!(det.confidence > 0.6, "confidence={}", det.confidence);
    }
}
