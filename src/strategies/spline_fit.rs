//! Sequence-driven curved-row detection via cubic B-spline fitting.
//!
//! Applies when sequence tokens are reliable and the subset classifies
//! curved. Points are visited in token order and first split into candidate
//! rows on large spatial jumps or bearing reversals; each row then gets a
//! clamped cubic B-spline threaded through sampled control points, and the
//! distance of every hole to its row spline drives the confidence.

use super::{coverage, Detection, StrategyContext};
use crate::angle::{bearing, dist, turn_angle};
use crate::math::spline::BSpline;
use log::debug;

/// Polyline sampling density for distance-to-spline queries.
const SPLINE_SAMPLES: usize = 64;

pub(crate) fn run(ctx: &StrategyContext) -> Option<Detection> {
    let order = ctx.stats.sequence_order.as_deref()?;
    if order.len() < 4 {
        return None;
    }
    let spacing = ctx.spacing();
    let jump = 2.0 * spacing;
    let reversal = ctx.config.detect.reversal_deg.to_radians();

    // Coarse row split on jumps/reversals along the token order.
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut current = vec![order[0]];
    for &next in &order[1..] {
        let split = if current.len() < 2 {
            dist(ctx.pts[*current.last().unwrap()], ctx.pts[next]) > jump
        } else {
            let a = ctx.pts[current[current.len() - 2]];
            let b = ctx.pts[current[current.len() - 1]];
            let step = dist(b, ctx.pts[next]);
            let turn = turn_angle(bearing(a, b), bearing(b, ctx.pts[next])).abs();
            step > jump || turn > reversal
        };
        if split {
            rows.push(std::mem::take(&mut current));
        }
        current.push(next);
    }
    rows.push(current);

    let mut built = Vec::with_capacity(rows.len());
    let mut residual_sum = 0.0;
    let mut residual_count = 0usize;
    for row in rows {
        if row.len() >= 4 {
            let ordered_pts: Vec<[f64; 2]> = row.iter().map(|&i| ctx.pts[i]).collect();
            if let Some(spline) = BSpline::clamped_cubic(control_points(&ordered_pts)) {
                for p in &ordered_pts {
                    residual_sum += spline.distance_to(*p, SPLINE_SAMPLES);
                    residual_count += 1;
                }
            }
        }
        // Token-ordered curved sets can still contain straight rows; the
        // line-fit verdict in build_row decides per row.
        built.push(super::build_row(ctx.pts, row, spacing));
    }

    let mean_residual = if residual_count == 0 {
        return None;
    } else {
        residual_sum / residual_count as f64
    };
    let confidence = (1.0 - mean_residual / (0.5 * spacing)).clamp(0.0, 1.0)
        * coverage(&built, ctx.pts.len());
    debug!(
        "spline-fit: rows={} residual={:.3} confidence={:.3}",
        built.len(),
        mean_residual,
        confidence
    );
    Some(Detection {
        rows: built,
        confidence,
        winding: false,
    })
}

/// Samples roughly eight control points along the ordered row, always
/// keeping both endpoints.
fn control_points(ordered: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let stride = (ordered.len() / 8).max(1);
    let mut ctrl: Vec<[f64; 2]> = ordered.iter().step_by(stride).copied().collect();
    if let Some(&last) = ordered.last() {
        if ctrl.last() != Some(&last) {
            ctrl.push(last);
        }
    }
    ctrl
}
