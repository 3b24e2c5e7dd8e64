//! Sequence-driven straight-row detection.
//!
//! Applies when the operator's sequence tokens are reliable and the subset
//! classifies straight. Points are visited in token order; a least-squares
//! line is maintained per row and the row is split when the next point's
//! perpendicular deviation exceeds half the spacing or the traversal bearing
//! jumps.

use super::{build_row, mean_line_residual, residual_confidence, Detection, StrategyContext};
use crate::angle::{bearing, turn_angle};
use crate::math::pca::pca2;
use log::debug;

pub(crate) fn run(ctx: &StrategyContext) -> Option<Detection> {
    let order = ctx.stats.sequence_order.as_deref()?;
    if order.len() < 2 {
        return None;
    }
    let spacing = ctx.spacing();
    let split_dev = 0.5 * spacing;
    let split_turn = (2.0 * ctx.config.detect.gentle_turn_deg).to_radians();

    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = vec![order[0]];
    for &next in &order[1..] {
        if should_split(ctx.pts, &current, next, split_dev, split_turn) {
            rows.push(std::mem::take(&mut current));
        }
        current.push(next);
    }
    rows.push(current);

    let built: Vec<_> = rows
        .into_iter()
        .map(|r| build_row(ctx.pts, r, spacing))
        .collect();
    let residual = mean_line_residual(ctx.pts, &built);
    let singleton_share = built.iter().filter(|r| r.order.len() < 2).count() as f64
        / built.len() as f64;
    let confidence =
        residual_confidence(residual, spacing) * (1.0 - singleton_share) * super::coverage(&built, ctx.pts.len());
    debug!(
        "sequence-line: rows={} residual={:.3} confidence={:.3}",
        built.len(),
        residual,
        confidence
    );
    Some(Detection {
        rows: built,
        confidence,
        winding: false,
    })
}

fn should_split(
    pts: &[[f64; 2]],
    current: &[usize],
    next: usize,
    split_dev: f64,
    split_turn: f64,
) -> bool {
    if current.len() < 2 {
        return false;
    }
    let member_pts: Vec<[f64; 2]> = current.iter().map(|&i| pts[i]).collect();
    if let Some(pca) = pca2(&member_pts) {
        if pca.project(pts[next])[1].abs() > split_dev {
            return true;
        }
    }
    let a = pts[current[current.len() - 2]];
    let b = pts[current[current.len() - 1]];
    let prev_bearing = bearing(a, b);
    let next_bearing = bearing(b, pts[next]);
    turn_angle(prev_bearing, next_bearing).abs() > split_turn
}
