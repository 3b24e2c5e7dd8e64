//! Last-resort strategies. `backbone` still tries to find structure by
//! chaining connectivity components and breaking the chain at corners of
//! its simplified backbone; `single_row` unconditionally emits the whole
//! subset as one chained row so detection always terminates with an answer.

use log::debug;

use super::{build_row, Detection, StrategyContext};
use crate::angle::{bearing, dist, turn_angle};
use crate::graph::{connected_components, nn_chain_order};
use crate::math::median;
use crate::math::simplify::simplify_polyline;

pub(crate) fn backbone(ctx: &StrategyContext) -> Option<Detection> {
    let pts = ctx.pts;
    if pts.len() < 3 {
        return None;
    }
    let spacing = ctx.spacing();
    let labels = connected_components(pts, 2.0 * spacing);
    let component_count = labels.iter().max().map_or(0, |m| m + 1);
    let corner = (2.0 * ctx.config.detect.gentle_turn_deg).to_radians();

    let mut rows = Vec::new();
    for c in 0..component_count {
        let members: Vec<usize> = (0..pts.len()).filter(|&i| labels[i] == c).collect();
        let chain: Vec<usize> = {
            let member_pts: Vec<[f64; 2]> = members.iter().map(|&i| pts[i]).collect();
            nn_chain_order(&member_pts)
                .into_iter()
                .map(|k| members[k])
                .collect()
        };
        if chain.len() < 2 {
            rows.push(build_row(pts, chain, spacing));
            continue;
        }
        // Corners of the simplified backbone split the chain into rows.
        let poly: Vec<[f64; 2]> = chain.iter().map(|&i| pts[i]).collect();
        let kept = simplify_polyline(&poly, 0.75 * spacing);
        let mut cuts = Vec::new();
        for w in kept.windows(3) {
            let b_in = bearing(poly[w[0]], poly[w[1]]);
            let b_out = bearing(poly[w[1]], poly[w[2]]);
            if turn_angle(b_in, b_out).abs() > corner {
                cuts.push(w[1]);
            }
        }
        let mut start = 0;
        for cut in cuts {
            rows.push(build_row(pts, chain[start..=cut].to_vec(), spacing));
            start = cut + 1;
        }
        if start < chain.len() {
            rows.push(build_row(pts, chain[start..].to_vec(), spacing));
        }
    }
    debug!(
        "backbone: {} components -> {} rows",
        component_count,
        rows.len()
    );
    if rows.is_empty() {
        return None;
    }
    let confidence = 0.5 * chain_regularity(pts, &rows);
    Some(Detection {
        rows,
        confidence,
        winding: false,
    })
}

/// The unconditional terminator: every point in one chained row.
pub(crate) fn single_row(ctx: &StrategyContext) -> Detection {
    let pts = ctx.pts;
    let spacing = ctx.spacing();
    let members: Vec<usize> = nn_chain_order(pts);
    Detection {
        rows: vec![build_row(pts, members, spacing)],
        confidence: 0.25,
        winding: false,
    }
}

fn chain_regularity(pts: &[[f64; 2]], rows: &[super::DetectedRow]) -> f64 {
    let mut steps = Vec::new();
    for row in rows {
        for w in row.order.windows(2) {
            steps.push(dist(pts[w[0]], pts[w[1]]));
        }
    }
    if steps.is_empty() {
        return 1.0;
    }
    let max = steps.iter().cloned().fold(0.0f64, f64::max);
    if max <= 0.0 {
        return 1.0;
    }
    steps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    median(&steps) / max
}
