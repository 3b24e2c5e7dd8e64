//! Winding (snake) detection: one continuously curving row that folds back
//! on itself, e.g. a trench line drilled as a single serpentine pass.
//!
//! The point set is ordered as a nearest-neighbour chain and scanned with a
//! short sliding window; a window whose accumulated signed turn crosses the
//! configured snake angle counts as one fold. Two or more folds make the
//! pattern winding. Grids never qualify: their points have side neighbours
//! at row spacing, which fails the chain-degree test up front.

use log::debug;

use super::{Detection, DetectedRow, StrategyContext};
use crate::angle::{bearing, dist, turn_angle};
use crate::graph::nn_chain_order;
use crate::types::RowShape;

/// Window length (in chain points) over which turns accumulate.
const FOLD_WINDOW: usize = 4;
/// Minimum share of points with at most two close neighbours.
const CHAIN_DEGREE_SHARE: f64 = 0.9;

pub(crate) fn run(ctx: &StrategyContext) -> Option<Detection> {
    let pts = ctx.pts;
    if pts.len() < 2 * FOLD_WINDOW {
        return None;
    }
    let spacing = ctx.spacing();

    // A winding pattern is a one-dimensional chain: almost every point has
    // at most two neighbours within reach. Grid interiors have four.
    let reach = 1.3 * spacing;
    let chain_like = pts
        .iter()
        .filter(|p| {
            pts.iter().filter(|q| dist(**p, **q) <= reach).count() <= 3
        })
        .count();
    if (chain_like as f64) < CHAIN_DEGREE_SHARE * pts.len() as f64 {
        return None;
    }

    let order = nn_chain_order(pts);
    let steps: Vec<f64> = order
        .windows(2)
        .map(|w| dist(pts[w[0]], pts[w[1]]))
        .collect();
    // A chain jump means the greedy walk left the curve; not a single snake.
    if steps.iter().any(|&s| s > 3.0 * spacing) {
        return None;
    }

    let bearings: Vec<f64> = order
        .windows(2)
        .map(|w| bearing(pts[w[0]], pts[w[1]]))
        .collect();
    let snake_angle = ctx.config.detect.snake_angle_deg.to_radians();
    let mut folds = 0usize;
    let mut i = 0;
    while i + FOLD_WINDOW - 1 < bearings.len() {
        let mut acc = 0.0;
        for j in i..i + FOLD_WINDOW - 1 {
            acc += turn_angle(bearings[j], bearings[j + 1]);
        }
        if acc.abs() >= snake_angle {
            folds += 1;
            i += FOLD_WINDOW; // folds do not overlap
        } else {
            i += 1;
        }
    }
    debug!("winding: {} folds over {} chain points", folds, order.len());
    if folds < 2 {
        return None;
    }

    let max_step = steps.iter().cloned().fold(0.0f64, f64::max);
    let mut sorted = steps;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let regularity = if max_step > 0.0 {
        crate::math::median(&sorted) / max_step
    } else {
        1.0
    };
    let direction = {
        let first = pts[order[0]];
        let last = pts[order[order.len() - 1]];
        let dx = last[0] - first[0];
        let dy = last[1] - first[1];
        let norm = (dx * dx + dy * dy).sqrt().max(1e-9);
        [dx / norm, dy / norm]
    };
    Some(Detection {
        rows: vec![DetectedRow {
            order,
            shape: RowShape::Winding,
            direction,
        }],
        confidence: regularity * (chain_like as f64 / pts.len() as f64),
        winding: true,
    })
}

#[cfg(test)]
mod tests {
    use crate::analysis::{analyze_point_set, classify};
    use crate::config::DetectorConfig;
    use crate::strategies::StrategyContext;

    fn run_on(pts: &[[f64; 2]]) -> Option<super::Detection> {
        let stats = analyze_point_set(pts, &vec![None; pts.len()]);
        let cfg = DetectorConfig::default();
        let classification = classify(pts, stats.median_spacing, &cfg);
        let ctx = StrategyContext {
            pts,
            stats: &stats,
            classification: &classification,
            config: &cfg,
        };
        super::run(&ctx)
    }

    /// S-shaped single pass: three limbs of 6 points joined by hairpins,
    /// limbs a generous 9 units apart so side neighbours stay out of reach.
    fn snake() -> Vec<[f64; 2]> {
        let mut pts = Vec::new();
        for i in 0..6 {
            pts.push([3.0 * i as f64, 0.0]);
        }
        pts.push([17.0, 3.0]);
        pts.push([17.0, 6.0]);
        for i in (0..6).rev() {
            pts.push([3.0 * i as f64, 9.0]);
        }
        pts.push([-2.0, 12.0]);
        pts.push([-2.0, 15.0]);
        for i in 0..6 {
            pts.push([3.0 * i as f64, 18.0]);
        }
        pts
    }

    #[test]
    fn snake_is_one_winding_row() {
        let pts = snake();
        let det = run_on(&pts).expect("detection");
        assert!(det.winding);
        assert_eq!(det.rows.len(), 1);
        assert_eq!(det.rows[0].order.len(), pts.len());
        assert_eq!(det.rows[0].shape, crate::types::RowShape::Winding);
    }

    #[test]
    fn grid_is_rejected() {
        let pts: Vec<[f64; 2]> = (0..20)
            .map(|i| [3.0 * (i % 5) as f64, 3.0 * (i / 5) as f64])
            .collect();
        assert!(run_on(&pts).is_none());
    }

    #[test]
    fn straight_line_is_not_winding() {
        let pts: Vec<[f64; 2]> = (0..12).map(|i| [3.0 * i as f64, 0.0]).collect();
        assert!(run_on(&pts).is_none());
    }
}
