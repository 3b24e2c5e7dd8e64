//! Row tracing over a k-NN graph by least-bearing-deviation stepping.
//!
//! Preferred when serpentine cues are present: rows are traced one at a time
//! from low-degree endpoints, always stepping to the unvisited neighbour that
//! deviates least from the current bearing. A row ends when the best step
//! would turn more than the gentle-turn threshold; a reversal beyond the
//! reversal threshold marks a serpentine turn point and likewise closes the
//! row without consuming the turn target.

use super::{
    build_row, coverage, mean_line_residual, residual_confidence, Detection, DetectedRow,
    StrategyContext,
};
use crate::angle::{bearing, dist, normalize_half_pi, orientation_difference, turn_angle};
use crate::graph::knn_indices;
use crate::math::pca::pca2;
use log::debug;

pub(crate) fn run(ctx: &StrategyContext) -> Option<Detection> {
    let pts = ctx.pts;
    let n = pts.len();
    if n < 4 {
        return None;
    }
    let spacing = ctx.spacing();
    let k = ctx.knn_k();
    let nbrs = knn_indices(pts, k);
    let gentle = ctx.config.detect.gentle_turn_deg.to_radians();
    let step_limit = ctx.config.validate.gap_factor * spacing;

    // Degree = neighbours within 1.5× spacing; endpoints have low degree.
    let degree: Vec<usize> = (0..n)
        .map(|i| {
            nbrs[i]
                .iter()
                .filter(|&&j| dist(pts[i], pts[j]) <= 1.5 * spacing)
                .count()
        })
        .collect();
    let mut seeds: Vec<usize> = (0..n).collect();
    seeds.sort_by(|&a, &b| degree[a].cmp(&degree[b]).then(a.cmp(&b)));

    // Rows should open along the dominant orientation; without it a corner
    // seed could start down a column instead of along its row.
    let row_orientation = ctx
        .classification
        .clusters
        .first()
        .map(|c| c.orientation)
        .or_else(|| pca2(pts).map(|p| normalize_half_pi(p.axis[1].atan2(p.axis[0]))));

    let mut visited = vec![false; n];
    let mut rows: Vec<DetectedRow> = Vec::new();
    for &seed in &seeds {
        if visited[seed] {
            continue;
        }
        let order = trace_row(
            pts,
            &nbrs,
            &mut visited,
            seed,
            gentle,
            step_limit,
            row_orientation,
        );
        rows.push(build_row(pts, order, spacing));
    }

    if rows.iter().all(|r| r.order.len() < 2) {
        return None;
    }
    let residual = mean_line_residual(pts, &rows);
    let singleton_share =
        rows.iter().filter(|r| r.order.len() < 2).count() as f64 / rows.len() as f64;
    let confidence = residual_confidence(residual, spacing)
        * (1.0 - singleton_share)
        * coverage(&rows, n);
    debug!(
        "knn-bearing: k={} rows={} residual={:.3} confidence={:.3}",
        k,
        rows.len(),
        residual,
        confidence
    );
    Some(Detection {
        rows,
        confidence,
        winding: false,
    })
}

#[allow(clippy::too_many_arguments)]
fn trace_row(
    pts: &[[f64; 2]],
    nbrs: &[Vec<usize>],
    visited: &mut [bool],
    seed: usize,
    gentle: f64,
    step_limit: f64,
    row_orientation: Option<f64>,
) -> Vec<usize> {
    let mut order = vec![seed];
    visited[seed] = true;
    let mut current = seed;
    let mut current_bearing: Option<f64> = None;
    loop {
        let mut best: Option<(f64, f64, usize)> = None; // (deviation, dist, idx)
        for &cand in &nbrs[current] {
            if visited[cand] {
                continue;
            }
            let d = dist(pts[current], pts[cand]);
            if d > step_limit {
                continue;
            }
            let b = bearing(pts[current], pts[cand]);
            // After the first step the deviation is the turn from the current
            // bearing; the opening step prefers the dominant row orientation.
            let deviation = match (current_bearing, row_orientation) {
                (Some(cb), _) => turn_angle(cb, b).abs(),
                (None, Some(orient)) => orientation_difference(normalize_half_pi(b), orient),
                (None, None) => 0.0,
            };
            let better = match &best {
                None => true,
                Some((bt, bd, bi)) => (deviation, d, cand) < (*bt, *bd, *bi),
            };
            if better {
                best = Some((deviation, d, cand));
            }
        }
        let Some((deviation, _, next)) = best else { break };
        // Gentle turns end the row; reversals beyond that are serpentine
        // turn points. Either way the target starts the next row.
        if current_bearing.is_some() && deviation > gentle {
            break;
        }
        visited[next] = true;
        order.push(next);
        current_bearing = Some(bearing(pts[current], pts[next]));
        current = next;
    }
    order
}

#[cfg(test)]
mod tests {
    use crate::analysis::{analyze_point_set, classify};
    use crate::config::DetectorConfig;
    use crate::strategies::StrategyContext;

    #[test]
    fn grid_without_tokens_traces_rows() {
        let pts: Vec<[f64; 2]> = (0..20)
            .map(|i| [3.0 * (i % 5) as f64, 3.0 * (i / 5) as f64])
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
        assert_eq!(det.rows.len(), 4, "rows={:?}", det.rows);
        for row in &det.rows {
            assert_eq!(row.order.len(), 5);
            // Every hole of a traced row shares one y coordinate.
            let y = pts[row.order[0]][1];
            assert!(row.order.iter().all(|&i| (pts[i][1] - y).abs() < 1e-9));
        }
        assert!(det.confidence > 0.9, "confidence={}", det.confidence);
    }
}
