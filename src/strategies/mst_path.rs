//! Row extraction from minimum-spanning-tree paths.
//!
//! Cross-check for curved or irregular subsets: build a Kruskal MST, walk the
//! unique tree paths between degree-1 endpoints, keep the longest
//! vertex-disjoint ones, reject paths with inconsistent spacing or sharp
//! bearing jumps, and merge collinear adjacent paths. Points not on any kept
//! path lower the coverage term of the confidence and are left for the
//! pipeline to report as orphans.

use super::{build_row, coverage, Detection, DetectedRow, StrategyContext};
use crate::angle::{bearing, dist, turn_angle};
use crate::graph::{adjacency, kruskal_mst};
use crate::math::median;
use log::debug;

pub(crate) fn run(ctx: &StrategyContext) -> Option<Detection> {
    let pts = ctx.pts;
    let n = pts.len();
    if n < 3 {
        return None;
    }
    let spacing = ctx.spacing();
    let mst = kruskal_mst(pts);
    let adj = adjacency(n, &mst);

    let endpoints: Vec<usize> = (0..n).filter(|&i| adj[i].len() == 1).collect();
    if endpoints.len() < 2 {
        return None;
    }

    // All endpoint-to-endpoint tree paths, longest first.
    let mut candidates: Vec<Vec<usize>> = Vec::new();
    for (i, &a) in endpoints.iter().enumerate() {
        for &b in endpoints.iter().skip(i + 1) {
            if let Some(path) = tree_path(&adj, a, b) {
                candidates.push(path);
            }
        }
    }
    candidates.sort_by(|a, b| b.len().cmp(&a.len()).then(a.first().cmp(&b.first())));

    let turn_limit = (2.0 * ctx.config.detect.gentle_turn_deg).to_radians();
    let gap_limit = ctx.config.validate.gap_factor * spacing;
    let mut used = vec![false; n];
    let mut paths: Vec<Vec<usize>> = Vec::new();
    for path in candidates {
        if path.len() < 2 || path.iter().any(|&i| used[i]) {
            continue;
        }
        if !path_is_consistent(pts, &path, gap_limit, turn_limit) {
            continue;
        }
        for &i in &path {
            used[i] = true;
        }
        paths.push(path);
    }
    if paths.is_empty() {
        return None;
    }

    merge_collinear(pts, &mut paths, spacing);

    let rows: Vec<DetectedRow> = paths
        .into_iter()
        .map(|p| build_row(pts, p, spacing))
        .collect();
    let cov = coverage(&rows, n);
    let spacing_consistency = rows_spacing_consistency(pts, &rows);
    let confidence = cov * spacing_consistency;
    debug!(
        "mst-path: rows={} coverage={:.2} spacing_consistency={:.2} confidence={:.3}",
        rows.len(),
        cov,
        spacing_consistency,
        confidence
    );
    Some(Detection {
        rows,
        confidence,
        winding: false,
    })
}

/// Unique path between two vertices of a tree (DFS with parent tracking).
fn tree_path(adj: &[Vec<usize>], from: usize, to: usize) -> Option<Vec<usize>> {
    let n = adj.len();
    let mut parent = vec![usize::MAX; n];
    let mut stack = vec![from];
    parent[from] = from;
    while let Some(v) = stack.pop() {
        if v == to {
            break;
        }
        for &w in &adj[v] {
            if parent[w] == usize::MAX {
                parent[w] = v;
                stack.push(w);
            }
        }
    }
    if parent[to] == usize::MAX {
        return None;
    }
    let mut path = vec![to];
    let mut v = to;
    while v != from {
        v = parent[v];
        path.push(v);
    }
    path.reverse();
    Some(path)
}

/// Rejects paths with an oversized step or a sharp bearing jump.
fn path_is_consistent(pts: &[[f64; 2]], path: &[usize], gap_limit: f64, turn_limit: f64) -> bool {
    for pair in path.windows(2) {
        if dist(pts[pair[0]], pts[pair[1]]) > gap_limit {
            return false;
        }
    }
    for triple in path.windows(3) {
        let b0 = bearing(pts[triple[0]], pts[triple[1]]);
        let b1 = bearing(pts[triple[1]], pts[triple[2]]);
        if turn_angle(b0, b1).abs() > turn_limit {
            return false;
        }
    }
    true
}

/// Concatenates adjacent paths whose junction continues nearly straight.
fn merge_collinear(pts: &[[f64; 2]], paths: &mut Vec<Vec<usize>>, spacing: f64) {
    let merge_tol = 20f64.to_radians();
    let mut merged = true;
    while merged {
        merged = false;
        'outer: for i in 0..paths.len() {
            for j in 0..paths.len() {
                if i == j || paths[i].len() < 2 || paths[j].len() < 2 {
                    continue;
                }
                let end = *paths[i].last().unwrap();
                let start = paths[j][0];
                if dist(pts[end], pts[start]) > 2.0 * spacing {
                    continue;
                }
                let tail = bearing(pts[paths[i][paths[i].len() - 2]], pts[end]);
                let joint = bearing(pts[end], pts[start]);
                let head = bearing(pts[start], pts[paths[j][1]]);
                if turn_angle(tail, joint).abs() < merge_tol
                    && turn_angle(joint, head).abs() < merge_tol
                {
                    let appended = paths.remove(j);
                    let target = if j < i { i - 1 } else { i };
                    paths[target].extend(appended);
                    merged = true;
                    break 'outer;
                }
            }
        }
    }
}

/// Ratio of median to maximum within-row step; 1.0 for uniform rows.
fn rows_spacing_consistency(pts: &[[f64; 2]], rows: &[DetectedRow]) -> f64 {
    let mut steps = Vec::new();
    for row in rows {
        for pair in row.order.windows(2) {
            steps.push(dist(pts[pair[0]], pts[pair[1]]));
        }
    }
    if steps.is_empty() {
        return 0.0;
    }
    let med = median(&steps);
    let max = steps.iter().copied().fold(0.0f64, f64::max);
    if max < 1e-9 {
        1.0
    } else {
        (med / max).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::{analyze_point_set, classify};
    use crate::config::DetectorConfig;
    use crate::strategies::StrategyContext;

    fn ctx_for<'a>(
        pts: &'a [[f64; 2]],
        stats: &'a crate::analysis::PointSetStats,
        classification: &'a crate::analysis::Classification,
        cfg: &'a DetectorConfig,
    ) -> StrategyContext<'a> {
        StrategyContext {
            pts,
            stats,
            classification,
            config: cfg,
        }
    }

    #[test]
    fn single_line_is_one_path() {
        let pts: Vec<[f64; 2]> = (0..10).map(|i| [3.0 * i as f64, 0.0]).collect();
        let stats = analyze_point_set(&pts, &vec![None; 10]);
        let cfg = DetectorConfig::default();
        let classification = classify(&pts, stats.median_spacing, &cfg);
        let ctx = ctx_for(&pts, &stats, &classification, &cfg);
        let det = super::run(&ctx).expect("detection");
        assert_eq!(det.rows.len(), 1);
        assert_eq!(det.rows[0].order.len(), 10);
        assert!(det.confidence > 0.9, "confidence={}", det.confidence);
    }

    #[test]
    fn arc_is_extracted_in_order() {
        let pts: Vec<[f64; 2]> = (0..20)
            .map(|i| {
                let t = std::f64::consts::PI * i as f64 / 19.0;
                [50.0 * t.cos(), 50.0 * t.sin()]
            })
            .collect();
        let stats = analyze_point_set(&pts, &vec![None; 20]);
        let cfg = DetectorConfig::default();
        let classification = classify(&pts, stats.median_spacing, &cfg);
        let ctx = ctx_for(&pts, &stats, &classification, &cfg);
        let det = super::run(&ctx).expect("detection");
        assert_eq!(det.rows.len(), 1);
        let order = &det.rows[0].order;
        let fwd: Vec<usize> = (0..20).collect();
        let rev: Vec<usize> = (0..20).rev().collect();
        assert!(order == &fwd || order == &rev, "order={order:?}");
    }
}
