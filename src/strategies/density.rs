//! Density clustering fallback (DBSCAN).
//!
//! When the geometry-aware strategies fall through, rows are recovered as
//! density-connected clusters. The reachability radius comes from the
//! k-distance elbow unless the caller pinned one, with `min_pts` as k.
//! Noise points stay unassigned and surface as orphans downstream.

use log::debug;

use super::{build_row, Detection, StrategyContext};
use crate::angle::dist;
use crate::graph::nn_chain_order;
use crate::math::median;

pub(crate) fn run(ctx: &StrategyContext) -> Option<Detection> {
    let pts = ctx.pts;
    let min_pts = ctx.config.density.min_pts.max(2);
    if pts.len() < min_pts {
        return None;
    }
    let eps = ctx
        .config
        .density
        .eps_override
        .unwrap_or_else(|| elbow_eps(pts, min_pts));
    if eps <= 0.0 {
        return None;
    }

    let labels = dbscan(pts, eps, min_pts);
    let cluster_count = labels.iter().filter_map(|l| *l).max().map_or(0, |m| m + 1);
    if cluster_count == 0 {
        return None;
    }
    debug!(
        "density: eps {:.3}, {} clusters, {} noise",
        eps,
        cluster_count,
        labels.iter().filter(|l| l.is_none()).count()
    );

    let spacing = ctx.spacing();
    let mut rows = Vec::with_capacity(cluster_count);
    for c in 0..cluster_count {
        let members: Vec<usize> = (0..pts.len()).filter(|&i| labels[i] == Some(c)).collect();
        let member_pts: Vec<[f64; 2]> = members.iter().map(|&i| pts[i]).collect();
        let order: Vec<usize> = nn_chain_order(&member_pts)
            .into_iter()
            .map(|k| members[k])
            .collect();
        rows.push(build_row(pts, order, spacing));
    }

    let assigned: usize = rows.iter().map(|r| r.order.len()).sum();
    let coverage = assigned as f64 / pts.len() as f64;
    let confidence = coverage * step_regularity(pts, &rows);
    Some(Detection {
        rows,
        confidence,
        winding: false,
    })
}

/// DBSCAN with O(n²) range queries; labels are `None` for noise and are
/// assigned in seed order so repeated runs agree.
fn dbscan(pts: &[[f64; 2]], eps: f64, min_pts: usize) -> Vec<Option<usize>> {
    let n = pts.len();
    let range = |i: usize| -> Vec<usize> {
        (0..n).filter(|&j| dist(pts[i], pts[j]) <= eps).collect()
    };
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut seen = vec![false; n];
    let mut cluster = 0usize;
    for i in 0..n {
        if seen[i] {
            continue;
        }
        seen[i] = true;
        let nbrs = range(i);
        if nbrs.len() < min_pts {
            continue; // noise unless reclaimed as a border point
        }
        labels[i] = Some(cluster);
        let mut queue = nbrs;
        let mut qi = 0;
        while qi < queue.len() {
            let j = queue[qi];
            qi += 1;
            if labels[j].is_none() {
                labels[j] = Some(cluster);
            }
            if seen[j] {
                continue;
            }
            seen[j] = true;
            let jn = range(j);
            if jn.len() >= min_pts {
                queue.extend(jn);
            }
        }
        cluster += 1;
    }
    labels
}

/// Reachability radius from the sorted k-distance curve: the value just
/// before its largest jump, inflated slightly so the elbow point itself
/// stays reachable. Falls back to 1.5x the median k-distance when the
/// curve is flat.
fn elbow_eps(pts: &[[f64; 2]], k: usize) -> f64 {
    let n = pts.len();
    let mut kdist = Vec::with_capacity(n);
    let mut ds: Vec<f64> = Vec::with_capacity(n);
    for i in 0..n {
        ds.clear();
        for j in 0..n {
            if j != i {
                ds.push(dist(pts[i], pts[j]));
            }
        }
        ds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let idx = (k - 1).min(ds.len().saturating_sub(1));
        kdist.push(ds[idx]);
    }
    kdist.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let med = median(&kdist);
    let mut best_gap = 0.0;
    let mut eps = 0.0;
    for w in kdist.windows(2) {
        let gap = w[1] - w[0];
        if gap > best_gap {
            best_gap = gap;
            eps = w[0];
        }
    }
    if best_gap <= 0.25 * med {
        1.5 * med
    } else {
        1.05 * eps
    }
}

/// Median over max step length across all rows; 1.0 for perfectly even rows.
fn step_regularity(pts: &[[f64; 2]], rows: &[super::DetectedRow]) -> f64 {
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
    let mut sorted = steps;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    median(&sorted) / max
}

#[cfg(test)]
mod tests {
    use crate::analysis::{analyze_point_set, classify};
    use crate::config::DetectorConfig;
    use crate::strategies::StrategyContext;

    #[test]
    fn separated_lines_become_clusters_and_noise_is_dropped() {
        // Two well-separated lines plus one far outlier.
        let mut pts: Vec<[f64; 2]> = (0..6).map(|i| [3.0 * i as f64, 0.0]).collect();
        pts.extend((0..6).map(|i| [3.0 * i as f64, 40.0]));
        pts.push([200.0, 200.0]);
        let stats = analyze_point_set(&pts, &vec![None; pts.len()]);
        let cfg = DetectorConfig::default();
        let classification = classify(&pts, stats.median_spacing, &cfg);
        let ctx = StrategyContext {
            pts: &pts,
            stats: &stats,
            classification: &classification,
            config: &cfg,
        };
        let det = super::run(&ctx).expect("detection");
        assert_eq!(det.rows.len(), 2);
        let assigned: usize = det.rows.iter().map(|r| r.order.len()).sum();
        assert_eq!(assigned, 12, "outlier must stay unassigned");
        for row in &det.rows {
            let xs: Vec<f64> = row.order.iter().map(|&i| pts[i][0]).collect();
            let monotone = xs.windows(2).all(|w| w[0] < w[1])
                || xs.windows(2).all(|w| w[0] > w[1]);
            assert!(monotone, "chain order must sweep the line once");
        }
    }

    #[test]
    fn eps_override_wins() {
        let pts: Vec<[f64; 2]> = (0..8).map(|i| [2.0 * i as f64, 0.0]).collect();
        let stats = analyze_point_set(&pts, &vec![None; pts.len()]);
        let mut cfg = DetectorConfig::default();
        cfg.density.eps_override = Some(0.5); // below the spacing: everything is noise
        let classification = classify(&pts, stats.median_spacing, &cfg);
        let ctx = StrategyContext {
            pts: &pts,
            stats: &stats,
            classification: &classification,
            config: &cfg,
        };
        assert!(super::run(&ctx).is_none());
    }
}
