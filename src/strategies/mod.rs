//! Row-detection strategies: a closed family of interchangeable algorithms
//! producing ordered rows from a homogeneous point subset.
//!
//! Every strategy implements one contract: given a [`StrategyContext`] it
//! either returns a [`Detection`] with a self-reported confidence in [0, 1]
//! or `None` to signal fallthrough. The orchestrator dispatches the variants
//! of [`Strategy`] in an explicit priority order; there is no dynamic lookup.

pub mod density;
pub mod fallback;
pub mod knn_bearing;
pub mod mst_path;
pub mod pca_loess;
pub mod principal_curve;
pub mod sequence_line;
pub mod spline_fit;
pub mod winding;

use crate::analysis::{Classification, PointSetStats};
use crate::config::DetectorConfig;
use crate::math::pca::pca2;
use crate::types::RowShape;

/// Everything a strategy may consult. Subset-local: `pts[i]` corresponds to
/// local index `i`; the pipeline maps local indices back to input indices.
pub(crate) struct StrategyContext<'a> {
    pub pts: &'a [[f64; 2]],
    pub stats: &'a PointSetStats,
    pub classification: &'a Classification,
    pub config: &'a DetectorConfig,
}

impl StrategyContext<'_> {
    /// Estimated spacing, guarded against zero.
    pub fn spacing(&self) -> f64 {
        self.stats.median_spacing.max(1e-9)
    }

    /// Effective k for the k-NN graph.
    pub fn knn_k(&self) -> usize {
        self.config
            .detect
            .knn_k
            .unwrap_or_else(|| self.stats.default_k())
            .max(1)
    }
}

/// One detected row of subset-local indices, in position order.
#[derive(Clone, Debug)]
pub(crate) struct DetectedRow {
    pub order: Vec<usize>,
    pub shape: RowShape,
    pub direction: [f64; 2],
}

/// A strategy result with self-reported confidence.
#[derive(Clone, Debug)]
pub(crate) struct Detection {
    pub rows: Vec<DetectedRow>,
    pub confidence: f64,
    /// Set by the winding strategy: a single continuously curving row.
    pub winding: bool,
}

/// The closed set of detection strategies, in no particular order here; the
/// orchestrator owns the priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Winding,
    SequenceLine,
    SplineFit,
    PrincipalCurve,
    MstPath,
    KnnBearing,
    PcaLoess,
    Density,
    Backbone,
    SingleRow,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Winding => "winding",
            Strategy::SequenceLine => "sequence-line",
            Strategy::SplineFit => "spline-fit",
            Strategy::PrincipalCurve => "principal-curve",
            Strategy::MstPath => "mst-path",
            Strategy::KnnBearing => "knn-bearing",
            Strategy::PcaLoess => "pca-loess",
            Strategy::Density => "density",
            Strategy::Backbone => "backbone",
            Strategy::SingleRow => "single-row",
        }
    }

    pub(crate) fn run(self, ctx: &StrategyContext) -> Option<Detection> {
        match self {
            Strategy::Winding => winding::run(ctx),
            Strategy::SequenceLine => sequence_line::run(ctx),
            Strategy::SplineFit => spline_fit::run(ctx),
            Strategy::PrincipalCurve => principal_curve::run(ctx),
            Strategy::MstPath => mst_path::run(ctx),
            Strategy::KnnBearing => knn_bearing::run(ctx),
            Strategy::PcaLoess => pca_loess::run(ctx),
            Strategy::Density => density::run(ctx),
            Strategy::Backbone => fallback::backbone(ctx),
            Strategy::SingleRow => Some(fallback::single_row(ctx)),
        }
    }
}

/// Builds a row from an ordered index list, deriving shape and direction
/// from a line fit of the member points.
pub(crate) fn build_row(pts: &[[f64; 2]], order: Vec<usize>, spacing: f64) -> DetectedRow {
    debug_assert!(!order.is_empty());
    let member_pts: Vec<[f64; 2]> = order.iter().map(|&i| pts[i]).collect();
    let (shape, mut direction) = match pca2(&member_pts) {
        Some(pca) => {
            let max_dev = member_pts
                .iter()
                .map(|p| pca.project(*p)[1].abs())
                .fold(0.0f64, f64::max);
            let shape = if max_dev <= (0.25 * spacing).max(1e-9) {
                RowShape::Straight
            } else {
                RowShape::Curved
            };
            (shape, pca.axis)
        }
        None => (RowShape::Straight, [1.0, 0.0]),
    };
    // Orient the backbone along the traversal.
    if order.len() >= 2 {
        let first = pts[order[0]];
        let last = pts[order[order.len() - 1]];
        let dot = direction[0] * (last[0] - first[0]) + direction[1] * (last[1] - first[1]);
        if dot < 0.0 {
            direction = [-direction[0], -direction[1]];
        }
    }
    DetectedRow {
        order,
        shape,
        direction,
    }
}

/// Mean perpendicular residual of each row against its own line fit,
/// averaged over all assigned points. Zero when nothing is assigned.
pub(crate) fn mean_line_residual(pts: &[[f64; 2]], rows: &[DetectedRow]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for row in rows {
        if row.order.len() < 3 {
            continue;
        }
        let member_pts: Vec<[f64; 2]> = row.order.iter().map(|&i| pts[i]).collect();
        if let Some(pca) = pca2(&member_pts) {
            for p in &member_pts {
                sum += pca.project(*p)[1].abs();
                count += 1;
            }
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Fraction of the subset assigned to rows.
pub(crate) fn coverage(rows: &[DetectedRow], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let assigned: usize = rows.iter().map(|r| r.order.len()).sum();
    assigned as f64 / n as f64
}

/// Maps a mean residual (in spacing units) to a [0, 1] confidence.
pub(crate) fn residual_confidence(mean_residual: f64, spacing: f64) -> f64 {
    (1.0 - mean_residual / (0.5 * spacing.max(1e-9))).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_row_orients_along_traversal() {
        let pts: Vec<[f64; 2]> = (0..5).map(|i| [i as f64 * 3.0, 0.0]).collect();
        let forward = build_row(&pts, vec![0, 1, 2, 3, 4], 3.0);
        assert!(forward.direction[0] > 0.99);
        assert_eq!(forward.shape, RowShape::Straight);

        let reverse = build_row(&pts, vec![4, 3, 2, 1, 0], 3.0);
        assert!(reverse.direction[0] < -0.99);
    }

    #[test]
    fn curved_row_is_flagged() {
        let pts: Vec<[f64; 2]> = (0..9)
            .map(|i| {
                let t = i as f64 / 8.0 * std::f64::consts::PI;
                [10.0 * t.cos(), 10.0 * t.sin()]
            })
            .collect();
        let row = build_row(&pts, (0..9).collect(), 3.0);
        assert_eq!(row.shape, RowShape::Curved);
    }

    #[test]
    fn residual_confidence_saturates() {
        assert_eq!(residual_confidence(0.0, 3.0), 1.0);
        assert_eq!(residual_confidence(10.0, 3.0), 0.0);
    }
}
