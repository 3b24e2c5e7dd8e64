//! Pattern classifier: PCA variance ratio + local circle-fit curvature +
//! orientation clustering → Straight / Curved / MultiPattern.
//!
//! Pipeline
//! - Variance ratio: eigen-decompose the coordinate covariance, λ1/λ2.
//! - Local curvature: least-squares circle through each point's nearest
//!   neighbours; aggregate mean/variance of |curvature|, normalised by the
//!   estimated spacing so the cutoffs are scale-free.
//! - Orientation clustering: local tangent per point from a PCA over the
//!   point and its two nearest neighbours (mod π), grouped by circular mean
//!   within a tolerance. Points whose local fit is ambiguous (grid interiors,
//!   where row-mates and cross-row neighbours tie) carry no orientation and
//!   never vote.
//! - Decision: two or more populated orientation clusters override everything
//!   to MultiPattern; otherwise the variance/curvature cutoffs decide
//!   Straight vs Curved.
//!
//! The classification here is a routing hint for the orchestrator; the
//! pattern type reported to the caller is derived from the detected rows.

use crate::angle::circular_mean_half_pi;
use crate::angle::normalize_half_pi;
use crate::angle::orientation_difference;
use crate::config::DetectorConfig;
use crate::graph::knn_indices;
use crate::math::circle::fit_circle;
use crate::math::{mean_std, pca::pca2};
use crate::types::PatternType;
use log::debug;

/// Local PCA eigenvalue ratio below which a point's tangent is considered
/// ambiguous and excluded from orientation voting.
const MIN_LOCAL_RATIO: f64 = 4.0;

/// One local-orientation cluster (orientations modulo π).
#[derive(Clone, Debug)]
pub struct OrientationCluster {
    /// Circular mean orientation in radians, [0, π).
    pub orientation: f64,
    /// Member point indices (subset-local).
    pub members: Vec<usize>,
}

/// Classifier output consumed by the orchestrator.
#[derive(Clone, Debug)]
pub struct Classification {
    pub pattern_type: PatternType,
    pub variance_ratio: f64,
    /// Mean |curvature| × spacing (dimensionless).
    pub curvature_mean: f64,
    pub curvature_std: f64,
    pub clusters: Vec<OrientationCluster>,
}

impl Classification {
    /// Clusters large enough to represent a structural group.
    pub fn populated_clusters(&self, n: usize) -> Vec<&OrientationCluster> {
        let min_members = populated_threshold(n);
        self.clusters
            .iter()
            .filter(|c| c.members.len() >= min_members)
            .collect()
    }
}

pub(crate) fn populated_threshold(n: usize) -> usize {
    (n / 10).max(3)
}

/// Classifies one point subset.
pub fn classify(pts: &[[f64; 2]], spacing: f64, config: &DetectorConfig) -> Classification {
    let params = &config.classify;
    let n = pts.len();

    let variance_ratio = pca2(pts)
        .map(|p| p.variance_ratio())
        .unwrap_or(f64::INFINITY);

    let k = params.curvature_neighbors.min(n.saturating_sub(1));
    let nbrs = knn_indices(pts, k);
    let spacing = spacing.max(1e-9);
    let mut curvatures = Vec::with_capacity(n);
    for (i, nb) in nbrs.iter().enumerate() {
        if nb.len() >= 3 {
            let mut local: Vec<[f64; 2]> = Vec::with_capacity(nb.len() + 1);
            local.push(pts[i]);
            local.extend(nb.iter().map(|&j| pts[j]));
            let curv = fit_circle(&local).map(|f| f.curvature()).unwrap_or(0.0);
            curvatures.push(curv * spacing);
        }
    }
    let (curvature_mean, curvature_std) = mean_std(&curvatures);

    let orientations = local_orientations(pts, &nbrs);
    let clusters = cluster_orientations(&orientations, params.orientation_tol_deg.to_radians());

    let pattern_type = if has_dominant_modes(&clusters, n) {
        PatternType::MultiPattern
    } else if variance_ratio > params.variance_ratio_straight
        && curvature_mean < params.curvature_straight
    {
        PatternType::Straight
    } else if variance_ratio < params.variance_ratio_curved
        || curvature_mean > params.curvature_curved
    {
        PatternType::Curved
    } else if curvature_mean <= params.curvature_straight {
        PatternType::Straight
    } else {
        PatternType::Curved
    };

    debug!(
        "classify: n={} ratio={:.2} curvature={:.3}±{:.3} clusters={} -> {:?}",
        n,
        variance_ratio,
        curvature_mean,
        curvature_std,
        clusters.len(),
        pattern_type
    );
    Classification {
        pattern_type,
        variance_ratio,
        curvature_mean,
        curvature_std,
        clusters,
    }
}

/// True when the orientation votes concentrate into two distinct modes.
///
/// A smoothly curving set spreads its tangents over many small clusters, so
/// the two largest hold only a minor share of the votes; two genuinely
/// distinct patterns (e.g. a grid plus a perpendicular batter row) put nearly
/// every vote into the top two clusters.
fn has_dominant_modes(clusters: &[OrientationCluster], n: usize) -> bool {
    let min_members = populated_threshold(n);
    if clusters.len() < 2 {
        return false;
    }
    if clusters[0].members.len() < min_members || clusters[1].members.len() < min_members {
        return false;
    }
    let voters: usize = clusters.iter().map(|c| c.members.len()).sum();
    let top_two = clusters[0].members.len() + clusters[1].members.len();
    top_two as f64 >= 0.7 * voters as f64
}

/// Local tangent orientation per point, `None` where the fit is ambiguous.
fn local_orientations(pts: &[[f64; 2]], nbrs: &[Vec<usize>]) -> Vec<Option<f64>> {
    pts.iter()
        .enumerate()
        .map(|(i, p)| {
            let nb = &nbrs[i];
            if nb.len() < 2 {
                return None;
            }
            let local = [*p, pts[nb[0]], pts[nb[1]]];
            let pca = pca2(&local)?;
            if pca.variance_ratio() < MIN_LOCAL_RATIO {
                return None;
            }
            Some(normalize_half_pi(pca.axis[1].atan2(pca.axis[0])))
        })
        .collect()
}

/// Greedy circular-mean clustering of the voted orientations (mod π).
fn cluster_orientations(orientations: &[Option<f64>], tol: f64) -> Vec<OrientationCluster> {
    let mut clusters: Vec<OrientationCluster> = Vec::new();
    for (i, o) in orientations.iter().enumerate() {
        let Some(b) = *o else { continue };
        let mut assigned = false;
        for cluster in clusters.iter_mut() {
            if orientation_difference(b, cluster.orientation) <= tol {
                cluster.members.push(i);
                let members: Vec<f64> = cluster
                    .members
                    .iter()
                    .filter_map(|&m| orientations[m])
                    .collect();
                if let Some(mean) = circular_mean_half_pi(&members) {
                    cluster.orientation = mean;
                }
                assigned = true;
                break;
            }
        }
        if !assigned {
            clusters.push(OrientationCluster {
                orientation: b,
                members: vec![i],
            });
        }
    }
    clusters.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
    clusters
}
